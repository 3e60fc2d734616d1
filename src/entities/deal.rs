//! Deal entity - An investor's paid engagement with a content item.
//!
//! A deal embeds denormalized copies of the investor, primary creator, and
//! optional solution creator references so that deal pages render without
//! joins. Profile edits leave these copies stale; that is accepted eventual
//! consistency, not a bug. Rows are immutable after creation except for
//! `status`, and the unique (`related_item_id`, `investor_id`) guard keeps a
//! duplicate payment confirmation from ever creating a second deal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deals")]
pub struct Model {
    /// Unique identifier for the deal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Id of the content item the deal was opened against
    pub related_item_id: i64,
    /// Item title at creation time (denormalized)
    pub title: String,
    /// Item kind at creation time: `"problem"`, `"idea"`, or `"business"`
    pub item_type: String,
    /// Identity-provider id of the investing user
    pub investor_id: String,
    /// Investor display name at creation time
    pub investor_name: String,
    /// Investor avatar URL at creation time
    pub investor_avatar_url: String,
    /// Investor expertise line at creation time
    pub investor_expertise: String,
    /// Identity-provider id of the item's creator
    pub creator_id: String,
    /// Creator display name at creation time
    pub creator_name: String,
    /// Creator avatar URL at creation time
    pub creator_avatar_url: String,
    /// Creator expertise line at creation time
    pub creator_expertise: String,
    /// Identity-provider id of the solution author, when one was attached
    pub solution_creator_id: Option<String>,
    /// Solution author display name at creation time
    pub solution_creator_name: Option<String>,
    /// Solution author avatar URL at creation time
    pub solution_creator_avatar_url: Option<String>,
    /// Solution author expertise line at creation time
    pub solution_creator_expertise: Option<String>,
    /// Amount captured by the payment gateway, in integer currency units
    /// (0 for free or bypassed deals)
    pub amount: i64,
    /// Lifecycle state: `"active"`, `"completed"`, or `"cancelled"`
    pub status: String,
    /// When the deal was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Deal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each deal targets one content item
    #[sea_orm(
        belongs_to = "super::content_item::Entity",
        from = "Column::RelatedItemId",
        to = "super::content_item::Column::Id"
    )]
    ContentItem,
    /// One deal has many participant rows
    #[sea_orm(has_many = "super::deal_participant::Entity")]
    Participants,
    /// One deal has many chat messages
    #[sea_orm(has_many = "super::deal_message::Entity")]
    Messages,
}

impl Related<super::content_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentItem.def()
    }
}

impl Related<super::deal_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::deal_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Deal lifecycle states.
///
/// A deal starts `Active` and may move once, to `Completed` or `Cancelled`.
/// The closed states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl DealStatus {
    /// Return the storage/display label for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a storage label back into a [`DealStatus`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Completed) | (Self::Active, Self::Cancelled)
        )
    }
}

impl std::fmt::Display for DealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_deals_can_close() {
        assert!(DealStatus::Active.can_transition_to(DealStatus::Completed));
        assert!(DealStatus::Active.can_transition_to(DealStatus::Cancelled));

        for closed in [DealStatus::Completed, DealStatus::Cancelled] {
            assert!(!closed.can_transition_to(DealStatus::Active));
            assert!(!closed.can_transition_to(DealStatus::Completed));
            assert!(!closed.can_transition_to(DealStatus::Cancelled));
        }
        assert!(!DealStatus::Active.can_transition_to(DealStatus::Active));
    }

    #[test]
    fn test_status_round_trips_through_labels() {
        for status in [
            DealStatus::Active,
            DealStatus::Completed,
            DealStatus::Cancelled,
        ] {
            assert_eq!(DealStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DealStatus::parse("pending"), None);
    }
}
