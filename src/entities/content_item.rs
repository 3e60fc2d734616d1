//! Content item entity - Problems, solutions, ideas, and businesses.
//!
//! All four submission kinds share one table distinguished by `item_type`.
//! The `upvotes` counter is kept equal to the number of matching rows in the
//! `upvotes` table, and `interested_investors_count` moves up exactly once
//! per deal created against the item; both mutate only inside the
//! transactional core operations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Content item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity-provider id of the submitting user
    pub creator_id: String,
    /// Short title shown in listings and denormalized into deals
    pub title: String,
    /// Longer free-form description
    pub description: String,
    /// Kind of submission: `"problem"`, `"solution"`, `"idea"`, or `"business"`
    pub item_type: String,
    /// Upvote count; always equals the number of upvote rows for this item
    pub upvotes: i64,
    /// How many deals investors have opened against this item
    pub interested_investors_count: i64,
    /// When the item was submitted
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `ContentItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one creator profile
    #[sea_orm(
        belongs_to = "super::user_profile::Entity",
        from = "Column::CreatorId",
        to = "super::user_profile::Column::UserId"
    )]
    Creator,
    /// One item has many upvote rows
    #[sea_orm(has_many = "super::upvote::Entity")]
    Upvotes,
}

impl Related<super::user_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::upvote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Upvotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Kind of content item. Stored as a plain string column; this enum carries
/// the parsing and point rules so the rest of the crate never matches on raw
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Problem,
    Solution,
    Idea,
    Business,
}

impl ItemType {
    /// Return the storage/display label for this item type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Problem => "problem",
            Self::Solution => "solution",
            Self::Idea => "idea",
            Self::Business => "business",
        }
    }

    /// Parse a storage label back into an [`ItemType`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "problem" => Some(Self::Problem),
            "solution" => Some(Self::Solution),
            "idea" => Some(Self::Idea),
            "business" => Some(Self::Business),
            _ => None,
        }
    }

    /// Whether investors can open a deal directly against this kind of item.
    /// Solutions are upvotable but deals always target the problem, idea, or
    /// business they answer.
    #[must_use]
    pub const fn is_deal_eligible(self) -> bool {
        matches!(self, Self::Problem | Self::Idea | Self::Business)
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
