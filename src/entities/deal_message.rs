//! Deal message entity - The chat log attached to each deal.
//!
//! Messages are authored by deal participants, or by `"system"` for the
//! seeded greeting written right after deal creation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sender id used for system-authored messages.
pub const SYSTEM_SENDER: &str = "system";

/// Deal message database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deal_messages")]
pub struct Model {
    /// Unique identifier for the message
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Deal whose chat this message belongs to
    pub deal_id: i64,
    /// Participant user id, or `"system"`
    pub sender_id: String,
    /// Message body
    pub content: String,
    /// When the message was posted
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `DealMessage` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each message belongs to one deal
    #[sea_orm(
        belongs_to = "super::deal::Entity",
        from = "Column::DealId",
        to = "super::deal::Column::Id"
    )]
    Deal,
}

impl Related<super::deal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
