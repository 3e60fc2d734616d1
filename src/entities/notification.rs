//! Notification entity - Append-only user-facing notification log.
//!
//! `recipient_id` is either an identity-provider user id or the literal
//! `"admins"` for platform-operator notices.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Recipient user id, or `"admins"` for operator notices
    pub recipient_id: String,
    /// Human-readable notification text
    pub message: String,
    /// In-app link target (e.g., `/deals/42`)
    pub link: String,
    /// Whether the recipient has opened the notification
    pub is_read: bool,
    /// When the notification was written
    pub created_at: DateTimeUtc,
}

/// Notification has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
