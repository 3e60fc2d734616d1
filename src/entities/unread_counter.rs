//! Unread counter entity - Per-user unread message counts, per deal.
//!
//! The document-store original kept an `unreadDealMessages` map on each
//! profile; here each map entry is a row guarded by a unique (user, deal)
//! index. Deleting the row is the map-entry-deletion primitive, used when a
//! participant opens the chat.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unread counter database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "unread_counters")]
pub struct Model {
    /// Unique identifier for the counter row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity-provider id of the user the count belongs to
    pub user_id: String,
    /// Deal whose chat the count is for
    pub deal_id: i64,
    /// Number of messages the user has not read yet
    pub count: i64,
}

/// `UnreadCounter` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
