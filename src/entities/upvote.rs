//! Upvote entity - Membership of a user in an item's upvoter set.
//!
//! The document-store original kept an `upvotedBy` array on each item; here
//! membership is a row guarded by a unique (item, user) index, and the item's
//! `upvotes` counter is kept equal to the number of rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Upvote database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "upvotes")]
pub struct Model {
    /// Unique identifier for the upvote row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Item that was upvoted
    pub item_id: i64,
    /// Identity-provider id of the upvoting user
    pub user_id: String,
}

/// Defines relationships between Upvote and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each upvote row belongs to one content item
    #[sea_orm(
        belongs_to = "super::content_item::Entity",
        from = "Column::ItemId",
        to = "super::content_item::Column::Id"
    )]
    ContentItem,
}

impl Related<super::content_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
