//! Deal participant entity - Membership of a user in a deal.
//!
//! One row per (deal, user) pair, guarded by a unique index; the set of rows
//! for a deal always contains at least the investor and the primary creator.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deal participant database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deal_participants")]
pub struct Model {
    /// Unique identifier for the membership row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Deal this row belongs to
    pub deal_id: i64,
    /// Identity-provider id of the participating user
    pub user_id: String,
}

/// Defines relationships between `DealParticipant` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each participant row belongs to one deal
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
