//! Payment entity - Append-only reconciliation log.
//!
//! One row is written per completed deal-creation or membership transaction,
//! inside the same database transaction as the state it pays for. The
//! gateway has already captured the money by the time this row is written,
//! so the log is what reconciliation tooling works from.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment kind label for deal-creation rows.
pub const KIND_DEAL_CREATION: &str = "deal_creation";
/// Payment kind label for membership rows.
pub const KIND_MEMBERSHIP: &str = "membership";

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity-provider id of the paying user
    pub user_id: String,
    /// Deal the payment created, for `deal_creation` rows
    pub deal_id: Option<i64>,
    /// What the payment bought: `"deal_creation"` or `"membership"`
    pub kind: String,
    /// Captured amount in integer currency units (0 for free/bypassed deals)
    pub amount: i64,
    /// When the row was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Deal-creation payments link to the deal they created
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
