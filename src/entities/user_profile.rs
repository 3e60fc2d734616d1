//! User profile entity - Represents a marketplace member.
//!
//! Profiles are keyed by the opaque id issued by the external identity
//! provider. The `points` and `deals_count` fields are adjusted only inside
//! the transactional core operations, never written directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User profile database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    /// Identity-provider user id (opaque string)
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Display name, denormalized into deals at creation time
    pub name: String,
    /// Avatar image URL, denormalized into deals at creation time
    pub avatar_url: String,
    /// Free-form expertise line (e.g., "Fintech, SaaS")
    pub expertise: String,
    /// Reward points earned from content creation and received upvotes
    pub points: i64,
    /// Number of deals this user participates in, as investor or creator
    pub deals_count: i64,
    /// Whether the user bought a premium membership
    pub is_premium: bool,
    /// When the profile was first seen
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `UserProfile` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user authors many content items
    #[sea_orm(has_many = "super::content_item::Entity")]
    ContentItems,
}

impl Related<super::content_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
