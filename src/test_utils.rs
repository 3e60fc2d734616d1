//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use std::sync::Arc;

use crate::{
    api::ApiState,
    config::AppConfig,
    core::{content, deal, profile},
    entities::{self, ItemType},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Webhook secret used by the HTTP-layer tests.
pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a profile model without touching a database. Handy for validation
/// tests running against a `MockDatabase`.
#[must_use]
pub fn test_profile(user_id: &str, name: &str) -> entities::user_profile::Model {
    entities::user_profile::Model {
        user_id: user_id.to_string(),
        name: name.to_string(),
        avatar_url: format!("https://avatars.test/{user_id}.png"),
        expertise: "Generalist".to_string(),
        points: 0,
        deals_count: 0,
        is_premium: false,
        created_at: chrono::Utc::now(),
    }
}

/// Creates a persisted user profile with sensible defaults.
///
/// # Defaults
/// * `avatar_url`: `https://avatars.test/<user_id>.png`
/// * `expertise`: "Generalist"
pub async fn create_test_user(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<entities::user_profile::Model> {
    profile::upsert_profile(
        db,
        user_id,
        name,
        &format!("https://avatars.test/{user_id}.png"),
        "Generalist",
    )
    .await
}

/// Publishes a content item through the real creation path, so the creator
/// also receives the publish points for `item_type`.
pub async fn create_test_item(
    db: &DatabaseConnection,
    creator_id: &str,
    title: &str,
    item_type: ItemType,
) -> Result<entities::content_item::Model> {
    content::create_content_item(db, creator_id, title, "Test description", item_type).await
}

/// Sets up the standard deal scenario: investor `inv1` (Iris) opens a 75000
/// deal on the problem "Cold chain gaps" by `pc1` (Paulo). Both users and the
/// item are created on the fly.
pub async fn create_test_deal(db: &DatabaseConnection) -> Result<entities::deal::Model> {
    let investor = create_test_user(db, "inv1", "Iris").await?;
    create_test_user(db, "pc1", "Paulo").await?;
    let item = create_test_item(db, "pc1", "Cold chain gaps", ItemType::Problem).await?;

    let outcome = deal::create_deal(
        db,
        deal::DealRequest {
            investor: &investor,
            primary_creator_id: "pc1",
            item_id: item.id,
            item_title: &item.title,
            item_type: ItemType::Problem,
            amount: 75000,
            solution_creator_id: None,
        },
    )
    .await?;
    Ok(outcome.deal)
}

/// Wraps a database connection in the shared HTTP state with test
/// configuration, for calling handlers directly.
#[must_use]
pub fn test_api_state(db: DatabaseConnection) -> Arc<ApiState> {
    Arc::new(ApiState {
        db,
        config: AppConfig {
            database_url: "sqlite::memory:".to_string(),
            api_port: 0,
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        },
    })
}
