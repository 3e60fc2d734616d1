//! Database configuration module.
//!
//! Handles the SQLite connection and table creation using SeaORM. Table
//! creation uses `Schema::create_table_from_entity` so the schema always
//! matches the entity definitions without hand-written SQL, plus three
//! unique indexes that relational storage needs where the document-store
//! original relied on set/map semantics: one upvote per (item, user), one
//! participant row per (deal, user), one unread counter per (user, deal).
//! A fourth index, one deal per (item, investor), is the deal-uniqueness
//! guard that makes duplicate payment confirmations safe.

use crate::entities::{
    ContentItem, Deal, DealMessage, DealParticipant, Notification, Payment, UnreadCounter, Upvote,
    UserProfile, deal, deal_participant, unread_counter, upvote,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database named by `database_url`.
///
/// # Errors
/// Returns an error when the connection cannot be established.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all database tables and unique indexes from the entity
/// definitions. Safe to call on every boot: statements carry
/// `IF NOT EXISTS`.
///
/// # Errors
/// Returns an error when a DDL statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut user_profile_table = schema.create_table_from_entity(UserProfile);
    let mut content_item_table = schema.create_table_from_entity(ContentItem);
    let mut upvote_table = schema.create_table_from_entity(Upvote);
    let mut deal_table = schema.create_table_from_entity(Deal);
    let mut deal_participant_table = schema.create_table_from_entity(DealParticipant);
    let mut payment_table = schema.create_table_from_entity(Payment);
    let mut notification_table = schema.create_table_from_entity(Notification);
    let mut deal_message_table = schema.create_table_from_entity(DealMessage);
    let mut unread_counter_table = schema.create_table_from_entity(UnreadCounter);

    db.execute(builder.build(user_profile_table.if_not_exists()))
        .await?;
    db.execute(builder.build(content_item_table.if_not_exists()))
        .await?;
    db.execute(builder.build(upvote_table.if_not_exists())).await?;
    db.execute(builder.build(deal_table.if_not_exists())).await?;
    db.execute(builder.build(deal_participant_table.if_not_exists()))
        .await?;
    db.execute(builder.build(payment_table.if_not_exists())).await?;
    db.execute(builder.build(notification_table.if_not_exists()))
        .await?;
    db.execute(builder.build(deal_message_table.if_not_exists()))
        .await?;
    db.execute(builder.build(unread_counter_table.if_not_exists()))
        .await?;

    for mut index in unique_indexes() {
        db.execute(builder.build(index.if_not_exists())).await?;
    }

    Ok(())
}

/// The unique indexes guarding the crate's set/map invariants.
fn unique_indexes() -> Vec<IndexCreateStatement> {
    vec![
        // One deal per (item, investor): closes the duplicate-confirmation
        // race the pre-check alone cannot.
        Index::create()
            .name("uq_deals_item_investor")
            .table(Deal)
            .col(deal::Column::RelatedItemId)
            .col(deal::Column::InvestorId)
            .unique()
            .to_owned(),
        Index::create()
            .name("uq_upvotes_item_user")
            .table(Upvote)
            .col(upvote::Column::ItemId)
            .col(upvote::Column::UserId)
            .unique()
            .to_owned(),
        Index::create()
            .name("uq_participants_deal_user")
            .table(DealParticipant)
            .col(deal_participant::Column::DealId)
            .col(deal_participant::Column::UserId)
            .unique()
            .to_owned(),
        Index::create()
            .name("uq_unread_user_deal")
            .table(UnreadCounter)
            .col(unread_counter::Column::UserId)
            .col(unread_counter::Column::DealId)
            .unique()
            .to_owned(),
    ]
}
