//! Deal chat business logic.
//!
//! Each deal carries an append-only message log restricted to its
//! participants, plus one unread counter row per (user, deal) pair. Posting
//! bumps every other participant's counter in the same transaction as the
//! message insert; opening the chat deletes the reader's row.

use crate::{
    core::deal,
    entities::{Deal, DealMessage, UnreadCounter, deal_message, unread_counter},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Appends a chat message to a deal and marks it unread for the other
/// participants.
pub async fn post_message(
    db: &DatabaseConnection,
    deal_id: i64,
    sender_id: &str,
    content: &str,
) -> Result<deal_message::Model> {
    if content.trim().is_empty() {
        return Err(Error::Config {
            message: "Message content cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    Deal::find_by_id(deal_id)
        .one(&txn)
        .await?
        .ok_or(Error::DealNotFound { deal_id })?;

    let participants = deal::participant_ids(&txn, deal_id).await?;
    if !participants.iter().any(|id| id == sender_id) {
        return Err(Error::NotDealParticipant {
            deal_id,
            user_id: sender_id.to_string(),
        });
    }

    let message = deal_message::ActiveModel {
        deal_id: Set(deal_id),
        sender_id: Set(sender_id.to_string()),
        content: Set(content.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for user_id in &participants {
        if user_id != sender_id {
            bump_unread(&txn, deal_id, user_id).await?;
        }
    }

    txn.commit().await?;

    Ok(message)
}

/// Retrieves a deal's messages in posting order.
pub async fn messages_for_deal(
    db: &DatabaseConnection,
    deal_id: i64,
) -> Result<Vec<deal_message::Model>> {
    DealMessage::find()
        .filter(deal_message::Column::DealId.eq(deal_id))
        .order_by_asc(deal_message::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds one to `user_id`'s unread counter for a deal, creating the row on
/// first use. The unique (user, deal) index keeps this to a single row.
pub(crate) async fn bump_unread<C>(db: &C, deal_id: i64, user_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let updated = UnreadCounter::update_many()
        .col_expr(
            unread_counter::Column::Count,
            Expr::col(unread_counter::Column::Count).add(1),
        )
        .filter(unread_counter::Column::DealId.eq(deal_id))
        .filter(unread_counter::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if updated.rows_affected == 0 {
        unread_counter::ActiveModel {
            user_id: Set(user_id.to_string()),
            deal_id: Set(deal_id),
            count: Set(1),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

/// Removes `user_id`'s unread counter for a deal. Called when the user opens
/// the chat; clearing an absent counter is a no-op.
pub async fn clear_unread(db: &DatabaseConnection, deal_id: i64, user_id: &str) -> Result<()> {
    UnreadCounter::delete_many()
        .filter(unread_counter::Column::DealId.eq(deal_id))
        .filter(unread_counter::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

/// How many messages in a deal `user_id` has not seen yet.
pub async fn unread_count(db: &DatabaseConnection, deal_id: i64, user_id: &str) -> Result<i64> {
    let row = UnreadCounter::find()
        .filter(unread_counter::Column::DealId.eq(deal_id))
        .filter(unread_counter::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(row.map_or(0, |row| row.count))
}
