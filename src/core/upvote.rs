//! Upvote business logic - the toggle transaction.
//!
//! One call flips a user's upvote on an item. The membership row, the item's
//! `upvotes` counter, and the creator's points all move together in a single
//! transaction with the same sign, so toggling on and back off restores every
//! value exactly. The creator is notified only when an upvote is added,
//! after the transaction commits.

use crate::{
    core::{notify, points, with_op_timeout},
    entities::{ContentItem, ItemType, Upvote, UserProfile, content_item, upvote, user_profile},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::warn;

/// What a toggle call did.
#[derive(Debug, Clone, Serialize)]
pub struct UpvoteOutcome {
    /// True when the call added the upvote, false when it removed one
    pub upvoted: bool,
    /// The item's upvote count after the toggle
    pub upvotes: i64,
}

/// Flips `user_id`'s upvote on an item.
///
/// Creators cannot upvote their own content. Point adjustments follow the
/// item type (problems and solutions move 20, businesses 10, ideas 0) with
/// the sign of the toggle, so a removal takes back exactly what the addition
/// granted.
pub async fn toggle_upvote(
    db: &DatabaseConnection,
    item_id: i64,
    user_id: &str,
) -> Result<UpvoteOutcome> {
    let (outcome, item, points_moved) =
        with_op_timeout(run_toggle_transaction(db, item_id, user_id)).await?;

    if outcome.upvoted {
        if let Err(err) = send_upvote_notification(db, &item, points_moved).await {
            warn!("Upvote notification failed for item {item_id}: {err}");
        }
    }

    Ok(outcome)
}

async fn run_toggle_transaction(
    db: &DatabaseConnection,
    item_id: i64,
    user_id: &str,
) -> Result<(UpvoteOutcome, content_item::Model, i64)> {
    let txn = db.begin().await?;

    let item = ContentItem::find_by_id(item_id)
        .one(&txn)
        .await?
        .ok_or(Error::ItemNotFound { item_id })?;

    if item.creator_id == user_id {
        return Err(Error::SelfAction {
            user_id: user_id.to_string(),
        });
    }

    let item_type = ItemType::parse(&item.item_type).ok_or_else(|| Error::Config {
        message: format!("Item {item_id} has unknown type '{}'", item.item_type),
    })?;

    let existing = Upvote::find()
        .filter(upvote::Column::ItemId.eq(item_id))
        .filter(upvote::Column::UserId.eq(user_id))
        .one(&txn)
        .await?;

    let (direction, upvoted) = match existing {
        Some(row) => {
            row.delete(&txn).await?;
            (-1_i64, false)
        }
        None => {
            upvote::ActiveModel {
                item_id: Set(item_id),
                user_id: Set(user_id.to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            (1, true)
        }
    };

    ContentItem::update_many()
        .col_expr(
            content_item::Column::Upvotes,
            Expr::col(content_item::Column::Upvotes).add(direction),
        )
        .filter(content_item::Column::Id.eq(item_id))
        .exec(&txn)
        .await?;

    let points_moved = direction * points::upvote_points_for(item_type);
    if points_moved != 0 {
        UserProfile::update_many()
            .col_expr(
                user_profile::Column::Points,
                Expr::col(user_profile::Column::Points).add(points_moved),
            )
            .filter(user_profile::Column::UserId.eq(item.creator_id.clone()))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    Ok((
        UpvoteOutcome {
            upvoted,
            upvotes: item.upvotes + direction,
        },
        item,
        points_moved,
    ))
}

async fn send_upvote_notification(
    db: &DatabaseConnection,
    item: &content_item::Model,
    points_moved: i64,
) -> Result<()> {
    let message = if points_moved > 0 {
        format!(
            "👍 Your {} \"{}\" received an upvote (+{points_moved} points)",
            item.item_type, item.title
        )
    } else {
        format!("👍 Your {} \"{}\" received an upvote", item.item_type, item.title)
    };
    notify::notify(db, &item.creator_id, &message, &format!("/items/{}", item.id)).await?;
    Ok(())
}
