//! Deal business logic - creation, lookup, and status transitions.
//!
//! Deal creation is the one genuinely multi-table operation in the system.
//! Phase one runs inside a single database transaction: insert the deal and
//! its participant rows, bump `interested_investors_count` on the item and
//! `deals_count` on every participant, and record the payment. Either all of
//! it commits or none of it does. Phase two (notifications, the system chat
//! greeting, unread counters) runs after commit and is best-effort: a failure
//! there leaves the deal fully usable and is only logged.
//!
//! The unique (`related_item_id`, `investor_id`) index is the real duplicate
//! guard. The webhook's `find_existing_deal` pre-check merely avoids the
//! common retry; when two confirmations race past it, the loser's insert
//! hits the index and is answered with the winner's deal instead of a second
//! one.

use std::collections::BTreeSet;

use crate::{
    core::{message, notify, with_op_timeout},
    entities::{
        ContentItem, Deal, DealParticipant, DealStatus, ItemType, KIND_DEAL_CREATION,
        SYSTEM_SENDER, UserProfile, content_item, deal, deal_message, deal_participant, payment,
        user_profile,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, warn};

/// Chat message seeded by the system into every new deal.
pub const DEAL_STARTED_MESSAGE: &str = "Deal started! You can now chat securely.";

/// Inputs for [`create_deal`], as confirmed by the payment gateway.
#[derive(Debug, Clone)]
pub struct DealRequest<'a> {
    /// Paying investor's profile, already resolved by the caller
    pub investor: &'a user_profile::Model,
    /// Id of the item's author
    pub primary_creator_id: &'a str,
    /// Target content item
    pub item_id: i64,
    /// Item title to denormalize into the deal
    pub item_title: &'a str,
    /// Target item kind
    pub item_type: ItemType,
    /// Captured amount in integer currency units (0 permitted)
    pub amount: i64,
    /// Optional solution author to pull into the deal
    pub solution_creator_id: Option<&'a str>,
}

/// What [`create_deal`] produced.
#[derive(Debug, Clone)]
pub struct DealOutcome {
    /// The deal this request now maps to
    pub deal: deal::Model,
    /// False when a deal for the same (item, investor) pair already existed
    /// and was returned instead of creating a second one
    pub created: bool,
}

/// Creates a deal from a confirmed payment.
///
/// All persistent state (deal, participants, counters, payment log) moves in
/// one transaction; partial application is never observable. Re-running the
/// same confirmation returns the existing deal with `created = false` and
/// leaves every counter untouched.
pub async fn create_deal(
    db: &DatabaseConnection,
    request: DealRequest<'_>,
) -> Result<DealOutcome> {
    if request.amount < 0 {
        return Err(Error::InvalidAmount {
            amount: request.amount,
        });
    }
    if !request.item_type.is_deal_eligible() {
        return Err(Error::UnsupportedItemType {
            item_type: request.item_type.as_str().to_string(),
        });
    }

    let outcome = with_op_timeout(run_creation_transaction(db, &request)).await?;

    if outcome.created {
        info!(
            "Deal {} created for item {} by investor '{}'",
            outcome.deal.id, outcome.deal.related_item_id, outcome.deal.investor_id
        );
        if let Err(err) = run_post_creation_effects(db, &outcome.deal).await {
            // The deal is committed; a failure here only degrades UX.
            warn!(
                "Post-creation side effects incomplete for deal {}: {err}",
                outcome.deal.id
            );
        }
    }

    Ok(outcome)
}

async fn run_creation_transaction(
    db: &DatabaseConnection,
    request: &DealRequest<'_>,
) -> Result<DealOutcome> {
    let txn = db.begin().await?;

    let primary_creator = UserProfile::find_by_id(request.primary_creator_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            user_id: request.primary_creator_id.to_string(),
        })?;

    // The solution creator is resolved opportunistically: an unknown id
    // drops the reference instead of failing the deal.
    let solution_creator = match request.solution_creator_id {
        Some(id) => UserProfile::find_by_id(id).one(&txn).await?,
        None => None,
    };

    ContentItem::find_by_id(request.item_id)
        .one(&txn)
        .await?
        .ok_or(Error::ItemNotFound {
            item_id: request.item_id,
        })?;

    let mut participant_set = BTreeSet::new();
    participant_set.insert(request.investor.user_id.clone());
    participant_set.insert(primary_creator.user_id.clone());
    if let Some(profile) = &solution_creator {
        participant_set.insert(profile.user_id.clone());
    }

    let now = chrono::Utc::now();
    let deal_model = deal::ActiveModel {
        related_item_id: Set(request.item_id),
        title: Set(request.item_title.to_string()),
        item_type: Set(request.item_type.as_str().to_string()),
        investor_id: Set(request.investor.user_id.clone()),
        investor_name: Set(request.investor.name.clone()),
        investor_avatar_url: Set(request.investor.avatar_url.clone()),
        investor_expertise: Set(request.investor.expertise.clone()),
        creator_id: Set(primary_creator.user_id.clone()),
        creator_name: Set(primary_creator.name.clone()),
        creator_avatar_url: Set(primary_creator.avatar_url.clone()),
        creator_expertise: Set(primary_creator.expertise.clone()),
        solution_creator_id: Set(solution_creator.as_ref().map(|p| p.user_id.clone())),
        solution_creator_name: Set(solution_creator.as_ref().map(|p| p.name.clone())),
        solution_creator_avatar_url: Set(solution_creator.as_ref().map(|p| p.avatar_url.clone())),
        solution_creator_expertise: Set(solution_creator.as_ref().map(|p| p.expertise.clone())),
        amount: Set(request.amount),
        status: Set(DealStatus::Active.as_str().to_string()),
        created_at: Set(now),
        ..Default::default()
    };

    let inserted = match deal_model.insert(&txn).await {
        Ok(inserted) => inserted,
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            // A concurrent confirmation for the same (item, investor) pair
            // won the race. Hand back the winner.
            txn.rollback().await?;
            let existing = find_existing_deal(db, request.item_id, &request.investor.user_id)
                .await?
                .ok_or_else(|| Error::Conflict {
                    message: format!(
                        "deal for item {} and investor '{}' vanished during retry",
                        request.item_id, request.investor.user_id
                    ),
                })?;
            return Ok(DealOutcome {
                deal: existing,
                created: false,
            });
        }
        Err(err) => return Err(err.into()),
    };

    for user_id in &participant_set {
        deal_participant::ActiveModel {
            deal_id: Set(inserted.id),
            user_id: Set(user_id.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    ContentItem::update_many()
        .col_expr(
            content_item::Column::InterestedInvestorsCount,
            Expr::col(content_item::Column::InterestedInvestorsCount).add(1),
        )
        .filter(content_item::Column::Id.eq(request.item_id))
        .exec(&txn)
        .await?;

    UserProfile::update_many()
        .col_expr(
            user_profile::Column::DealsCount,
            Expr::col(user_profile::Column::DealsCount).add(1),
        )
        .filter(user_profile::Column::UserId.is_in(participant_set.iter().cloned()))
        .exec(&txn)
        .await?;

    payment::ActiveModel {
        user_id: Set(request.investor.user_id.clone()),
        deal_id: Set(Some(inserted.id)),
        kind: Set(KIND_DEAL_CREATION.to_string()),
        amount: Set(request.amount),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    Ok(DealOutcome {
        deal: inserted,
        created: true,
    })
}

/// Best-effort effects after the deal is committed: notifications, the
/// system chat greeting, and unread counters for the non-investor
/// participants.
async fn run_post_creation_effects(db: &DatabaseConnection, deal: &deal::Model) -> Result<()> {
    let link = format!("/deals/{}", deal.id);
    let creator_note = format!(
        "💰 {} wants to invest in your {} \"{}\"! A deal has been started.",
        deal.investor_name, deal.item_type, deal.title
    );

    notify::notify(db, &deal.creator_id, &creator_note, &link).await?;
    if let Some(solution_creator_id) = deal
        .solution_creator_id
        .as_deref()
        .filter(|id| *id != deal.creator_id)
    {
        notify::notify(db, solution_creator_id, &creator_note, &link).await?;
    }
    notify::notify(
        db,
        notify::ADMIN_RECIPIENT,
        &format!(
            "New deal #{} on {} \"{}\" by {}",
            deal.id, deal.item_type, deal.title, deal.investor_name
        ),
        &link,
    )
    .await?;

    deal_message::ActiveModel {
        deal_id: Set(deal.id),
        sender_id: Set(SYSTEM_SENDER.to_string()),
        content: Set(DEAL_STARTED_MESSAGE.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    // The investor is already looking at the deal they just opened; everyone
    // else gets an unread marker for the greeting.
    for user_id in participant_ids(db, deal.id).await? {
        if user_id != deal.investor_id {
            message::bump_unread(db, deal.id, &user_id).await?;
        }
    }

    Ok(())
}

/// Looks up the deal a given investor already holds on a given item, if any.
/// Callers use this as the cheap duplicate pre-check before [`create_deal`].
pub async fn find_existing_deal(
    db: &DatabaseConnection,
    item_id: i64,
    investor_id: &str,
) -> Result<Option<deal::Model>> {
    Deal::find()
        .filter(deal::Column::RelatedItemId.eq(item_id))
        .filter(deal::Column::InvestorId.eq(investor_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a deal by id.
pub async fn get_deal(db: &DatabaseConnection, deal_id: i64) -> Result<Option<deal::Model>> {
    Deal::find_by_id(deal_id).one(db).await.map_err(Into::into)
}

/// Returns the deduplicated participant ids of a deal, sorted ascending.
pub async fn participant_ids<C>(db: &C, deal_id: i64) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    Ok(DealParticipant::find()
        .filter(deal_participant::Column::DealId.eq(deal_id))
        .order_by_asc(deal_participant::Column::UserId)
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.user_id)
        .collect())
}

/// Moves a deal out of `active`, on behalf of its investor.
///
/// Only `active -> completed` and `active -> cancelled` are legal, and only
/// the investor participant may request them. The item's
/// `interested_investors_count` is a historical tally and does not move back
/// down when a deal is cancelled.
pub async fn update_deal_status(
    db: &DatabaseConnection,
    deal_id: i64,
    new_status: DealStatus,
    requesting_user_id: &str,
) -> Result<deal::Model> {
    with_op_timeout(async {
        let txn = db.begin().await?;

        let found = Deal::find_by_id(deal_id)
            .one(&txn)
            .await?
            .ok_or(Error::DealNotFound { deal_id })?;

        if found.investor_id != requesting_user_id {
            return Err(Error::NotDealInvestor {
                deal_id,
                user_id: requesting_user_id.to_string(),
            });
        }

        let current = DealStatus::parse(&found.status).ok_or_else(|| Error::Config {
            message: format!("Deal {deal_id} has unknown status '{}'", found.status),
        })?;
        if !current.can_transition_to(new_status) {
            return Err(Error::InvalidStatusTransition {
                from: found.status.clone(),
                to: new_status.as_str().to_string(),
            });
        }

        let mut active: deal::ActiveModel = found.into();
        active.status = Set(new_status.as_str().to_string());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        info!("Deal {deal_id} moved to {new_status}");
        Ok(updated)
    })
    .await
}
