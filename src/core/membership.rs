//! Membership upgrade path for confirmed membership payments.

use crate::{
    entities::{KIND_MEMBERSHIP, UserProfile, payment, user_profile},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::info;

/// Marks a user premium and records the payment, atomically.
///
/// Webhook deliveries repeat, so an already-premium user is answered with
/// `None` and no second payment row.
pub async fn activate_membership(
    db: &DatabaseConnection,
    user_id: &str,
    amount: i64,
) -> Result<Option<payment::Model>> {
    if amount < 0 {
        return Err(Error::InvalidAmount { amount });
    }

    let txn = db.begin().await?;

    let found = UserProfile::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            user_id: user_id.to_string(),
        })?;

    if found.is_premium {
        return Ok(None);
    }

    let mut active: user_profile::ActiveModel = found.into();
    active.is_premium = Set(true);
    active.update(&txn).await?;

    let receipt = payment::ActiveModel {
        user_id: Set(user_id.to_string()),
        deal_id: Set(None),
        kind: Set(KIND_MEMBERSHIP.to_string()),
        amount: Set(amount),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!("User '{user_id}' upgraded to premium");

    Ok(Some(receipt))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::profile;
    use crate::entities::Payment;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_activation_flips_flag_and_logs_payment() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "Ada").await?;

        let receipt = activate_membership(&db, "u1", 900).await?.unwrap();
        assert_eq!(receipt.kind, KIND_MEMBERSHIP);
        assert_eq!(receipt.amount, 900);
        assert_eq!(receipt.deal_id, None);

        let upgraded = profile::get_profile(&db, "u1").await?.unwrap();
        assert!(upgraded.is_premium);

        Ok(())
    }

    #[tokio::test]
    async fn test_repeat_delivery_is_a_no_op() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "Ada").await?;

        assert!(activate_membership(&db, "u1", 900).await?.is_some());
        assert!(activate_membership(&db, "u1", 900).await?.is_none());

        assert_eq!(Payment::find().all(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_activation_requires_known_user() -> Result<()> {
        let db = setup_test_db().await?;

        let err = activate_membership(&db, "ghost", 900).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound { .. }));

        Ok(())
    }
}
