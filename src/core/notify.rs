//! Notification business logic.
//!
//! Notifications are an append-only feed per recipient. They are written in
//! the best-effort phase after a transaction commits, so a failed insert is
//! logged by the caller and never rolls back the operation that triggered it.

use crate::{
    entities::{Notification, notification},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Synthetic recipient id for the operator feed. Not a real user profile;
/// rows addressed to it never join against `user_profiles`.
pub const ADMIN_RECIPIENT: &str = "admins";

/// Appends a notification to `recipient_id`'s feed.
pub async fn notify(
    db: &DatabaseConnection,
    recipient_id: &str,
    message: &str,
    link: &str,
) -> Result<notification::Model> {
    notification::ActiveModel {
        recipient_id: Set(recipient_id.to_string()),
        message: Set(message.to_string()),
        link: Set(link.to_string()),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Retrieves a recipient's notifications, newest first.
pub async fn notifications_for_user(
    db: &DatabaseConnection,
    recipient_id: &str,
) -> Result<Vec<notification::Model>> {
    Notification::find()
        .filter(notification::Column::RecipientId.eq(recipient_id))
        .order_by_desc(notification::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks one of `recipient_id`'s notifications as read. A notification that
/// does not exist or belongs to someone else is reported as not found, so
/// callers cannot probe other users' feeds. Re-marking a read row is a no-op
/// that still succeeds.
pub async fn mark_read(
    db: &DatabaseConnection,
    notification_id: i64,
    recipient_id: &str,
) -> Result<notification::Model> {
    let row = Notification::find_by_id(notification_id)
        .one(db)
        .await?
        .filter(|row| row.recipient_id == recipient_id)
        .ok_or(Error::NotificationNotFound { notification_id })?;

    let mut active: notification::ActiveModel = row.into();
    active.is_read = Set(true);
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_notify_appends_unread_rows_newest_first() -> Result<()> {
        let db = setup_test_db().await?;

        notify(&db, "user-1", "first", "/deals/1").await?;
        notify(&db, "user-1", "second", "/deals/2").await?;
        notify(&db, "user-2", "other feed", "/items/9").await?;

        let feed = notifications_for_user(&db, "user-1").await?;
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].message, "second");
        assert_eq!(feed[1].message, "first");
        assert!(feed.iter().all(|n| !n.is_read));

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_read_flips_only_the_target_row() -> Result<()> {
        let db = setup_test_db().await?;

        let first = notify(&db, "user-1", "first", "/deals/1").await?;
        notify(&db, "user-1", "second", "/deals/2").await?;

        let updated = mark_read(&db, first.id, "user-1").await?;
        assert!(updated.is_read);

        // Re-marking is harmless.
        mark_read(&db, first.id, "user-1").await?;

        let feed = notifications_for_user(&db, "user-1").await?;
        let unread: Vec<_> = feed.iter().filter(|n| !n.is_read).collect();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].message, "second");

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_read_is_scoped_to_the_recipient() -> Result<()> {
        let db = setup_test_db().await?;

        let err = mark_read(&db, 4242, "user-1").await.unwrap_err();
        assert!(matches!(
            err,
            Error::NotificationNotFound {
                notification_id: 4242
            }
        ));

        // Someone else's notification looks exactly like a missing one.
        let foreign = notify(&db, "user-2", "theirs", "/deals/3").await?;
        let err = mark_read(&db, foreign.id, "user-1").await.unwrap_err();
        assert!(matches!(err, Error::NotificationNotFound { .. }));

        Ok(())
    }
}
