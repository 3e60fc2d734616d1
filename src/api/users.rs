//! Profile and notification REST handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{ApiState, caller_id},
    core::{notify, profile},
    entities::{NotificationModel, UserProfileModel},
    errors::{Error, Result},
};

#[derive(Deserialize)]
pub struct UpsertProfileBody {
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub expertise: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub count: usize,
    pub notifications: Vec<NotificationModel>,
}

/// Callers may only act on their own user-scoped resources.
fn require_self(headers: &HeaderMap, user_id: &str) -> Result<()> {
    let caller = caller_id(headers)?;
    if caller != user_id {
        return Err(Error::Unauthenticated {
            message: "callers may only act on their own profile".to_string(),
        });
    }
    Ok(())
}

/// `PUT /users/:id`
///
/// Upserts the caller's profile from the identity provider's payload. Points,
/// deal counts, and the premium flag are never writable here.
pub async fn upsert_profile(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpsertProfileBody>,
) -> Result<Json<UserProfileModel>> {
    require_self(&headers, &user_id)?;
    let saved = profile::upsert_profile(
        &state.db,
        &user_id,
        &body.name,
        &body.avatar_url,
        &body.expertise,
    )
    .await?;
    Ok(Json(saved))
}

/// `GET /users/:id`
pub async fn get_profile(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfileModel>> {
    let found = profile::get_profile(&state.db, &user_id)
        .await?
        .ok_or(Error::UserNotFound { user_id })?;
    Ok(Json(found))
}

/// `GET /users/:id/notifications`
///
/// The caller's own feed, newest first.
pub async fn list_notifications(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<NotificationsResponse>> {
    require_self(&headers, &user_id)?;
    let notifications = notify::notifications_for_user(&state.db, &user_id).await?;
    Ok(Json(NotificationsResponse {
        count: notifications.len(),
        notifications,
    }))
}

/// `POST /notifications/:id/read`
pub async fn mark_notification_read(
    State(state): State<Arc<ApiState>>,
    Path(notification_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<NotificationModel>> {
    let caller = caller_id(&headers)?;
    let updated = notify::mark_read(&state.db, notification_id, &caller).await?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use axum::http::HeaderValue;

    fn as_user(user_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            crate::api::USER_ID_HEADER,
            HeaderValue::from_str(user_id).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_profile_upsert_is_self_only() -> Result<()> {
        let db = setup_test_db().await?;
        let state = test_api_state(db);

        let saved = upsert_profile(
            State(state.clone()),
            Path("u1".to_string()),
            as_user("u1"),
            Json(UpsertProfileBody {
                name: "Ada".to_string(),
                avatar_url: "https://a.test/u1.png".to_string(),
                expertise: "Backend".to_string(),
            }),
        )
        .await?;
        assert_eq!(saved.0.user_id, "u1");

        let err = upsert_profile(
            State(state),
            Path("u1".to_string()),
            as_user("u2"),
            Json(UpsertProfileBody {
                name: "Mallory".to_string(),
                avatar_url: String::new(),
                expertise: String::new(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Unauthenticated { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_profile_public_read() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "Ada").await?;
        let state = test_api_state(db);

        let found = get_profile(State(state.clone()), Path("u1".to_string())).await?;
        assert_eq!(found.0.name, "Ada");

        let err = get_profile(State(state), Path("ghost".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UserNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_notification_feed_and_read_receipts() -> Result<()> {
        let db = setup_test_db().await?;
        crate::core::notify::notify(&db, "u1", "hello", "/deals/1").await?;
        let state = test_api_state(db);

        let feed = list_notifications(
            State(state.clone()),
            Path("u1".to_string()),
            as_user("u1"),
        )
        .await?;
        assert_eq!(feed.0.count, 1);
        let note_id = feed.0.notifications[0].id;

        // Another user cannot read the feed or mark its rows.
        let err = list_notifications(State(state.clone()), Path("u1".to_string()), as_user("u2"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthenticated { .. }));

        let err = mark_notification_read(State(state.clone()), Path(note_id), as_user("u2"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotificationNotFound { .. }));

        let marked = mark_notification_read(State(state), Path(note_id), as_user("u1")).await?;
        assert!(marked.0.is_read);

        Ok(())
    }
}
