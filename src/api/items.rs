//! Content item REST handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::{
    api::{ApiState, caller_id},
    core::{content, upvote},
    entities::{ContentItemModel, ItemType},
    errors::{Error, Result},
};

#[derive(Deserialize)]
pub struct CreateItemBody {
    pub title: String,
    pub item_type: String,
    #[serde(default)]
    pub description: String,
}

/// `POST /items`
///
/// Publishes a problem, solution, idea, or business for the calling user and
/// grants the type's publish points.
pub async fn create_item(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(body): Json<CreateItemBody>,
) -> Result<Json<ContentItemModel>> {
    let user_id = caller_id(&headers)?;
    let item_type = ItemType::parse(&body.item_type).ok_or_else(|| Error::UnsupportedItemType {
        item_type: body.item_type.clone(),
    })?;
    let item =
        content::create_content_item(&state.db, &user_id, &body.title, &body.description, item_type)
            .await?;
    Ok(Json(item))
}

/// `GET /items/:id`
pub async fn get_item(
    State(state): State<Arc<ApiState>>,
    Path(item_id): Path<i64>,
) -> Result<Json<ContentItemModel>> {
    let item = content::get_item(&state.db, item_id)
        .await?
        .ok_or(Error::ItemNotFound { item_id })?;
    Ok(Json(item))
}

/// `POST /items/:id/upvote`
///
/// Toggles the caller's upvote and reports the new state.
pub async fn toggle_upvote(
    State(state): State<Arc<ApiState>>,
    Path(item_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<upvote::UpvoteOutcome>> {
    let user_id = caller_id(&headers)?;
    let outcome = upvote::toggle_upvote(&state.db, item_id, &user_id).await?;
    Ok(Json(outcome))
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
    async fn test_publish_and_read_item() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "Ada").await?;
        let state = test_api_state(db);

        let published = create_item(
            State(state.clone()),
            as_user("u1"),
            Json(CreateItemBody {
                title: "Cold chain gaps".to_string(),
                item_type: "problem".to_string(),
                description: "Vaccines spoil in transit".to_string(),
            }),
        )
        .await?;
        assert_eq!(published.0.creator_id, "u1");

        let read_back = get_item(State(state), Path(published.0.id)).await?;
        assert_eq!(read_back.0.title, "Cold chain gaps");

        Ok(())
    }

    #[tokio::test]
    async fn test_publish_rejects_unknown_type() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "Ada").await?;
        let state = test_api_state(db);

        let err = create_item(
            State(state),
            as_user("u1"),
            Json(CreateItemBody {
                title: "Anything".to_string(),
                item_type: "startup".to_string(),
                description: String::new(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedItemType { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_upvote_endpoint_toggles() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "Ada").await?;
        create_test_user(&db, "u2", "Uma").await?;
        let item = create_test_item(&db, "u2", "Cold chain gaps", ItemType::Problem).await?;
        let state = test_api_state(db);

        let on = toggle_upvote(State(state.clone()), Path(item.id), as_user("u1")).await?;
        assert!(on.0.upvoted);
        assert_eq!(on.0.upvotes, 1);

        let off = toggle_upvote(State(state.clone()), Path(item.id), as_user("u1")).await?;
        assert!(!off.0.upvoted);
        assert_eq!(off.0.upvotes, 0);

        let err = toggle_upvote(State(state), Path(item.id), as_user("u2"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SelfAction { .. }));

        Ok(())
    }
}
