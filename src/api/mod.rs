//! Axum REST interface over the core operations.
//!
//! Authentication is delegated to the identity provider at the edge; by the
//! time a request reaches this layer, the verified caller id travels in the
//! `X-User-Id` header. Handlers stay thin: extract, call into [`crate::core`],
//! and serialize the result. Error-to-status mapping lives here so the core
//! never needs to know about HTTP.

/// Deal endpoints: lookup, read, status, chat
pub mod deals;
/// Content item endpoints: publish, read, upvote
pub mod items;
/// Profile and notification endpoints
pub mod users;
/// Signed payment gateway webhook
pub mod webhook;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, errors::Error};

/// Header carrying the authenticated caller's id, set by the upstream
/// identity layer.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared state available to all request handlers.
pub struct ApiState {
    /// Database connection used by every operation
    pub db: DatabaseConnection,
    /// Runtime configuration (webhook secret lives here)
    pub config: AppConfig,
}

/// Standard error body returned by every failing endpoint.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Builds the full application router.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/payment", post(webhook::payment_webhook))
        .route("/deals/lookup", get(deals::lookup_deal))
        .route("/deals/:id", get(deals::get_deal))
        .route("/deals/:id/status", post(deals::update_status))
        .route(
            "/deals/:id/messages",
            get(deals::list_messages).post(deals::post_message),
        )
        .route("/items", post(items::create_item))
        .route("/items/:id", get(items::get_item))
        .route("/items/:id/upvote", post(items::toggle_upvote))
        .route("/users/:id", put(users::upsert_profile).get(users::get_profile))
        .route("/users/:id/notifications", get(users::list_notifications))
        .route("/notifications/:id/read", post(users::mark_notification_read))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /health`
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound { .. }
            | Self::ItemNotFound { .. }
            | Self::DealNotFound { .. }
            | Self::NotificationNotFound { .. } => StatusCode::NOT_FOUND,
            Self::SelfAction { .. }
            | Self::InvalidStatusTransition { .. }
            | Self::InvalidAmount { .. }
            | Self::UnsupportedItemType { .. }
            | Self::Config { .. } => StatusCode::BAD_REQUEST,
            Self::NotDealInvestor { .. } | Self::NotDealParticipant { .. } => {
                StatusCode::FORBIDDEN
            }
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Extracts the caller id from [`USER_ID_HEADER`].
pub(crate) fn caller_id(headers: &HeaderMap) -> crate::errors::Result<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Unauthenticated {
            message: format!("{USER_ID_HEADER} header is required"),
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_caller_id_reads_header() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u1"));
        assert_eq!(caller_id(&headers).unwrap(), "u1");
    }

    #[test]
    fn test_caller_id_missing_or_empty_is_unauthenticated() {
        let headers = HeaderMap::new();
        assert!(matches!(
            caller_id(&headers).unwrap_err(),
            Error::Unauthenticated { .. }
        ));

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static(""));
        assert!(matches!(
            caller_id(&headers).unwrap_err(),
            Error::Unauthenticated { .. }
        ));
    }

    #[test]
    fn test_error_status_mapping() {
        let not_found = Error::DealNotFound { deal_id: 1 }.into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let forbidden = Error::NotDealInvestor {
            deal_id: 1,
            user_id: "u1".to_string(),
        }
        .into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let conflict = Error::Conflict {
            message: "busy".to_string(),
        }
        .into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let retry_later = Error::Timeout { seconds: 10 }.into_response();
        assert_eq!(retry_later.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bad_request = Error::SelfAction {
            user_id: "u1".to_string(),
        }
        .into_response();
        assert_eq!(bad_request.status(), StatusCode::BAD_REQUEST);
    }
}
