//! Payment gateway webhook.
//!
//! The gateway signs the raw request body with a shared secret
//! (hex-encoded HMAC-SHA256 in the signature header). Nothing in the payload
//! is trusted until that signature checks out, after which `checkout.completed`
//! events fan out to deal creation or membership activation. By the time an
//! event arrives the money is already captured, so a handling failure is
//! surfaced as a 5xx for the gateway to retry and reconcile.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{error, info, warn};

use crate::{
    api::{ApiState, ErrorResponse},
    core::{content, deal, membership, profile},
    entities::{ItemType, KIND_DEAL_CREATION, KIND_MEMBERSHIP},
    errors::{Error, Result},
};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 signature of the raw body.
pub const SIGNATURE_HEADER: &str = "x-payment-signature";

/// The only event type that carries trusted checkout metadata.
const CHECKOUT_COMPLETED: &str = "checkout.completed";

/// Top-level shape of every gateway event.
#[derive(Debug, Deserialize)]
pub struct PaymentEvent {
    /// Gateway event name, e.g. `checkout.completed`
    pub event_type: String,
    /// Checkout metadata echoed back from session creation
    #[serde(default)]
    pub metadata: Option<PaymentMetadata>,
}

/// Metadata attached to a checkout session when it was opened.
#[derive(Debug, Deserialize)]
pub struct PaymentMetadata {
    /// What the payment was for: `deal_creation` or `membership`
    pub kind: String,
    /// The paying user's id
    pub payer_id: String,
    /// Target content item, present for `deal_creation`
    #[serde(default)]
    pub item_id: Option<i64>,
    /// Captured amount in integer currency units (absent means 0)
    #[serde(default)]
    pub amount: i64,
    /// Solution author to pull into the deal, when one was selected
    #[serde(default)]
    pub solution_creator_id: Option<String>,
}

#[derive(Serialize)]
struct WebhookAck {
    received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    deal_id: Option<i64>,
}

/// Verifies the gateway signature over the raw body. Comparison runs in
/// constant time via `Mac::verify_slice`.
#[must_use]
pub fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// `POST /webhooks/payment`
///
/// Rejects unverifiable or malformed deliveries with 400, acknowledges
/// irrelevant events with 200, and answers 500 when a verified
/// `checkout.completed` event cannot be applied.
pub async fn payment_webhook(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !verify_signature(&state.config.webhook_secret, &body, signature) {
        warn!("Payment webhook rejected: bad or missing signature");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "invalid signature".to_string(),
            }),
        )
            .into_response();
    }

    let event: PaymentEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!("Payment webhook rejected: malformed payload: {err}");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "malformed payload".to_string(),
                }),
            )
                .into_response();
        }
    };

    if event.event_type != CHECKOUT_COMPLETED {
        // Not ours to act on; acknowledge so the gateway stops retrying.
        return (
            StatusCode::OK,
            Json(WebhookAck {
                received: true,
                deal_id: None,
            }),
        )
            .into_response();
    }

    match apply_checkout(&state, event).await {
        Ok(deal_id) => (
            StatusCode::OK,
            Json(WebhookAck {
                received: true,
                deal_id,
            }),
        )
            .into_response(),
        Err(err) => {
            // Money was captured but the marketplace state didn't follow.
            error!("Payment webhook handling failed after capture: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn apply_checkout(state: &ApiState, event: PaymentEvent) -> Result<Option<i64>> {
    let Some(metadata) = event.metadata else {
        return Err(Error::Config {
            message: "checkout.completed event without metadata".to_string(),
        });
    };

    match metadata.kind.as_str() {
        KIND_DEAL_CREATION => {
            let item_id = metadata.item_id.ok_or_else(|| Error::Config {
                message: "deal_creation metadata without item_id".to_string(),
            })?;

            // Cheap duplicate pre-check; the unique (item, investor) index
            // closes the race this leaves open.
            if let Some(existing) =
                deal::find_existing_deal(&state.db, item_id, &metadata.payer_id).await?
            {
                info!(
                    "Duplicate payment confirmation for deal {}; acknowledging",
                    existing.id
                );
                return Ok(Some(existing.id));
            }

            let investor = profile::get_profile(&state.db, &metadata.payer_id)
                .await?
                .ok_or_else(|| Error::UserNotFound {
                    user_id: metadata.payer_id.clone(),
                })?;
            let item = content::get_item(&state.db, item_id)
                .await?
                .ok_or(Error::ItemNotFound { item_id })?;
            let item_type = ItemType::parse(&item.item_type).ok_or_else(|| Error::Config {
                message: format!("Item {item_id} has unknown type '{}'", item.item_type),
            })?;

            let outcome = deal::create_deal(
                &state.db,
                deal::DealRequest {
                    investor: &investor,
                    primary_creator_id: &item.creator_id,
                    item_id: item.id,
                    item_title: &item.title,
                    item_type,
                    amount: metadata.amount,
                    solution_creator_id: metadata.solution_creator_id.as_deref(),
                },
            )
            .await?;
            Ok(Some(outcome.deal.id))
        }
        KIND_MEMBERSHIP => {
            membership::activate_membership(&state.db, &metadata.payer_id, metadata.amount)
                .await?;
            Ok(None)
        }
        other => {
            warn!("checkout.completed with unknown kind '{other}'; acknowledging");
            Ok(None)
        }
    }
}
