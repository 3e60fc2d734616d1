//! Deal REST handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{ApiState, caller_id},
    core::{deal, message},
    entities::{DealMessageModel, DealModel, DealStatus},
    errors::{Error, Result},
};

#[derive(Deserialize)]
pub struct LookupQuery {
    pub item_id: i64,
    pub investor_id: String,
}

#[derive(Serialize)]
pub struct LookupResponse {
    /// Id of the investor's existing deal on the item, or null
    pub deal_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DealResponse {
    #[serde(flatten)]
    pub deal: DealModel,
    pub participant_ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub count: usize,
    pub messages: Vec<DealMessageModel>,
}

#[derive(Deserialize)]
pub struct MessageBody {
    pub content: String,
}

/// `GET /deals/lookup?item_id=&investor_id=`
///
/// The duplicate pre-check used by payment initiation and by clients polling
/// after a checkout redirect.
pub async fn lookup_deal(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupResponse>> {
    let existing = deal::find_existing_deal(&state.db, query.item_id, &query.investor_id).await?;
    Ok(Json(LookupResponse {
        deal_id: existing.map(|d| d.id),
    }))
}

/// `GET /deals/:id`
pub async fn get_deal(
    State(state): State<Arc<ApiState>>,
    Path(deal_id): Path<i64>,
) -> Result<Json<DealResponse>> {
    let found = deal::get_deal(&state.db, deal_id)
        .await?
        .ok_or(Error::DealNotFound { deal_id })?;
    let participant_ids = deal::participant_ids(&state.db, deal_id).await?;
    Ok(Json(DealResponse {
        deal: found,
        participant_ids,
    }))
}

/// `POST /deals/:id/status`
///
/// Investor-only. Body: `{"status": "completed" | "cancelled"}`.
pub async fn update_status(
    State(state): State<Arc<ApiState>>,
    Path(deal_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<StatusBody>,
) -> Result<Json<DealModel>> {
    let user_id = caller_id(&headers)?;
    let new_status = DealStatus::parse(&body.status).ok_or_else(|| Error::Config {
        message: format!("Unknown deal status '{}'", body.status),
    })?;
    let updated = deal::update_deal_status(&state.db, deal_id, new_status, &user_id).await?;
    Ok(Json(updated))
}

/// `GET /deals/:id/messages`
///
/// Participant-only. Opening the chat clears the reader's unread counter.
pub async fn list_messages(
    State(state): State<Arc<ApiState>>,
    Path(deal_id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<MessagesResponse>> {
    let user_id = caller_id(&headers)?;

    deal::get_deal(&state.db, deal_id)
        .await?
        .ok_or(Error::DealNotFound { deal_id })?;
    let participants = deal::participant_ids(&state.db, deal_id).await?;
    if !participants.iter().any(|id| *id == user_id) {
        return Err(Error::NotDealParticipant { deal_id, user_id });
    }

    message::clear_unread(&state.db, deal_id, &user_id).await?;
    let messages = message::messages_for_deal(&state.db, deal_id).await?;
    Ok(Json(MessagesResponse {
        count: messages.len(),
        messages,
    }))
}

/// `POST /deals/:id/messages`
///
/// Participant-only. Body: `{"content": "..."}`.
pub async fn post_message(
    State(state): State<Arc<ApiState>>,
    Path(deal_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<MessageBody>,
) -> Result<Json<DealMessageModel>> {
    let user_id = caller_id(&headers)?;
    let posted = message::post_message(&state.db, deal_id, &user_id, &body.content).await?;
    Ok(Json(posted))
}
