use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use dovecote_db::models::{MessageRow, ReplyRow};
use dovecote_types::api::{MessageResponse, ReplyResponse, UpdateReviewedRequest};
use dovecote_types::models::MessageTag;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CreatorContext;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    /// Dashboards pass their own creator id; anyone else's id intersects
    /// with the token scope to an empty list.
    pub creator_id: Option<Uuid>,
    pub tag: Option<MessageTag>,
    pub product_category: Option<String>,
}

pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Extension(ctx): Extension<CreatorContext>,
) -> ApiResult<impl IntoResponse> {
    // The token decides whose inbox this is.
    if let Some(requested) = query.creator_id {
        if requested != ctx.creator_id {
            return Ok(Json(vec![]));
        }
    }

    // Run all blocking DB queries off the async runtime
    let db = state.db.clone();
    let creator_id = ctx.creator_id.to_string();
    let tag = query.tag;
    let category = query.product_category;

    let (rows, reply_rows, reaction_rows) = tokio::task::spawn_blocking(move || {
        let rows = db.list_messages(&creator_id, tag, category.as_deref())?;

        let message_ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let reply_rows = db.replies_for_messages(&message_ids)?;
        let reaction_rows = db.reaction_counts_for_messages(&message_ids)?;

        Ok::<_, anyhow::Error>((rows, reply_rows, reaction_rows))
    })
    .await
    .map_err(|e| anyhow::anyhow!("task join error: {}", e))??;

    // Group children by message_id (cheap in-memory work, fine on the async thread)
    let mut replies_by_message: HashMap<String, Vec<ReplyRow>> = HashMap::new();
    for reply in reply_rows {
        replies_by_message
            .entry(reply.message_id.clone())
            .or_default()
            .push(reply);
    }

    let reaction_counts: HashMap<String, i64> = reaction_rows
        .into_iter()
        .map(|r| (r.message_id, r.count))
        .collect();

    let messages: Vec<MessageResponse> = rows
        .into_iter()
        .map(|row| {
            let replies = replies_by_message
                .remove(&row.id)
                .unwrap_or_default()
                .into_iter()
                .map(reply_response)
                .collect();
            let reaction_count = reaction_counts.get(&row.id).copied().unwrap_or(0).max(0) as u64;
            message_response(row, reaction_count, replies)
        })
        .collect();

    Ok(Json(messages))
}

pub async fn set_reviewed(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(ctx): Extension<CreatorContext>,
    Json(req): Json<UpdateReviewedRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated = state.db.set_message_reviewed(
        &ctx.creator_id.to_string(),
        &id.to_string(),
        req.reviewed,
    )?;

    if !updated {
        return Err(ApiError::NotFound("message"));
    }

    Ok(Json(json!({ "id": id, "reviewed": req.reviewed })))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(ctx): Extension<CreatorContext>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state
        .db
        .delete_message(&ctx.creator_id.to_string(), &id.to_string())?;

    if !deleted {
        return Err(ApiError::NotFound("message"));
    }

    info!("Message {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

fn message_response(
    row: MessageRow,
    reaction_count: u64,
    replies: Vec<ReplyResponse>,
) -> MessageResponse {
    let tag = MessageTag::parse(&row.tag).unwrap_or_else(|| {
        warn!("Corrupt tag '{}' on message '{}'", row.tag, row.id);
        MessageTag::Feedback
    });

    MessageResponse {
        id: parse_uuid(&row.id, "message id"),
        created_at: parse_timestamp(&row.created_at, &row.id),
        text: row.text,
        tag,
        product_category: row.product_category,
        reviewed: row.reviewed,
        reaction_count,
        replies,
    }
}

fn reply_response(row: ReplyRow) -> ReplyResponse {
    ReplyResponse {
        id: parse_uuid(&row.id, "reply id"),
        message_id: parse_uuid(&row.message_id, "reply message_id"),
        created_at: parse_timestamp(&row.created_at, &row.id),
        text: row.text,
        is_public: row.is_public,
    }
}

fn parse_uuid(value: &str, field: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", field, value, e);
        Uuid::default()
    })
}

fn parse_timestamp(value: &str, id: &str) -> chrono::DateTime<chrono::Utc> {
    value
        .parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on '{}': {}", value, id, e);
            chrono::DateTime::default()
        })
}
