use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use dovecote_types::api::{CreateReplyRequest, ReplyResponse, UpdateReplyVisibilityRequest};

use crate::error::{ApiError, ApiResult};
use crate::middleware::CreatorContext;
use crate::routes::AppState;

pub async fn create_reply(
    State(state): State<AppState>,
    Extension(ctx): Extension<CreatorContext>,
    Json(req): Json<CreateReplyRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.reply_text.trim().is_empty() {
        return Err(ApiError::BadRequest("reply text must not be empty".into()));
    }

    let owned = state.db.message_belongs_to_creator(
        &ctx.creator_id.to_string(),
        &req.message_id.to_string(),
    )?;
    if !owned {
        return Err(ApiError::NotFound("message"));
    }

    let reply_id = Uuid::new_v4();
    state.db.insert_reply(
        &reply_id.to_string(),
        &req.message_id.to_string(),
        &req.reply_text,
        req.is_public,
    )?;

    info!("Reply {} created on message {}", reply_id, req.message_id);

    Ok((
        StatusCode::CREATED,
        Json(ReplyResponse {
            id: reply_id,
            message_id: req.message_id,
            text: req.reply_text,
            is_public: req.is_public,
            created_at: chrono::Utc::now(),
        }),
    ))
}

pub async fn set_visibility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(ctx): Extension<CreatorContext>,
    Json(req): Json<UpdateReplyVisibilityRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated = state.db.set_reply_visibility(
        &ctx.creator_id.to_string(),
        &id.to_string(),
        req.is_public,
    )?;

    if !updated {
        return Err(ApiError::NotFound("reply"));
    }

    Ok(Json(json!({ "id": id, "isPublic": req.is_public })))
}
