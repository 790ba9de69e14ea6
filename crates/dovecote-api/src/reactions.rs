use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use dovecote_types::api::ReactionSummary;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CreatorContext;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionQuery {
    pub message_id: Uuid,
    /// Opaque per-user hash; when present the response says whether this
    /// user already reacted.
    pub user_hash: Option<String>,
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<ReactionQuery>,
    Extension(ctx): Extension<CreatorContext>,
) -> ApiResult<impl IntoResponse> {
    let owned = state.db.message_belongs_to_creator(
        &ctx.creator_id.to_string(),
        &query.message_id.to_string(),
    )?;
    if !owned {
        return Err(ApiError::NotFound("message"));
    }

    let (count, reacted) = state
        .db
        .reaction_summary(&query.message_id.to_string(), query.user_hash.as_deref())?;

    Ok(Json(ReactionSummary {
        message_id: query.message_id,
        count,
        reacted,
    }))
}
