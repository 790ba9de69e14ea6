use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;

use dovecote_types::api::{CreateCreatorFeedbackRequest, CreatorFeedbackResponse};
use dovecote_types::models::FeedbackCategory;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CreatorContext;
use crate::routes::AppState;

pub async fn submit(
    State(state): State<AppState>,
    Extension(ctx): Extension<CreatorContext>,
    Json(req): Json<CreateCreatorFeedbackRequest>,
) -> ApiResult<impl IntoResponse> {
    // Category arrives as a plain string so an unknown value is a 400, not a
    // serde rejection.
    let category = FeedbackCategory::parse(&req.category).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "unknown category '{}'; expected one of: {}",
            req.category,
            FeedbackCategory::ALL.map(|c| c.as_str()).join(", "),
        ))
    })?;

    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".into()));
    }

    let subject = req
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let feedback_id = Uuid::new_v4();
    state.db.insert_creator_feedback(
        &feedback_id.to_string(),
        &ctx.creator_id.to_string(),
        &ctx.company_id,
        &ctx.user_id.to_string(),
        category.as_str(),
        subject,
        &req.message,
    )?;

    info!("Creator feedback {} submitted ({})", feedback_id, category.as_str());

    Ok((
        StatusCode::CREATED,
        Json(CreatorFeedbackResponse {
            id: feedback_id,
            creator_id: ctx.creator_id,
            category,
            subject: subject.map(str::to_string),
            message: req.message,
            created_at: chrono::Utc::now(),
        }),
    ))
}
