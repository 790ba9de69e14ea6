use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use dovecote_types::api::Claims;

use crate::error::ApiError;
use crate::routes::AppState;

/// Resolved creator identity, inserted as a request extension by
/// [`require_creator`] and read by every handler.
#[derive(Debug, Clone)]
pub struct CreatorContext {
    pub creator_id: Uuid,
    pub company_id: String,
    pub user_id: Uuid,
}

/// Extract and validate the JWT from the Authorization header, then resolve
/// the creator record for the token's company. Requests whose company has no
/// creator record get 404 before any handler runs.
pub async fn require_creator(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    let claims = token_data.claims;
    let creator = state
        .db
        .get_creator_by_company(&claims.company_id)?
        .ok_or(ApiError::NotFound("creator"))?;

    let creator_id: Uuid = creator
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupt creator id '{}': {}", creator.id, e))?;

    req.extensions_mut().insert(CreatorContext {
        creator_id,
        company_id: claims.company_id,
        user_id: claims.sub,
    });

    Ok(next.run(req).await)
}
