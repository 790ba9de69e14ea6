use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{FeedbackCategory, MessageTag};

// -- Session claims --

/// JWT claims carried by creator session tokens. Tokens are minted by the
/// external session service; this workspace only validates them. Canonical
/// definition lives here so the API middleware and the dashboard tests agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id.
    pub sub: Uuid,
    /// Company the user belongs to; creators are looked up by company.
    pub company_id: String,
    pub exp: usize,
}

// -- Errors --

/// Uniform JSON error payload: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// -- Messages --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub text: String,
    pub tag: MessageTag,
    pub product_category: Option<String>,
    pub reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub reaction_count: u64,
    pub replies: Vec<ReplyResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateReviewedRequest {
    pub reviewed: bool,
}

// -- Replies --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateReplyRequest {
    pub message_id: Uuid,
    pub reply_text: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateReplyVisibilityRequest {
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResponse {
    pub id: Uuid,
    pub message_id: Uuid,
    pub text: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

// -- Reactions --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSummary {
    pub message_id: Uuid,
    pub count: u64,
    /// Whether the `userHash` passed in the query has reacted. Always false
    /// when no hash was supplied.
    pub reacted: bool,
}

// -- Creator feedback --

/// `category` crosses the wire as a plain string so the server can answer
/// values outside the allow-list with a 400 instead of a deserialization
/// rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCreatorFeedbackRequest {
    pub category: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorFeedbackResponse {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub category: FeedbackCategory,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
