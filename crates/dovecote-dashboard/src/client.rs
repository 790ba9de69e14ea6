use reqwest::{Client, Response, StatusCode};
use uuid::Uuid;

use dovecote_types::api::{
    CreateCreatorFeedbackRequest, CreateReplyRequest, CreatorFeedbackResponse, ErrorBody,
    MessageResponse, ReactionSummary, ReplyResponse, UpdateReplyVisibilityRequest,
    UpdateReviewedRequest,
};
use dovecote_types::models::{FeedbackCategory, MessageTag};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Api { status: StatusCode, message: String },
}

/// HTTP client for the dashboard API. One instance per signed-in creator;
/// the token rides along on every request.
pub struct DashboardClient {
    http: Client,
    base_url: String,
    token: String,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_messages(
        &self,
        tag: Option<MessageTag>,
        product_category: Option<&str>,
    ) -> Result<Vec<MessageResponse>, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(tag) = tag {
            query.push(("tag", tag.as_str().to_string()));
        }
        if let Some(category) = product_category {
            query.push(("productCategory", category.to_string()));
        }

        let resp = self
            .http
            .get(self.url("/api/feedback"))
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await?;

        Ok(check(resp).await?.json().await?)
    }

    pub async fn set_reviewed(&self, message_id: Uuid, reviewed: bool) -> Result<(), ClientError> {
        let resp = self
            .http
            .patch(self.url(&format!("/api/feedback/{}", message_id)))
            .bearer_auth(&self.token)
            .json(&UpdateReviewedRequest { reviewed })
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }

    pub async fn delete_message(&self, message_id: Uuid) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/feedback/{}", message_id)))
            .bearer_auth(&self.token)
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }

    pub async fn create_reply(
        &self,
        message_id: Uuid,
        reply_text: &str,
        is_public: bool,
    ) -> Result<ReplyResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/replies"))
            .bearer_auth(&self.token)
            .json(&CreateReplyRequest {
                message_id,
                reply_text: reply_text.to_string(),
                is_public,
            })
            .send()
            .await?;

        Ok(check(resp).await?.json().await?)
    }

    pub async fn set_reply_visibility(
        &self,
        reply_id: Uuid,
        is_public: bool,
    ) -> Result<(), ClientError> {
        let resp = self
            .http
            .patch(self.url(&format!("/api/replies/{}", reply_id)))
            .bearer_auth(&self.token)
            .json(&UpdateReplyVisibilityRequest { is_public })
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }

    pub async fn reactions(
        &self,
        message_id: Uuid,
        user_hash: Option<&str>,
    ) -> Result<ReactionSummary, ClientError> {
        let mut query: Vec<(&str, String)> = vec![("messageId", message_id.to_string())];
        if let Some(hash) = user_hash {
            query.push(("userHash", hash.to_string()));
        }

        let resp = self
            .http
            .get(self.url("/api/reactions"))
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await?;

        Ok(check(resp).await?.json().await?)
    }

    pub async fn submit_feedback(
        &self,
        category: FeedbackCategory,
        subject: Option<&str>,
        message: &str,
    ) -> Result<CreatorFeedbackResponse, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/creator-feedback"))
            .bearer_auth(&self.token)
            .json(&CreateCreatorFeedbackRequest {
                category: category.as_str().to_string(),
                subject: subject.map(str::to_string),
                message: message.to_string(),
            })
            .send()
            .await?;

        Ok(check(resp).await?.json().await?)
    }
}

/// Map non-2xx responses onto [`ClientError::Api`], pulling the message out
/// of the JSON error envelope when there is one.
async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };

    Err(ClientError::Api { status, message })
}
