use tracing::error;
use uuid::Uuid;

use dovecote_types::api::MessageResponse;
use dovecote_types::models::MessageTag;

use crate::client::{ClientError, DashboardClient};

pub const PAGE_SIZE: usize = 10;

/// A message is "hot" once its reaction count strictly exceeds this.
pub const HOT_REACTION_THRESHOLD: u64 = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboxFilter {
    pub tag: Option<MessageTag>,
    pub product_category: Option<String>,
}

/// Per-tag counts for the filter tabs, derived from the full snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagCounts {
    pub all: usize,
    pub question: usize,
    pub feedback: usize,
    pub confession: usize,
    pub unreviewed: usize,
}

/// In-progress reply. Kept outside the message list so a failed submit
/// never loses what the creator typed.
#[derive(Debug, Clone)]
pub struct ReplyDraft {
    pub message_id: Uuid,
    pub text: String,
    pub is_public: bool,
}

impl ReplyDraft {
    pub fn for_message(message_id: Uuid) -> Self {
        Self {
            message_id,
            text: String::new(),
            is_public: false,
        }
    }

    pub fn is_submittable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// The creator's inbox view-model.
///
/// Holds the latest full snapshot from the server; filtering, pagination,
/// tab counts and hot-post ranking are all derived in memory from it. Every
/// successful mutation refetches the snapshot rather than patching it
/// locally, so the view never drifts from the server. Failures set a
/// one-shot alert and leave the snapshot untouched.
pub struct Inbox {
    client: DashboardClient,
    messages: Vec<MessageResponse>,
    filter: InboxFilter,
    page: usize,
    alert: Option<String>,
    reply_draft: Option<ReplyDraft>,
}

impl Inbox {
    pub fn new(client: DashboardClient) -> Self {
        Self {
            client,
            messages: Vec::new(),
            filter: InboxFilter::default(),
            page: 0,
            alert: None,
            reply_draft: None,
        }
    }

    /// Refetch the whole inbox. Returns false (and raises the alert) when
    /// the request fails; the previous snapshot stays in place.
    pub async fn refresh(&mut self) -> bool {
        match self.client.list_messages(None, None).await {
            Ok(messages) => {
                self.messages = messages;
                self.clamp_page();
                true
            }
            Err(e) => {
                self.fail("load messages", e);
                false
            }
        }
    }

    pub async fn mark_reviewed(&mut self, message_id: Uuid, reviewed: bool) -> bool {
        match self.client.set_reviewed(message_id, reviewed).await {
            Ok(()) => self.refresh().await,
            Err(e) => {
                self.fail("update reviewed state", e);
                false
            }
        }
    }

    pub async fn delete_message(&mut self, message_id: Uuid) -> bool {
        match self.client.delete_message(message_id).await {
            Ok(()) => self.refresh().await,
            Err(e) => {
                self.fail("delete message", e);
                false
            }
        }
    }

    pub async fn set_reply_visibility(&mut self, reply_id: Uuid, is_public: bool) -> bool {
        match self.client.set_reply_visibility(reply_id, is_public).await {
            Ok(()) => self.refresh().await,
            Err(e) => {
                self.fail("update reply visibility", e);
                false
            }
        }
    }

    // -- Reply drafting --

    pub fn open_reply(&mut self, message_id: Uuid) {
        self.reply_draft = Some(ReplyDraft::for_message(message_id));
    }

    pub fn close_reply(&mut self) {
        self.reply_draft = None;
    }

    pub fn reply_draft(&self) -> Option<&ReplyDraft> {
        self.reply_draft.as_ref()
    }

    pub fn reply_draft_mut(&mut self) -> Option<&mut ReplyDraft> {
        self.reply_draft.as_mut()
    }

    /// Send the current draft. The draft is only discarded once the server
    /// accepts it.
    pub async fn submit_reply(&mut self) -> bool {
        let Some(draft) = self.reply_draft.clone() else {
            return false;
        };
        if !draft.is_submittable() {
            return false;
        }

        match self
            .client
            .create_reply(draft.message_id, &draft.text, draft.is_public)
            .await
        {
            Ok(_) => {
                self.reply_draft = None;
                self.refresh().await
            }
            Err(e) => {
                self.fail("send reply", e);
                false
            }
        }
    }

    // -- Derived views --

    pub fn filtered(&self) -> Vec<&MessageResponse> {
        self.messages
            .iter()
            .filter(|m| self.filter.tag.map_or(true, |t| m.tag == t))
            .filter(|m| {
                self.filter
                    .product_category
                    .as_deref()
                    .map_or(true, |c| m.product_category.as_deref() == Some(c))
            })
            .collect()
    }

    /// The current page of the filtered list.
    pub fn visible(&self) -> Vec<&MessageResponse> {
        self.filtered()
            .into_iter()
            .skip(self.page * PAGE_SIZE)
            .take(PAGE_SIZE)
            .collect()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// At least 1, even when the filtered list is empty.
    pub fn page_count(&self) -> usize {
        let filtered = self.filtered().len();
        if filtered == 0 { 1 } else { filtered.div_ceil(PAGE_SIZE) }
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    fn clamp_page(&mut self) {
        self.page = self.page.min(self.page_count() - 1);
    }

    pub fn filter(&self) -> &InboxFilter {
        &self.filter
    }

    /// Changing a filter jumps back to the first page.
    pub fn set_tag_filter(&mut self, tag: Option<MessageTag>) {
        if self.filter.tag != tag {
            self.filter.tag = tag;
            self.page = 0;
        }
    }

    pub fn set_category_filter(&mut self, category: Option<String>) {
        if self.filter.product_category != category {
            self.filter.product_category = category;
            self.page = 0;
        }
    }

    /// Tab counts ignore the active filter: they always describe the full
    /// snapshot.
    pub fn tag_counts(&self) -> TagCounts {
        let mut counts = TagCounts {
            all: self.messages.len(),
            ..Default::default()
        };

        for message in &self.messages {
            match message.tag {
                MessageTag::Question => counts.question += 1,
                MessageTag::Feedback => counts.feedback += 1,
                MessageTag::Confession => counts.confession += 1,
            }
            if !message.reviewed {
                counts.unreviewed += 1;
            }
        }

        counts
    }

    pub fn is_hot(&self, message: &MessageResponse) -> bool {
        message.reaction_count > HOT_REACTION_THRESHOLD
    }

    /// Hot posts, most reactions first. Ties go to the newer message.
    pub fn hot_posts(&self) -> Vec<&MessageResponse> {
        let mut hot: Vec<&MessageResponse> =
            self.messages.iter().filter(|m| self.is_hot(m)).collect();

        hot.sort_by(|a, b| {
            b.reaction_count
                .cmp(&a.reaction_count)
                .then(b.created_at.cmp(&a.created_at))
        });

        hot
    }

    // -- Alerts --

    pub fn has_alert(&self) -> bool {
        self.alert.is_some()
    }

    /// One-shot: the UI shows the alert once and it is gone.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub fn messages(&self) -> &[MessageResponse] {
        &self.messages
    }

    fn fail(&mut self, action: &str, err: ClientError) {
        error!("Failed to {}: {}", action, err);
        self.alert = Some(format!("Failed to {}: {}", action, err));
    }
}
