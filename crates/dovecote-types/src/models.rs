use serde::{Deserialize, Serialize};

/// Tag an end user picks when dropping a message into a creator's inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageTag {
    Question,
    Feedback,
    Confession,
}

impl MessageTag {
    pub const ALL: [MessageTag; 3] = [
        MessageTag::Question,
        MessageTag::Feedback,
        MessageTag::Confession,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageTag::Question => "question",
            MessageTag::Feedback => "feedback",
            MessageTag::Confession => "confession",
        }
    }

    /// Parse the lowercase wire/storage form. `None` for anything outside
    /// the allow-list.
    pub fn parse(value: &str) -> Option<MessageTag> {
        MessageTag::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

/// Category of a creator-to-vendor feedback ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    Bug,
    Feedback,
    Idea,
    Other,
}

impl FeedbackCategory {
    pub const ALL: [FeedbackCategory; 4] = [
        FeedbackCategory::Bug,
        FeedbackCategory::Feedback,
        FeedbackCategory::Idea,
        FeedbackCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackCategory::Bug => "bug",
            FeedbackCategory::Feedback => "feedback",
            FeedbackCategory::Idea => "idea",
            FeedbackCategory::Other => "other",
        }
    }

    /// Parse the lowercase wire/storage form. `None` for anything outside
    /// the allow-list.
    pub fn parse(value: &str) -> Option<FeedbackCategory> {
        FeedbackCategory::ALL.into_iter().find(|c| c.as_str() == value)
    }
}
