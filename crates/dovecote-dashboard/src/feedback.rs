use tracing::error;

use dovecote_types::models::FeedbackCategory;

use crate::client::DashboardClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Submitting,
    Sent,
    Failed,
}

/// State for the "send us feedback" dialog. Everything is local until
/// [`FeedbackForm::submit`] fires the one request.
#[derive(Debug)]
pub struct FeedbackForm {
    open: bool,
    pub category: FeedbackCategory,
    pub subject: String,
    pub message: String,
    phase: FormPhase,
    error: Option<String>,
}

impl Default for FeedbackForm {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackForm {
    pub fn new() -> Self {
        Self {
            open: false,
            category: FeedbackCategory::Feedback,
            subject: String::new(),
            message: String::new(),
            phase: FormPhase::Editing,
            error: None,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Dismissing the dialog discards everything.
    pub fn close(&mut self) {
        *self = Self::new();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("message must not be empty".to_string());
        }
        Ok(())
    }

    /// Submit the form. Returns true only when the server accepted it.
    /// Ignored while the dialog is closed or a submit is already in flight.
    pub async fn submit(&mut self, client: &DashboardClient) -> bool {
        if !self.open || self.phase == FormPhase::Submitting {
            return false;
        }

        if let Err(message) = self.validate() {
            self.phase = FormPhase::Failed;
            self.error = Some(message);
            return false;
        }

        self.phase = FormPhase::Submitting;
        self.error = None;

        let subject = self.subject.trim();
        let subject = (!subject.is_empty()).then_some(subject);

        let result = client
            .submit_feedback(self.category, subject, &self.message)
            .await;

        match result {
            Ok(_) => {
                self.phase = FormPhase::Sent;
                true
            }
            Err(e) => {
                error!("Failed to submit creator feedback: {}", e);
                self.phase = FormPhase::Failed;
                self.error = Some(e.to_string());
                false
            }
        }
    }

    /// Back to a clean editing state, keeping the dialog open.
    pub fn reset(&mut self) {
        let open = self.open;
        *self = Self::new();
        self.open = open;
    }
}
