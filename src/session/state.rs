use serde::{Deserialize, Serialize};

/// Observable authentication state published by the session controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub is_logged_in: bool,
    pub error_message: Option<String>,
}

impl SessionState {
    pub fn logged_in() -> Self {
        Self {
            is_logged_in: true,
            error_message: None,
        }
    }

    pub fn logged_out() -> Self {
        Self::default()
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            is_logged_in: false,
            error_message: Some(message.into()),
        }
    }

    /// Same login status, different error message.
    pub fn with_error(&self, message: Option<String>) -> Self {
        Self {
            is_logged_in: self.is_logged_in,
            error_message: message,
        }
    }
}

/// Which completion is allowed to set the state when requests overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Whatever completes last sets the state, even if it was requested first.
    #[default]
    LastCompletionWins,
    /// Completions from requests superseded by a newer request or a logout are dropped.
    LatestRequestWins,
}
