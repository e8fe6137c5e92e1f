//! Error types for feedback-analyzer

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between pressing submit and holding a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The request never completed (connection refused, DNS, timeout)
    #[error("{0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("server responded with {status}{}", detail(.message))]
    Server { status: u16, message: Option<String> },

    /// A success status whose body is not an analysis result
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A request is already outstanding
    #[error("a request is already in flight")]
    Busy,

    /// The request task died before settling
    #[error("request interrupted: {0}")]
    Interrupted(String),
}

impl AnalysisError {
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        AnalysisError::Server { status: status.as_u16(), message: server_error_message(body) }
    }

    /// The single line shown to the user: the server's own `error` text when it sent one.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Server { message: Some(message), .. } => message.clone(),
            AnalysisError::Server { status, message: None } => match StatusCode::from_u16(*status) {
                Ok(code) => format!("Request failed with status {}", code),
                Err(_) => format!("Request failed with status {}", status),
            },
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::Transport(err.to_string())
    }
}

fn detail(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Pulls `{"error": "..."}` out of an error body, if that is what it is.
fn server_error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("error")?.as_str().map(str::to_owned)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubjectError {
    #[error("unknown subject '{0}' (expected 'Artificial Intelligence'/'ai' or 'Optimization Techniques'/'ot')")]
    Unknown(String),
}
