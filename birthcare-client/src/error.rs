use birthcare_core::{ApiProblem, BirthcareError};
use reqwest::StatusCode;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unauthenticated")]
    Unauthorized,

    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Document rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Domain(#[from] BirthcareError),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Classify a non-success upstream response
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let problem = ApiProblem::from_body(body);
        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::UNPROCESSABLE_ENTITY => {
                let fields = problem
                    .errors
                    .iter()
                    .map(|(field, errs)| {
                        (
                            field.clone(),
                            errs.messages().into_iter().map(str::to_string).collect(),
                        )
                    })
                    .collect();
                let message = problem.flatten();
                ClientError::Validation {
                    message: if message.is_empty() {
                        "The given data was invalid.".to_string()
                    } else {
                        message
                    },
                    fields,
                }
            }
            other => ClientError::Status {
                status: other.as_u16(),
                message: problem
                    .summary()
                    .map(str::to_string)
                    .unwrap_or_else(|| other.canonical_reason().unwrap_or("Error").to_string()),
            },
        }
    }

    /// The caller must sign in again
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }

    /// HTTP status reported by the remote API, if any
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Validation { .. } => Some(422),
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Text shown to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(e) if e.is_timeout() => {
                "The server took too long to respond. Please try again.".to_string()
            }
            ClientError::Transport(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            ClientError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ClientError::Validation { message, .. } => message.clone(),
            ClientError::Status { status, message } if *status >= 500 => {
                format!("Server error ({}): {}", status, message)
            }
            ClientError::Status { message, .. } => message.clone(),
            ClientError::Decode(_) => "Unexpected response from the server.".to_string(),
            ClientError::Cancelled => "Request cancelled.".to_string(),
            ClientError::InvalidUrl(url) => format!("Invalid server address: {}", url),
            ClientError::Render(message) => format!("Could not generate document: {}", message),
            ClientError::Domain(BirthcareError::Validation { message }) => message.clone(),
            ClientError::Domain(e) => e.to_string(),
        }
    }
}
