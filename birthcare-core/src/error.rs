use thiserror::Error;

#[derive(Error, Debug)]
pub enum BirthcareError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unknown {kind} status: {value}")]
    UnknownStatus { kind: &'static str, value: String },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl BirthcareError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BirthcareError>;
