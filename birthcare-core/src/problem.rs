use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error body returned by the birthcare API
///
/// Validation failures (422) carry a per-field `errors` map; other failures
/// usually only a `message` or `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiProblem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, FieldErrors>,
}

/// A field maps to one message or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldErrors {
    One(String),
    Many(Vec<String>),
}

impl FieldErrors {
    pub fn messages(&self) -> Vec<&str> {
        match self {
            FieldErrors::One(m) => vec![m.as_str()],
            FieldErrors::Many(ms) => ms.iter().map(String::as_str).collect(),
        }
    }
}

impl ApiProblem {
    /// Parse a response body; non-JSON bodies become the message
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<ApiProblem>(body) {
            Ok(problem) => problem,
            Err(_) => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                Self {
                    message: (!text.is_empty()).then_some(text),
                    ..Self::default()
                }
            }
        }
    }

    pub fn summary(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }

    /// Field messages in field-name order
    pub fn field_messages(&self) -> Vec<String> {
        self.errors
            .values()
            .flat_map(|e| e.messages())
            .map(str::to_string)
            .collect()
    }

    /// Multi-line text: the summary, then one line per field message
    pub fn flatten(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        if let Some(summary) = self.summary() {
            lines.push(summary.to_string());
        }
        for message in self.field_messages() {
            if !lines.contains(&message) {
                lines.push(message);
            }
        }
        lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.summary().is_none() && self.errors.is_empty()
    }
}
