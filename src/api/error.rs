//! Typed errors of the REST layer

use serde_json::Value;
use thiserror::Error as ThisError;

/// Why a request did not produce a usable response
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum ApiError {
    /// The request never got an HTTP answer (DNS, refused, timeout...)
    #[error("{0}")]
    Transport(String),
    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        /// Parsed error body (`null` when empty, a string when not JSON)
        payload: Value,
    },
}

impl ApiError {
    pub fn rejected(status: u16, payload: Value) -> Self {
        ApiError::Rejected {
            status,
            message: extract_message(&payload, status),
            payload,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(_) => None,
            ApiError::Rejected { status, .. } => Some(*status),
        }
    }
}

/// Message of an error body: `message`, then `error`, then `detail`,
/// otherwise a synthesised `Request failed (<status>)`.
pub fn extract_message(payload: &Value, status: u16) -> String {
    ["message", "error", "detail"]
        .iter()
        .filter_map(|key| payload.get(key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Null | Value::Bool(false) | Value::String(_) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| format!("Request failed ({})", status))
}
