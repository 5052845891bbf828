use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

const NETWORK_MESSAGE: &str = "Unable to reach the server. Check your connection and try again.";
const TIMEOUT_MESSAGE: &str = "The server is taking too long to respond. Please try again later.";
const UNEXPECTED_MESSAGE: &str = "Something went wrong. Please try again.";

/// Failures of the repository/file data service, classified by what the
/// user should be told.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    /// The server answered with an error message.
    #[error("server error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The server rejected fields of the request. Field and message order
    /// follow the response body.
    #[error("validation failed ({status})")]
    Validation {
        status: u16,
        fields: Vec<(String, Vec<String>)>,
    },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Classify an error response from its status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            let text = body.trim();
            return if text.is_empty() {
                ApiError::Unexpected(format!("HTTP {status} with empty body"))
            } else {
                ApiError::Backend {
                    status,
                    message: text.to_string(),
                }
            };
        };

        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return ApiError::Backend {
                status,
                message: message.to_string(),
            };
        }

        if let Some(errors) = value.get("errors").and_then(Value::as_object) {
            let fields = errors
                .iter()
                .map(|(field, messages)| (field.clone(), message_list(messages)))
                .collect();
            return ApiError::Validation { status, fields };
        }

        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return ApiError::Backend {
                status,
                message: message.to_string(),
            };
        }

        ApiError::Unexpected(format!("HTTP {status}: {body}"))
    }

    /// The text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => NETWORK_MESSAGE.to_string(),
            ApiError::Timeout => TIMEOUT_MESSAGE.to_string(),
            ApiError::Backend { message, .. } => message.clone(),
            ApiError::Validation { fields, .. } => fields
                .iter()
                .flat_map(|(field, messages)| {
                    messages.iter().map(move |message| format!("- {field} {message}"))
                })
                .collect::<Vec<_>>()
                .join("\n"),
            ApiError::Unexpected(_) => UNEXPECTED_MESSAGE.to_string(),
        }
    }
}

fn message_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

#[cfg(feature = "network")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() || err.is_request() {
            ApiError::Network(err.to_string())
        } else if err.is_decode() {
            ApiError::Unexpected(format!("malformed response: {err}"))
        } else {
            ApiError::Unexpected(err.to_string())
        }
    }
}
