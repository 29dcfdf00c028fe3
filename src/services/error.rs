//! Error types for backend access and file export

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

/// Regex to match HTML tags in server messages
static HTML_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Errors from the document store
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a response
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response without a recognisable error envelope
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Message extracted from the backend's error envelope
    #[error("server error: {0}")]
    Server(String),

    /// The response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Entity (or document) does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Text for the notification shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Could not reach the server. Check the connection settings.".to_string()
            }
            Self::Http { status, message } if message.is_empty() => {
                format!("The server answered with HTTP {}", status)
            }
            Self::Http { message, .. } => message.clone(),
            Self::Server(message) => message.clone(),
            Self::Decode(_) => "The server sent a response that could not be read.".to_string(),
            Self::NotFound(what) => format!("{} was not found on the server", what),
        }
    }

    /// Whether the error came back from a write that was parsed from an envelope
    pub fn is_server_message(&self) -> bool {
        matches!(self, Self::Server(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Errors while producing an export file
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no columns selected")]
    EmptySelection,

    #[error("could not encode file: {0}")]
    Encode(String),

    #[error("could not write file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Fetch(#[from] ApiError),
}

impl ExportError {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptySelection => "Select at least one column before exporting.".to_string(),
            Self::Encode(msg) => format!("Export Error: {}", msg),
            Self::Io(err) => format!("Export Error: {}", err),
            Self::Fetch(err) => err.user_message(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Encode(err.to_string())
    }
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

fn strip_html(s: &str) -> String {
    HTML_TAG_REGEX.replace_all(s, "").trim().to_string()
}

/// Extract a readable message from a backend error body
///
/// Lookup order: `_server_messages` (a JSON string holding an array of
/// JSON-encoded `{message}` objects), `message`, `exception`, then the raw
/// body itself.
pub fn parse_error_envelope(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    if let Some(messages) = value.get("_server_messages").and_then(server_messages) {
        if !messages.is_empty() {
            return messages.join("\n");
        }
    }

    for key in ["message", "exception"] {
        match value.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return strip_html(s),
            Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }

    body.trim().to_string()
}

fn server_messages(raw: &Value) -> Option<Vec<String>> {
    let entries: Vec<Value> = match raw {
        Value::String(s) => serde_json::from_str(s).ok()?,
        Value::Array(items) => items.clone(),
        _ => return None,
    };

    let messages = entries
        .iter()
        .filter_map(|entry| {
            let decoded = match entry {
                Value::String(s) => serde_json::from_str::<Value>(s).unwrap_or(Value::String(s.clone())),
                other => other.clone(),
            };
            match decoded {
                Value::Object(map) => map.get("message").and_then(Value::as_str).map(strip_html),
                Value::String(s) => Some(strip_html(&s)),
                _ => None,
            }
        })
        .filter(|m| !m.is_empty())
        .collect();
    Some(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_messages_envelope() {
        let inner = serde_json::to_string(&serde_json::json!({"message": "<b>Email</b> is required"}))
            .unwrap();
        let list = serde_json::to_string(&vec![inner]).unwrap();
        let body = serde_json::json!({"_server_messages": list, "exception": "ValidationError"});
        assert_eq!(parse_error_envelope(&body.to_string()), "Email is required");
    }

    #[test]
    fn test_falls_back_to_exception() {
        let body = r#"{"exception": "frappe.exceptions.DoesNotExistError: Employee X not found"}"#;
        assert_eq!(
            parse_error_envelope(body),
            "frappe.exceptions.DoesNotExistError: Employee X not found"
        );
    }

    #[test]
    fn test_message_before_exception() {
        let body = r#"{"message": "Not permitted", "exception": "PermissionError"}"#;
        assert_eq!(parse_error_envelope(body), "Not permitted");
    }

    #[test]
    fn test_raw_body_when_not_json() {
        assert_eq!(parse_error_envelope("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(parse_error_envelope(r#"{"other": 1}"#), r#"{"other": 1}"#);
    }

    #[test]
    fn test_user_messages() {
        let err = ApiError::Network("connection refused".to_string());
        assert!(err.user_message().contains("connection settings"));

        let err = ApiError::NotFound("Employee".to_string());
        assert_eq!(err.user_message(), "Employee was not found on the server");

        let err = ExportError::Encode("bad font".to_string());
        assert!(err.user_message().starts_with("Export Error"));
    }
}
