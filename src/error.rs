use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// Boxed error used for middleware, transport and stream failure causes.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Server-provided detail payload attached to an HTTP failure.
///
/// The error body is decoded as JSON when possible; anything that does not
/// parse is kept as raw text so diagnostics never lose the original bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetails {
    Json(serde_json::Value),
    Text(String),
}

impl ErrorDetails {
    /// Decode an error body, preferring JSON and falling back to plain text.
    pub fn from_body(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(value) => ErrorDetails::Json(value),
            Err(_) => ErrorDetails::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ErrorDetails::Json(value) => Some(value),
            ErrorDetails::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ErrorDetails::Json(_) => None,
            ErrorDetails::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetails::Json(value) => write!(f, "{value}"),
            ErrorDetails::Text(text) => f.write_str(text),
        }
    }
}

/// A structured payload the server pushed as part of a failure, carried as an
/// error cause so callers can recover it by downcast.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerReported(pub serde_json::Value);

impl fmt::Display for ServerReported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for ServerReported {}

/// Every failure the client reports, as a closed two-kind sum.
///
/// `Http` means the endpoint responded and the status denotes failure.
/// `Client` covers everything else: transport failure before any response,
/// a middleware hook that errored, or a malformed stream payload.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status} {status_text}")]
    Http {
        status: u16,
        status_text: String,
        details: ErrorDetails,
    },

    #[error("{message}")]
    Client {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },
}

impl ApiError {
    pub fn http(status: StatusCode, details: ErrorDetails) -> Self {
        ApiError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            details,
        }
    }

    pub fn client(message: impl Into<String>) -> Self {
        ApiError::Client {
            message: message.into(),
            cause: None,
        }
    }

    pub fn client_with(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        ApiError::Client {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, ApiError::Http { .. })
    }

    pub fn is_client(&self) -> bool {
        matches!(self, ApiError::Client { .. })
    }

    /// Numeric status of an `Http` failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Client { .. } => None,
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            ApiError::Http { status_text, .. } => Some(status_text),
            ApiError::Client { .. } => None,
        }
    }

    /// Server-provided details of an `Http` failure.
    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            ApiError::Http { details, .. } => Some(details),
            ApiError::Client { .. } => None,
        }
    }

    /// Underlying cause of a `Client` failure.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            ApiError::Http { .. } => None,
            ApiError::Client { cause, .. } => cause.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn details_prefer_json() {
        let details = ErrorDetails::from_body(br#"{"code":"object-not-found"}"#);
        assert_eq!(details.as_json(), Some(&json!({"code": "object-not-found"})));
    }

    #[test]
    fn details_fall_back_to_text() {
        let details = ErrorDetails::from_body(b"upstream exploded");
        assert_eq!(details.as_text(), Some("upstream exploded"));
    }

    #[test]
    fn http_error_exposes_status() {
        let err = ApiError::http(StatusCode::NOT_FOUND, ErrorDetails::Text(String::new()));
        assert!(err.is_http());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.status_text(), Some("Not Found"));
    }

    #[test]
    fn client_error_exposes_cause() {
        let cause = ServerReported(json!({"code": "invalid-file"}));
        let err = ApiError::client_with("import failed", cause);
        assert!(err.is_client());
        assert_eq!(err.status(), None);
        let recovered = err
            .cause()
            .and_then(|c| c.downcast_ref::<ServerReported>())
            .unwrap();
        assert_eq!(recovered.0, json!({"code": "invalid-file"}));
    }
}
