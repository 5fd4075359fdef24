use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building the route table or navigating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Duplicate route pattern: {0}")]
    DuplicatePattern(String),

    #[error("No route matches '{0}'")]
    NotFound(String),

    #[error("Unknown route name: {0}")]
    UnknownName(String),

    #[error("Missing parameter '{param}' for route '{name}'")]
    MissingParam { name: String, param: String },
}

/// Errors raised by the persistent key-value store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode storage file {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Errors surfaced by the authenticated HTTP client.
///
/// Transport failures are passed through with their source intact; the client
/// never interprets HTTP status codes, so a 401 is an `Ok` response.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request timed out after {timeout_ms} ms: {source}")]
    Timeout {
        timeout_ms: u64,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read auth token: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_error_messages_name_the_offender() {
        let err = RouteError::MissingParam {
            name: "Profile".to_string(),
            param: "id".to_string(),
        };
        assert_eq!(err.to_string(), "Missing parameter 'id' for route 'Profile'");
        assert_eq!(
            RouteError::NotFound("/nope".to_string()).to_string(),
            "No route matches '/nope'"
        );
    }

    #[test]
    fn test_encode_failure_is_not_reported_as_corruption() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = StorageError::Encode {
            path: PathBuf::from("/tmp/store.json"),
            source,
        };
        let message = err.to_string();
        assert!(message.starts_with("Failed to encode storage file /tmp/store.json"));
        assert!(!message.contains("corrupt"));
    }

    #[test]
    fn test_storage_error_keeps_path() {
        let err = StorageError::Io {
            path: PathBuf::from("/tmp/store.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let message = err.to_string();
        assert!(message.contains("/tmp/store.json"));
        assert!(message.contains("denied"));
    }
}
