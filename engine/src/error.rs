//! Error types for the Quadro engine.

use thiserror::Error;

/// All possible errors from the Quadro engine.
///
/// The engine performs no IO; every variant is a decoding problem with a
/// payload handed in by the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("content is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = serde_json::from_str::<serde_json::Value>("{not json")
            .map_err(Error::from)
            .unwrap_err();
        assert!(err.to_string().starts_with("content is not valid JSON"));
    }
}
