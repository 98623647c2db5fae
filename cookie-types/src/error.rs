//! Error types for Cookie Cloud wire handling.

use thiserror::Error;

/// Errors that can occur while encoding or decoding wire types.
#[derive(Debug, Error)]
pub enum WireError {
    /// JSON serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// JSON deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let source = serde_json::from_str::<u8>("not json").unwrap_err();
        let err = WireError::Deserialization(source);
        assert!(err.to_string().starts_with("deserialization failed:"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WireError>();
    }
}
