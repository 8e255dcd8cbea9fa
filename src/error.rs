//! Error types for the translators.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TranslateError {
    /// The source value uses a feature this vendor dialect cannot express.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A sub-step broke its own invariant; always carries the originating cause.
    #[error("Internal error: {message}: {source}")]
    Internal {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Stream error: {message}")]
    Stream { message: String },

    /// The vendor stream delivered an explicit inline error.
    #[error("Request failed: {message}")]
    RequestFailed {
        message: String,
        error_type: Option<String>,
        code: Option<String>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Flat discriminant of [`TranslateError`], handy for matching in callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Internal,
    Stream,
    RequestFailed,
    Config,
    Io,
    Json,
}

impl TranslateError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Internal {
            message: msg.into(),
            source: source.into(),
        }
    }

    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream {
            message: msg.into(),
        }
    }

    pub fn request_failed(
        msg: impl Into<String>,
        error_type: Option<String>,
        code: Option<String>,
    ) -> Self {
        Self::RequestFailed {
            message: msg.into(),
            error_type,
            code,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::Stream { .. } => ErrorKind::Stream,
            Self::RequestFailed { .. } => ErrorKind::RequestFailed,
            Self::Config { .. } | Self::Toml(_) => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Json,
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_keeps_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = TranslateError::internal("encode message extras", cause);

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Internal error: encode message extras"));
    }

    #[test]
    fn test_request_failed_context() {
        let err = TranslateError::request_failed(
            "overloaded",
            Some("server_error".to_string()),
            Some("503".to_string()),
        );

        match err {
            TranslateError::RequestFailed {
                error_type, code, ..
            } => {
                assert_eq!(error_type.as_deref(), Some("server_error"));
                assert_eq!(code.as_deref(), Some("503"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
