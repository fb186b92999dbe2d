//! Error types for Quotecast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuotecastError>;

#[derive(Error, Debug)]
pub enum QuotecastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("History store error: {0}")]
    Store(#[from] StoreError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Attempt skipped: {0}")]
    Skip(#[from] SkipError),

    #[error("Retries exhausted after {attempts} attempts without posting")]
    ExhaustedRetries { attempts: u32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl QuotecastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            QuotecastError::InvalidInput(_) => 3,
            QuotecastError::Publish(PublishError::Authentication(_)) => 2,
            QuotecastError::Publish(_) => 1,
            QuotecastError::Config(_) => 1,
            QuotecastError::Store(_) => 1,
            QuotecastError::Skip(_) => 1,
            QuotecastError::ExhaustedRetries { .. } => 1,
        }
    }

    /// Whether this error signals a recoverable per-attempt failure
    ///
    /// Only selection-stage skips are recoverable: the attempt is abandoned
    /// for the sampled author, no state has been mutated, and the loop may
    /// re-draw. Publish and store failures are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QuotecastError::Skip(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open history file {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to read history file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write history file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Recoverable selection failures, tagged with the author that was skipped
///
/// These signal the orchestrator to back off and re-draw; the author's
/// history record is never touched by a skipped attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipError {
    #[error("author [{author}] not found in quote source")]
    AuthorNotFound { author: String },

    #[error("author [{author}] is ambiguous in quote source")]
    AuthorAmbiguous { author: String },

    #[error("quote source unavailable for [{author}]: {reason}")]
    SourceUnavailable { author: String, reason: String },

    #[error(
        "dismissing too long quote by [{author}] ({sentences} sentences, {chars} characters)"
    )]
    QuoteRejected {
        author: String,
        sentences: usize,
        chars: usize,
    },
}

impl SkipError {
    /// The author whose attempt was skipped
    pub fn author(&self) -> &str {
        match self {
            SkipError::AuthorNotFound { author }
            | SkipError::AuthorAmbiguous { author }
            | SkipError::SourceUnavailable { author, .. }
            | SkipError::QuoteRejected { author, .. } => author,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum PublishError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = QuotecastError::InvalidInput("Empty author list".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let error = QuotecastError::Publish(PublishError::Authentication(
            "Missing access token".to_string(),
        ));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_errors() {
        let posting = QuotecastError::Publish(PublishError::Posting("timeout".to_string()));
        assert_eq!(posting.exit_code(), 1);

        let config = QuotecastError::Config(ConfigError::MissingField(
            "tokens.consumer_key".to_string(),
        ));
        assert_eq!(config.exit_code(), 1);

        let exhausted = QuotecastError::ExhaustedRetries { attempts: 10 };
        assert_eq!(exhausted.exit_code(), 1);
    }

    #[test]
    fn test_only_skips_are_retryable() {
        let skip = QuotecastError::Skip(SkipError::AuthorNotFound {
            author: "Seneca".to_string(),
        });
        assert!(skip.is_retryable());

        let publish = QuotecastError::Publish(PublishError::Network("refused".to_string()));
        assert!(!publish.is_retryable());

        let store = QuotecastError::Store(StoreError::Read {
            path: "/tmp/history".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert!(!store.is_retryable());
    }

    #[test]
    fn test_skip_error_carries_author() {
        let skip = SkipError::QuoteRejected {
            author: "Marcus Aurelius".to_string(),
            sentences: 7,
            chars: 812,
        };
        assert_eq!(skip.author(), "Marcus Aurelius");

        let message = format!("{}", skip);
        assert!(message.contains("Marcus Aurelius"));
        assert!(message.contains("7 sentences"));
        assert!(message.contains("812 characters"));
    }

    #[test]
    fn test_error_message_formatting() {
        let error = QuotecastError::Skip(SkipError::AuthorAmbiguous {
            author: "Bacon".to_string(),
        });
        assert_eq!(
            format!("{}", error),
            "Attempt skipped: author [Bacon] is ambiguous in quote source"
        );
    }

    #[test]
    fn test_error_conversion_from_skip_error() {
        let skip = SkipError::AuthorNotFound {
            author: "Nobody".to_string(),
        };
        let error: QuotecastError = skip.into();
        assert!(matches!(error, QuotecastError::Skip(_)));
    }

    #[test]
    fn test_publish_error_clone() {
        let original = PublishError::RateLimit("slow down".to_string());
        let cloned = original.clone();
        assert_eq!(format!("{}", original), format!("{}", cloned));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_err() -> Result<()> {
            Err(QuotecastError::InvalidInput("test".to_string()))
        }
        assert!(returns_err().is_err());
    }
}
