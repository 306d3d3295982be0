use thiserror::Error;

/// Core error types for SignalCraft sync operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid resource identity: {0}")]
    InvalidIdentity(String),

    #[error("Invalid resource kind: {0}")]
    InvalidKind(String),

    #[error("Invalid desired spec: {message}")]
    InvalidSpec { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time parsing error: {0}")]
    TimeError(#[from] time::error::Parse),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new InvalidIdentity error
    pub fn invalid_identity(identity: impl Into<String>) -> Self {
        Self::InvalidIdentity(identity.into())
    }

    /// Create a new InvalidKind error
    pub fn invalid_kind(kind: impl Into<String>) -> Self {
        Self::InvalidKind(kind.into())
    }

    /// Create a new InvalidSpec error (malformed desired spec; retrying
    /// without a spec correction cannot succeed)
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::InvalidSpec {
            message: message.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is a blocking spec error, i.e. one that cannot
    /// self-heal through retries alone
    pub fn is_spec_error(&self) -> bool {
        matches!(self, Self::InvalidSpec { .. } | Self::JsonError(_))
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidIdentity(_) | Self::InvalidKind(_) => ErrorCategory::Validation,
            Self::InvalidSpec { .. } | Self::JsonError(_) => ErrorCategory::Serialization,
            Self::TimeError(_) => ErrorCategory::System,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Serialization,
    System,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Serialization => write!(f, "serialization"),
            Self::System => write!(f, "system"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
