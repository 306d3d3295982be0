use thiserror::Error;

/// Classified outcome of a remote call.
///
/// `NotFound` is split out from the other non-2xx outcomes so that callers
/// can treat repeat deletes and reads of already-gone objects specially.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("SignalCraft API object not found")]
    NotFound,

    #[error("SignalCraft API error: status={status} body={body}")]
    Api { status: u16, body: String },

    #[error("SignalCraft API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode SignalCraft API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// HTTP status carried by the outcome, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound => Some(404),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

/// Convenience result type for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
