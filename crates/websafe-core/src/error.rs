//! Error types for the analysis core.

/// Analysis core errors.
#[derive(Debug, thiserror::Error)]
pub enum WebSafeError {
    /// URL belongs to a non-web or extension-internal scheme.
    #[error("skipped url: {url}")]
    SkippedUrl { url: String },

    /// Scoring service answered with a non-success status.
    #[error("scoring service error: HTTP {status}: {message}")]
    Service { status: u16, message: String },

    /// Transport failure talking to the scoring service.
    #[error("network error: {message}")]
    Network { message: String },

    /// Scoring service response could not be interpreted.
    #[error("invalid response: {message}")]
    Parse { message: String },

    /// Host key-value store operation failed.
    #[error("storage error: {message}")]
    Storage { message: String },

    /// Host API (badge, popup) call failed.
    #[error("host error: {message}")]
    Host { message: String },

    /// User-supplied URL is unusable.
    #[error("invalid url: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl WebSafeError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SkippedUrl { .. } => 0,
            Self::InvalidUrl { .. } => 1,
            Self::Config { .. } => 1,

            // Scoring service unreachable or misbehaving
            Self::Service { .. } => 3,
            Self::Network { .. } => 3,
            Self::Parse { .. } => 4,

            // Host side
            Self::Storage { .. } => 5,
            Self::Host { .. } => 5,
        }
    }

    /// Whether the get-or-compute pipeline replaces this error with a fallback analysis.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Service { .. } | Self::Network { .. } | Self::Parse { .. }
        )
    }
}

impl From<reqwest::Error> for WebSafeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Parse {
                message: err.to_string(),
            };
        }
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for analysis core operations.
pub type WebSafeResult<T> = Result<T, WebSafeError>;
