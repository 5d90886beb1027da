// Error types for mutuals.
// Covers username validation, GitHub API failures, export I/O and cancellation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MutualsError {
    #[error("Invalid GitHub username: {0:?}")]
    InvalidUsername(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Transient network error: {0}")]
    Transient(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Fetch failed after {attempts} attempts: {reason}")]
    Fetch { attempts: u32, reason: String },

    #[error("Malformed API response: {0}")]
    Parse(String),

    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl MutualsError {
    /// Whether the failure is worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, MutualsError::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, MutualsError>;
