use thiserror::Error;

/// Error types for the budget tracker
#[derive(Error, Debug)]
pub enum AppError {
    /// Form input that failed validation; the message is user-facing
    #[error("{0}")]
    Validation(String),

    /// A resource that must be unique already exists
    #[error("{0}")]
    Duplicate(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No user logged in")]
    NotLoggedIn,

    /// A stored value that did not parse into its schema
    #[error("Malformed value stored under '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for AppError {
    fn from(error: toml::de::Error) -> Self {
        AppError::Config(error.to_string())
    }
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

/// Type alias for Result with AppError
pub type Result<T> = std::result::Result<T, AppError>;
