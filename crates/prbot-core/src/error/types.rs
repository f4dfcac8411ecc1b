//! Core error type for prbot

use thiserror::Error;

/// Result type alias for prbot operations
pub type BotResult<T> = Result<T, BotError>;

/// Main error type for prbot
#[derive(Error, Debug, Clone)]
pub enum BotError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// A filesystem watch could not be created or registered
    #[error("Watch error: {message}")]
    Watch {
        message: String,
        path: Option<String>,
    },

    /// Persisted key-value store errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        key: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// Child process could not be spawned or driven
    #[error("Process error: {message}")]
    Process {
        message: String,
        command: Option<String>,
    },

    /// Invalid input errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// A task status change that would move a task backwards
    #[error("Invalid task transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Work was cancelled before it completed
    #[error("Operation was cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}

impl BotError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "PRBOT_CONFIG",
            Self::Watch { .. } => "PRBOT_WATCH",
            Self::Storage { .. } => "PRBOT_STORAGE",
            Self::Json { .. } => "PRBOT_JSON",
            Self::Io { .. } => "PRBOT_IO",
            Self::Process { .. } => "PRBOT_PROCESS",
            Self::InvalidInput { .. } => "PRBOT_INVALID_INPUT",
            Self::InvalidTransition { .. } => "PRBOT_INVALID_TRANSITION",
            Self::NotFound { .. } => "PRBOT_NOT_FOUND",
            Self::Cancelled => "PRBOT_CANCELLED",
            Self::Other { .. } => "PRBOT_OTHER",
        }
    }

    /// Whether retrying the failed operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Storage { .. } | Self::Process { .. }
        )
    }
}
