//! From trait implementations for BotError conversions

use super::types::BotError;

impl From<std::io::Error> for BotError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<toml::de::Error> for BotError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_context(error.to_string(), "failed to parse TOML")
    }
}

impl From<toml::ser::Error> for BotError {
    fn from(error: toml::ser::Error) -> Self {
        Self::config_with_context(error.to_string(), "failed to render TOML")
    }
}

impl From<regex::Error> for BotError {
    fn from(error: regex::Error) -> Self {
        Self::invalid_field("ignore_patterns", error.to_string())
    }
}

impl From<notify::Error> for BotError {
    fn from(error: notify::Error) -> Self {
        let path = error
            .paths
            .first()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self::Watch {
            message: error.to_string(),
            path: if path.is_empty() { None } else { Some(path) },
        }
    }
}

impl From<tokio::task::JoinError> for BotError {
    fn from(error: tokio::task::JoinError) -> Self {
        if error.is_cancelled() {
            Self::Cancelled
        } else {
            Self::other(format!("background task panicked: {}", error))
        }
    }
}
