use thiserror::Error;
use uuid::Uuid;

/// Main error type for the predictions service
#[derive(Error, Debug)]
pub enum PollaError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Persistence errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Domain errors
    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Invalid confidence: {0}")]
    InvalidConfidence(String),

    #[error("Invalid teams: {0}")]
    InvalidTeams(String),

    // AI errors
    #[error("AI request failed: {0}")]
    AiRequest(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PollaError {
    pub fn match_not_found(id: Uuid) -> Self {
        PollaError::MatchNotFound(id.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PollaError::MatchNotFound(_))
    }
}

/// Result type alias for PollaError
pub type Result<T> = std::result::Result<T, PollaError>;
