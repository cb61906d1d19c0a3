//! Error types for the survey bot.

use std::path::PathBuf;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors. All of these are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Question file not found: {}", path.display())]
    MissingCatalog { path: PathBuf },

    #[error("Failed to read question file {}: {source}", path.display())]
    ReadCatalog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse question catalog: {0}")]
    ParseError(String),

    #[error("Question catalog is empty")]
    EmptyCatalog,

    #[error("Question {index} ({title:?}) has no choices")]
    NoChoices { index: usize, title: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("No channel registered under {name}")]
    UnknownChannel { name: String },
}

/// Completion report delivery errors. Logged by the reporter, never returned to a turn.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Report endpoint {url} returned {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Failed to build report client: {0}")]
    Client(String),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
