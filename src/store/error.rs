use thiserror::Error;

/// Errors returned by the relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Could not open the database.
    #[error("failed to connect to '{url}': {message}")]
    ConnectionFailed {
        /// Connection URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Schema or view creation failed.
    #[error("failed to migrate schema: {0}")]
    MigrationFailed(#[source] sqlx::Error),

    /// A query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A chunk could not be written.
    #[error("failed to upsert {rows} {kind} rows: {message}")]
    UpsertFailed {
        /// Batch kind (`questions`, `pillars`, `cities`).
        kind: &'static str,
        /// Rows in the failed chunk.
        rows: usize,
        /// Error message.
        message: String,
    },

    /// The backend refused the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
