use thiserror::Error;

/// Failures talking to the chat-completion provider.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limit exceeded (retry after {0}s)")]
    RateLimit(u64),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response body: {0}")]
    InvalidResponse(String),

    #[error("model returned no content")]
    Empty,
}

/// Local extraction failures. These never reach the caller as errors;
/// the interpreter recovers them into a low-confidence result.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unrecognized date string: {0}")]
    DateFormat(String),

    #[error("unrecognized time string: {0}")]
    TimeFormat(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config line {line}: {content}")]
    InvalidLine { line: usize, content: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Postgres unique-constraint violation (SQLSTATE 23505).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::Database(err) => err
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == "23505"),
            StoreError::NotFound => false,
        }
    }
}

/// Best-effort user-record sync failures. Callers log these and carry on;
/// they never block the primary operation.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("user sync timed out")]
    Timeout,

    #[error("duplicate user record could not be reconciled: {0}")]
    Conflict(StoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
