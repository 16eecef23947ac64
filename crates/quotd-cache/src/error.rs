use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid timestamp stored in cache: {0}")]
    InvalidTimestamp(i64),
}

pub type Result<T> = std::result::Result<T, CacheError>;
