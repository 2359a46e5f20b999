//! Error type shared by the echoic crates

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or unparsable config file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Password hashing failed (bad parameters or RNG failure)
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}
