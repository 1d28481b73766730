use std::num::ParseIntError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MbError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerDe(#[from] serde_json::Error),

    #[error("Invalid port: {0}")]
    InvalidPort(#[from] ParseIntError),

    /// The server answered, but not with the status the operation requires.
    /// `body` holds the pretty-printed response body.
    #[error("Expected status code {expected} but received {actual}:\n{body}")]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        body: String,
    },
}

pub type MbResult<T> = Result<T, MbError>;
