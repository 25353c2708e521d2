//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config merge error: {0}")]
    ConfigMerge(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ConfigMerge(e.to_string())
    }
}
