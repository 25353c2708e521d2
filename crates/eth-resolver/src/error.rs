//! Resolver error types

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Config error: {0}")]
    Config(#[from] eth_resolver_core::Error),

    #[error("Connection error: {endpoint} - {message}")]
    Connection { endpoint: String, message: String },

    #[error("Dial timeout: {endpoint} not reachable within {timeout:?}")]
    DialTimeout { endpoint: String, timeout: Duration },

    #[error("Contract bind error: {0}")]
    ContractBind(String),

    #[error("Name resolution error: {name} - {message}")]
    NameResolution { name: String, message: String },

    #[error("Contract call error: {0}")]
    ContractCall(String),
}

impl ResolverError {
    /// Whether the error came from opening the connection
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            ResolverError::Connection { .. } | ResolverError::DialTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;
