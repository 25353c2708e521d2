//! Collaborator seams: node connections, name resolution and the registry
//!
//! The resolver only talks to the chain through these traits. [`crate::rpc`]
//! implements them on top of alloy; tests substitute in-memory versions.
//!
//! A connection is released when it is dropped, so every exit path out of a
//! resolution releases it.

use async_trait::async_trait;

use eth_resolver_core::{Address, NknRecord};

use crate::error::Result;

/// Options for a read-only registry call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Query against pending state instead of the latest block
    pub pending: bool,
    /// Caller address for the call
    pub from: Option<Address>,
    /// Pin the call to a block number
    pub block_number: Option<u64>,
}

/// Opens connections to a node
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    /// Open a connection to `endpoint`. The resolver bounds this call with
    /// the configured dial timeout.
    async fn dial(&self, endpoint: &str) -> Result<Self::Connection>;
}

/// An open, request-scoped connection
#[async_trait]
pub trait Connection: Send + Sync {
    type Registry: RegistryContract;

    /// Resolve a human-readable name to an account address
    async fn resolve_name(&self, name: &str) -> Result<Address>;

    /// Bind to the account registry deployed at `contract`
    fn bind(&self, contract: Address) -> Result<Self::Registry>;
}

/// Handle to the account registry contract
#[async_trait]
pub trait RegistryContract: Send + Sync {
    /// Fetch the NKN record registered for `account`
    async fn get_nkn_addr(&self, opts: &CallOptions, account: Address) -> Result<NknRecord>;

    /// Check that contract code is deployed at the bound address
    async fn ensure_deployed(&self) -> Result<()>;
}
