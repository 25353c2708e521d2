//! eth-resolver-core: Core types for resolving NKN addresses from Ethereum
//!
//! An identifier such as `ETH:0x5aAe...` or `ETH:alice.eth` is routed by its
//! prefix, classified as either a raw account address or an ENS name, and
//! finally looked up in an on-chain account registry that maps Ethereum
//! accounts to NKN addresses.
//!
//! This crate holds everything that does not touch the network:
//! - [`ResolverConfig`]: built-in defaults and override merging
//! - [`Target`]: raw address vs. name classification of an identifier
//! - [`NknRecord`]: the registry record and its string form
//! - [`ExpiringCache`]: the concurrent cache consulted before every lookup

pub mod cache;
mod config;
mod error;
mod identifier;
mod record;

pub use cache::{Expiration, ExpiringCache};
pub use config::{CacheTimeout, ConfigOverride, ResolverConfig};
pub use error::Error;
pub use identifier::{is_hex_address, strip_prefix, Target};
pub use record::{NknRecord, PUBLIC_KEY_SIZE};

pub use alloy_primitives::Address;

pub type Result<T> = std::result::Result<T, Error>;

/// Built-in defaults and fixed intervals
pub mod constants {
    use std::time::Duration;

    /// Prefix routed to this resolver unless overridden
    pub const DEFAULT_PREFIX: &str = "ETH:";

    /// Connection-open bound in milliseconds
    pub const DEFAULT_DIAL_TIMEOUT_MS: i64 = 5000;

    /// Housekeeping sweep of the cache, independent of entry expiration
    pub const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    /// Joins the registry identifier and the hex public key
    pub const IDENTIFIER_SEPARATOR: char = '.';
}
