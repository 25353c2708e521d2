//! nkn-eth-resolver: NKN address resolution for Ethereum accounts and ENS names
//!
//! Re-exports the core types and the alloy-backed resolver.

pub use eth_resolver::{
    CallOptions, Connection, Connector, RegistryContract, Resolver, ResolverError, Result,
};
pub use eth_resolver_core::{
    constants, CacheTimeout, ConfigOverride, Expiration, ExpiringCache, NknRecord,
    ResolverConfig, Target,
};
