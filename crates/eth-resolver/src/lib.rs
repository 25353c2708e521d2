//! eth-resolver: resolve Ethereum identifiers to NKN addresses
//!
//! Identifiers carrying the configured prefix (`ETH:` by default) are
//! resolved against an on-chain account registry, going through ENS first
//! when the identifier is a name rather than a raw account address. Results
//! are cached per identifier.

pub mod error;
pub mod resolver;
pub mod rpc;
pub mod transport;

pub use error::{ResolverError, Result};
pub use resolver::Resolver;
pub use rpc::{AlloyConnection, AlloyConnector, AlloyRegistry};
pub use transport::{CallOptions, Connection, Connector, RegistryContract};
