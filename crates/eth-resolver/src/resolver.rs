//! Resolution pipeline: prefix routing, cache, name resolution and registry
//! lookup

use std::time::Duration;

use eth_resolver_core::constants::CACHE_SWEEP_INTERVAL;
use eth_resolver_core::{
    strip_prefix, Address, ConfigOverride, Expiration, ExpiringCache, NknRecord, ResolverConfig,
    Target,
};

use crate::error::{ResolverError, Result};
use crate::rpc::AlloyConnector;
use crate::transport::{CallOptions, Connection, Connector, RegistryContract};

/// Resolves prefixed Ethereum identifiers to NKN addresses.
///
/// Configuration is fixed at construction. Concurrent `resolve` calls share
/// only the cache; each cache miss opens and drops its own connection.
pub struct Resolver<C: Connector = AlloyConnector> {
    config: ResolverConfig,
    contract: Address,
    cache: ExpiringCache<String>,
    connector: C,
}

impl Resolver<AlloyConnector> {
    /// Create a resolver talking to the configured node through alloy
    pub async fn new(overrides: Option<ConfigOverride>) -> Result<Self> {
        Self::with_connector(AlloyConnector, overrides).await
    }
}

impl<C: Connector> Resolver<C> {
    /// Create a resolver with a custom connector.
    ///
    /// Runs a startup health check: dial the node, bind the registry at the
    /// configured address and confirm it is deployed, then drop the
    /// connection again.
    pub async fn with_connector(connector: C, overrides: Option<ConfigOverride>) -> Result<Self> {
        let config = ResolverConfig::default().merge(overrides.as_ref());

        let contract = {
            let conn = dial(&connector, &config).await?;
            let contract = config
                .contract()
                .map_err(|e| ResolverError::ContractBind(e.to_string()))?;
            conn.bind(contract)?.ensure_deployed().await?;
            contract
        };

        let cache = ExpiringCache::with_sweeper(config.cache_timeout, CACHE_SWEEP_INTERVAL);

        tracing::info!(
            prefix = %config.prefix,
            rpc_server = %config.rpc_server,
            contract = %contract,
            cache_timeout = %config.cache_timeout,
            "Resolver initialized"
        );

        Ok(Self {
            config,
            contract,
            cache,
            connector,
        })
    }

    /// Resolve `identifier` to an NKN address.
    ///
    /// Returns `Ok(None)` without any I/O when the identifier does not carry
    /// the configured prefix.
    pub async fn resolve(&self, identifier: &str) -> Result<Option<String>> {
        let Some(key) = strip_prefix(identifier, &self.config.prefix) else {
            return Ok(None);
        };

        if let Some(cached) = self.cache.get(key) {
            tracing::debug!(key, "Cache hit");
            return Ok(Some(cached));
        }
        tracing::debug!(key, "Cache miss");

        let conn = dial(&self.connector, &self.config).await?;

        let account = match Target::classify(key) {
            Target::Address(address) => address,
            Target::Name(name) => {
                let address = conn.resolve_name(&name).await?;
                tracing::debug!(name = %name, address = %address, "Resolved name");
                address
            }
        };

        let registry = conn.bind(self.contract)?;
        let record = self.query(&registry, account).await?;

        let nkn_addr = record.compose();
        self.cache.set(key, nkn_addr.clone(), Expiration::Default);

        Ok(Some(nkn_addr))
    }

    async fn query(&self, registry: &<C::Connection as Connection>::Registry, account: Address) -> Result<NknRecord> {
        let opts = CallOptions::default();
        tracing::debug!(account = %account, contract = %self.contract, "Querying registry");

        match self.config.query_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, registry.get_nkn_addr(&opts, account))
                .await
                .map_err(|_| {
                    ResolverError::ContractCall(format!("query timed out after {timeout:?}"))
                })?,
            None => registry.get_nkn_addr(&opts, account).await,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Number of cached entries, including expired ones not yet swept
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

/// Open a connection, bounded by the dial timeout when one is configured
async fn dial<C: Connector>(connector: &C, config: &ResolverConfig) -> Result<C::Connection> {
    let endpoint = config.rpc_server.as_str();
    tracing::debug!(endpoint, "Dialing node");

    match config.dial_timeout() {
        Some(timeout) => tokio::time::timeout(timeout, connector.dial(endpoint))
            .await
            .map_err(|_| dial_timeout(endpoint, timeout))?,
        None => connector.dial(endpoint).await,
    }
}

fn dial_timeout(endpoint: &str, timeout: Duration) -> ResolverError {
    ResolverError::DialTimeout {
        endpoint: endpoint.to_string(),
        timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Connector whose dial takes `delay` and then succeeds
    struct SlowConnector {
        delay: Duration,
    }

    struct StubConnection;

    struct StubRegistry;

    #[async_trait]
    impl Connector for SlowConnector {
        type Connection = StubConnection;

        async fn dial(&self, _endpoint: &str) -> Result<StubConnection> {
            tokio::time::sleep(self.delay).await;
            Ok(StubConnection)
        }
    }

    #[async_trait]
    impl Connection for StubConnection {
        type Registry = StubRegistry;

        async fn resolve_name(&self, name: &str) -> Result<Address> {
            Err(ResolverError::NameResolution {
                name: name.to_string(),
                message: "no resolver".into(),
            })
        }

        fn bind(&self, _contract: Address) -> Result<StubRegistry> {
            Ok(StubRegistry)
        }
    }

    #[async_trait]
    impl RegistryContract for StubRegistry {
        async fn get_nkn_addr(&self, _opts: &CallOptions, _account: Address) -> Result<NknRecord> {
            Ok(NknRecord::new([0x42; 32], ""))
        }

        async fn ensure_deployed(&self) -> Result<()> {
            Ok(())
        }
    }

    fn overrides(dial_timeout: i64) -> ConfigOverride {
        ConfigOverride {
            rpc_server: Some("http://node.test".into()),
            contract_address: Some(format!("0x{}", "01".repeat(20))),
            dial_timeout: Some(dial_timeout),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_dial_timeout_enforced() {
        let connector = SlowConnector {
            delay: Duration::from_millis(500),
        };
        let err = Resolver::with_connector(connector, Some(overrides(20)))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, ResolverError::DialTimeout { .. }));
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_disabled_dial_timeout_waits_for_connector() {
        for disabled in [0, -1] {
            let connector = SlowConnector {
                delay: Duration::from_millis(50),
            };
            let resolver = Resolver::with_connector(connector, Some(overrides(disabled)))
                .await
                .unwrap();
            assert_eq!(resolver.config().dial_timeout(), None);
        }
    }

    #[tokio::test]
    async fn test_missing_contract_address_is_bind_error() {
        let connector = SlowConnector {
            delay: Duration::ZERO,
        };
        let o = ConfigOverride {
            contract_address: None,
            ..overrides(100)
        };
        let err = Resolver::with_connector(connector, Some(o))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, ResolverError::ContractBind(_)));
    }

    #[tokio::test]
    async fn test_resolve_raw_address() {
        let connector = SlowConnector {
            delay: Duration::ZERO,
        };
        let resolver = Resolver::with_connector(connector, Some(overrides(100)))
            .await
            .unwrap();

        let out = resolver
            .resolve(&format!("ETH:0x{}", "ab".repeat(20)))
            .await
            .unwrap();
        assert_eq!(out, Some("42".repeat(32)));
        assert_eq!(resolver.cached_entries(), 1);
    }
}
