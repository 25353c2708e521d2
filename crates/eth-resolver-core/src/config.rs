//! Resolver configuration: built-in defaults and caller overrides
//!
//! The effective configuration is always `ResolverConfig::default()` with an
//! optional [`ConfigOverride`] merged on top. Override files use the same
//! camelCase keys as the serialized config:
//!
//! ```json
//! {
//!   "prefix": "ETH:",
//!   "rpcServer": "https://rpc.example.org",
//!   "contractAddress": "0x2a8b...",
//!   "cacheTimeout": "never",
//!   "dialTimeout": 5000
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIAL_TIMEOUT_MS, DEFAULT_PREFIX};
use crate::identifier::parse_hex_address;
use crate::{Address, Error, Result};

/// Global expiration applied to cache entries stored with the default policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CacheTimeoutRepr", into = "CacheTimeoutRepr")]
pub enum CacheTimeout {
    Never,
    After(Duration),
}

impl CacheTimeout {
    /// Timeout in whole seconds; zero or negative means entries never expire
    pub fn from_secs(secs: i64) -> Self {
        if secs <= 0 {
            CacheTimeout::Never
        } else {
            CacheTimeout::After(Duration::from_secs(secs as u64))
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            CacheTimeout::Never => None,
            CacheTimeout::After(d) => Some(*d),
        }
    }
}

impl fmt::Display for CacheTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTimeout::Never => write!(f, "never"),
            CacheTimeout::After(d) => write!(f, "{}s", d.as_secs()),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CacheTimeoutRepr {
    Seconds(i64),
    Keyword(String),
}

impl TryFrom<CacheTimeoutRepr> for CacheTimeout {
    type Error = String;

    fn try_from(repr: CacheTimeoutRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            CacheTimeoutRepr::Seconds(secs) => Ok(CacheTimeout::from_secs(secs)),
            CacheTimeoutRepr::Keyword(word) if word.eq_ignore_ascii_case("never") => {
                Ok(CacheTimeout::Never)
            }
            CacheTimeoutRepr::Keyword(word) => Err(format!(
                "cacheTimeout must be a number of seconds or \"never\", got {word:?}"
            )),
        }
    }
}

impl From<CacheTimeout> for CacheTimeoutRepr {
    fn from(timeout: CacheTimeout) -> Self {
        match timeout {
            CacheTimeout::Never => CacheTimeoutRepr::Keyword("never".into()),
            CacheTimeout::After(d) => {
                CacheTimeoutRepr::Seconds(i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            }
        }
    }
}

/// Effective resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Identifiers starting with this prefix are handled by the resolver
    pub prefix: String,
    /// Ethereum JSON-RPC endpoint (http(s) or ws(s))
    pub rpc_server: String,
    /// Account registry contract address, hex encoded
    pub contract_address: String,
    pub cache_timeout: CacheTimeout,
    /// Connection-open bound in milliseconds, `<= 0` disables it
    #[serde(rename = "dialTimeout")]
    pub dial_timeout_ms: i64,
    /// Registry call bound in milliseconds, `<= 0` disables it
    #[serde(rename = "queryTimeout")]
    pub query_timeout_ms: i64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            rpc_server: String::new(),
            contract_address: String::new(),
            cache_timeout: CacheTimeout::Never,
            dial_timeout_ms: DEFAULT_DIAL_TIMEOUT_MS,
            query_timeout_ms: 0,
        }
    }
}

impl ResolverConfig {
    /// Overlay `overrides` on top of `self`, every set field taking precedence
    pub fn merge(mut self, overrides: Option<&ConfigOverride>) -> Self {
        let Some(o) = overrides else {
            return self;
        };

        if let Some(prefix) = &o.prefix {
            self.prefix = prefix.clone();
        }
        if let Some(rpc_server) = &o.rpc_server {
            self.rpc_server = rpc_server.clone();
        }
        if let Some(contract_address) = &o.contract_address {
            self.contract_address = contract_address.clone();
        }
        if let Some(cache_timeout) = o.cache_timeout {
            self.cache_timeout = cache_timeout;
        }
        if let Some(dial_timeout) = o.dial_timeout {
            self.dial_timeout_ms = dial_timeout;
        }
        if let Some(query_timeout) = o.query_timeout {
            self.query_timeout_ms = query_timeout;
        }
        self
    }

    /// Bound on opening a connection, `None` when disabled
    pub fn dial_timeout(&self) -> Option<Duration> {
        millis(self.dial_timeout_ms)
    }

    /// Bound on a single registry call, `None` when disabled
    pub fn query_timeout(&self) -> Option<Duration> {
        millis(self.query_timeout_ms)
    }

    /// Parse the configured registry contract address
    pub fn contract(&self) -> Result<Address> {
        if self.contract_address.is_empty() {
            return Err(Error::InvalidAddress(
                "contract address not configured".to_string(),
            ));
        }
        parse_hex_address(&self.contract_address)
    }
}

fn millis(ms: i64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms as u64))
}

/// Caller-supplied configuration; unset fields fall back to the defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigOverride {
    pub prefix: Option<String>,
    pub rpc_server: Option<String>,
    pub contract_address: Option<String>,
    pub cache_timeout: Option<CacheTimeout>,
    pub dial_timeout: Option<i64>,
    pub query_timeout: Option<i64>,
}

impl ConfigOverride {
    /// Parse an override from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an override from an already decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Load an override from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Combine two overrides; fields set in `other` win
    pub fn overlay(self, other: ConfigOverride) -> Self {
        Self {
            prefix: other.prefix.or(self.prefix),
            rpc_server: other.rpc_server.or(self.rpc_server),
            contract_address: other.contract_address.or(self.contract_address),
            cache_timeout: other.cache_timeout.or(self.cache_timeout),
            dial_timeout: other.dial_timeout.or(self.dial_timeout),
            query_timeout: other.query_timeout.or(self.query_timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.prefix, "ETH:");
        assert_eq!(config.rpc_server, "");
        assert_eq!(config.contract_address, "");
        assert_eq!(config.cache_timeout, CacheTimeout::Never);
        assert_eq!(config.dial_timeout(), Some(Duration::from_millis(5000)));
        assert_eq!(config.query_timeout(), None);
    }

    #[test]
    fn test_merge_without_override() {
        assert_eq!(
            ResolverConfig::default().merge(None),
            ResolverConfig::default()
        );
    }

    #[test]
    fn test_merge_takes_set_fields_only() {
        let overrides = ConfigOverride {
            rpc_server: Some("http://localhost:8545".into()),
            dial_timeout: Some(0),
            ..Default::default()
        };
        let config = ResolverConfig::default().merge(Some(&overrides));

        assert_eq!(config.prefix, "ETH:");
        assert_eq!(config.rpc_server, "http://localhost:8545");
        assert_eq!(config.cache_timeout, CacheTimeout::Never);
        assert_eq!(config.dial_timeout(), None);
    }

    #[test]
    fn test_merge_leaves_defaults_untouched() {
        let defaults = ResolverConfig::default();
        let overrides = ConfigOverride {
            prefix: Some("NKN:".into()),
            ..Default::default()
        };
        let merged = defaults.clone().merge(Some(&overrides));

        assert_eq!(merged.prefix, "NKN:");
        assert_eq!(defaults.prefix, "ETH:");
        assert_eq!(ResolverConfig::default().prefix, "ETH:");
    }

    #[test]
    fn test_negative_dial_timeout_disables_bound() {
        let config = ResolverConfig {
            dial_timeout_ms: -1,
            ..Default::default()
        };
        assert_eq!(config.dial_timeout(), None);
    }

    #[test]
    fn test_override_from_json() {
        let o = ConfigOverride::from_json(
            r#"{
                "prefix": "ETH:",
                "rpcServer": "wss://node.example.org",
                "contractAddress": "0x0000000000000000000000000000000000000001",
                "cacheTimeout": 300,
                "dialTimeout": 1500,
                "queryTimeout": 2000
            }"#,
        )
        .unwrap();

        assert_eq!(o.rpc_server.as_deref(), Some("wss://node.example.org"));
        assert_eq!(
            o.cache_timeout,
            Some(CacheTimeout::After(Duration::from_secs(300)))
        );
        assert_eq!(o.dial_timeout, Some(1500));
        assert_eq!(o.query_timeout, Some(2000));
    }

    #[test]
    fn test_cache_timeout_never_forms() {
        for json in [r#"{"cacheTimeout":"never"}"#, r#"{"cacheTimeout":0}"#, r#"{"cacheTimeout":-1}"#] {
            let o = ConfigOverride::from_json(json).unwrap();
            assert_eq!(o.cache_timeout, Some(CacheTimeout::Never), "{json}");
        }
    }

    #[test]
    fn test_max_cache_timeout_is_usable() {
        let o = ConfigOverride::from_json(r#"{"cacheTimeout":9223372036854775807}"#).unwrap();
        let config = ResolverConfig::default().merge(Some(&o));
        assert_eq!(
            config.cache_timeout,
            CacheTimeout::After(Duration::from_secs(i64::MAX as u64))
        );

        let cache = crate::ExpiringCache::new(config.cache_timeout);
        cache.set("k", 1u32, crate::Expiration::Default);
        assert_eq!(cache.get("k"), Some(1));
    }

    #[test]
    fn test_oversized_cache_timeout_serializes_saturated() {
        let config = ResolverConfig {
            cache_timeout: CacheTimeout::After(Duration::from_secs(u64::MAX)),
            ..Default::default()
        };
        let value = serde_json::to_value(config).unwrap();
        assert_eq!(value["cacheTimeout"], i64::MAX);
    }

    #[test]
    fn test_mismatched_field_type_is_merge_error() {
        let err = ConfigOverride::from_json(r#"{"dialTimeout":"fast"}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigMerge(_)));

        let err = ConfigOverride::from_value(serde_json::json!({ "prefix": 7 })).unwrap_err();
        assert!(matches!(err, Error::ConfigMerge(_)));
    }

    #[test]
    fn test_unknown_cache_keyword_is_merge_error() {
        let err = ConfigOverride::from_json(r#"{"cacheTimeout":"forever"}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigMerge(_)));
    }

    #[test]
    fn test_unknown_field_is_merge_error() {
        let err = ConfigOverride::from_json(r#"{"rpcSever":"http://x"}"#).unwrap_err();
        assert!(matches!(err, Error::ConfigMerge(_)));
    }

    #[test]
    fn test_overlay_prefers_later_fields() {
        let file = ConfigOverride {
            rpc_server: Some("http://file".into()),
            dial_timeout: Some(100),
            ..Default::default()
        };
        let flags = ConfigOverride {
            rpc_server: Some("http://flag".into()),
            ..Default::default()
        };
        let o = file.overlay(flags);

        assert_eq!(o.rpc_server.as_deref(), Some("http://flag"));
        assert_eq!(o.dial_timeout, Some(100));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"prefix":"ACC:","cacheTimeout":"never"}}"#).unwrap();

        let o = ConfigOverride::load(file.path()).unwrap();
        assert_eq!(o.prefix.as_deref(), Some("ACC:"));

        let config = ResolverConfig::default().merge(Some(&o));
        assert_eq!(config.prefix, "ACC:");
        assert_eq!(config.cache_timeout, CacheTimeout::Never);
    }

    #[test]
    fn test_contract_address_parsing() {
        let mut config = ResolverConfig::default();
        assert!(matches!(config.contract(), Err(Error::InvalidAddress(_))));

        config.contract_address = "0x00000000000000000000000000000000000000ff".into();
        let addr = config.contract().unwrap();
        assert_eq!(addr.0[19], 0xff);

        config.contract_address = "0x1234".into();
        assert!(config.contract().is_err());
    }

    #[test]
    fn test_serialized_keys() {
        let value = serde_json::to_value(ResolverConfig::default()).unwrap();
        assert_eq!(value["cacheTimeout"], "never");
        assert_eq!(value["dialTimeout"], 5000);
        assert_eq!(value["rpcServer"], "");
    }
}
