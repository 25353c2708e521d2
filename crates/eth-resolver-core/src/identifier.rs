//! Identifier routing and classification

use crate::{Address, Error, Result};

/// Length of a hex-encoded account address without the `0x` prefix
const HEX_ADDRESS_LEN: usize = 40;

/// Strip the routing prefix, `None` when the identifier is not ours
pub fn strip_prefix<'a>(identifier: &'a str, prefix: &str) -> Option<&'a str> {
    identifier.strip_prefix(prefix)
}

/// Whether `s` is a raw account address: optional `0x`/`0X` followed by
/// exactly 40 hex digits. Checksum casing is not enforced.
pub fn is_hex_address(s: &str) -> bool {
    let digits = without_0x(s);
    digits.len() == HEX_ADDRESS_LEN && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

pub(crate) fn parse_hex_address(s: &str) -> Result<Address> {
    if !is_hex_address(s) {
        return Err(Error::InvalidAddress(s.to_string()));
    }
    let bytes = hex::decode(without_0x(s)).map_err(|_| Error::InvalidAddress(s.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

fn without_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// What a prefix-stripped identifier refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Raw account address, used as-is
    Address(Address),
    /// Human-readable name that needs name resolution first
    Name(String),
}

impl Target {
    pub fn classify(key: &str) -> Self {
        match parse_hex_address(key) {
            Ok(address) => Target::Address(address),
            Err(_) => Target::Name(key.to_string()),
        }
    }
}
