//! Account registry record and its NKN address form

use std::fmt;

use crate::constants::IDENTIFIER_SEPARATOR;

/// NKN public key size in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Record stored in the account registry for an Ethereum account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NknRecord {
    pub public_key: [u8; PUBLIC_KEY_SIZE],
    /// Optional NKN identifier, empty when unset
    pub identifier: String,
}

impl NknRecord {
    pub fn new(public_key: [u8; PUBLIC_KEY_SIZE], identifier: impl Into<String>) -> Self {
        Self {
            public_key,
            identifier: identifier.into(),
        }
    }

    /// NKN address: `identifier.hexpubkey`, or just the hex public key when
    /// the identifier is empty
    pub fn compose(&self) -> String {
        let key = hex::encode(self.public_key);
        if self.identifier.is_empty() {
            key
        } else {
            format!("{}{}{}", self.identifier, IDENTIFIER_SEPARATOR, key)
        }
    }
}

impl fmt::Display for NknRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose())
    }
}
