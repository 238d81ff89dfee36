//! Core domain types: addresses, object ids, digests and SUI amounts.

use crate::core::errors::VaultError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Smallest denomination per SUI.
pub const MIST_PER_SUI: u64 = 1_000_000_000;

/// Length in bytes of addresses and object ids.
pub const SUI_ADDRESS_LENGTH: usize = 32;

/// A 32-byte Sui account address.
///
/// Human readable formats (JSON, TOML) carry it as `0x` + 64 hex digits;
/// BCS carries the raw 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SuiAddress([u8; SUI_ADDRESS_LENGTH]);

/// Object ids share the address representation.
pub type ObjectId = SuiAddress;

impl SuiAddress {
    pub const ZERO: SuiAddress = SuiAddress([0u8; SUI_ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; SUI_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SUI_ADDRESS_LENGTH] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Parse a hex string with optional `0x` prefix. Short forms such as
    /// `0x2` are left-padded with zeros.
    pub fn from_hex_literal(s: &str) -> Result<Self, VaultError> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if body.is_empty() {
            return Err(VaultError::InvalidAddress(format!("empty address: '{}'", s)));
        }
        if body.len() > SUI_ADDRESS_LENGTH * 2 {
            return Err(VaultError::InvalidAddress(format!(
                "address longer than {} hex digits: '{}'",
                SUI_ADDRESS_LENGTH * 2,
                s
            )));
        }

        let padded = format!("{:0>width$}", body, width = SUI_ADDRESS_LENGTH * 2);
        let decoded = hex::decode(&padded)
            .map_err(|e| VaultError::InvalidAddress(format!("'{}': {}", s, e)))?;

        let mut bytes = [0u8; SUI_ADDRESS_LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl FromStr for SuiAddress {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex_literal(s)
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuiAddress({})", self)
    }
}

impl Serialize for SuiAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        } else {
            Ok(Self(<[u8; SUI_ADDRESS_LENGTH]>::deserialize(deserializer)?))
        }
    }
}

/// 32-byte object digest. Base58 in JSON, length-prefixed bytes in BCS.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectDigest([u8; 32]);

impl ObjectDigest {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, VaultError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            VaultError::Deserialization(format!("digest must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }
}

impl FromStr for ObjectDigest {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| VaultError::Deserialization(format!("invalid digest '{}': {}", s, e)))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectDigest({})", self)
    }
}

impl Serialize for ObjectDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for ObjectDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            Self::from_slice(&bytes).map_err(de::Error::custom)
        }
    }
}

/// Format a MIST amount as SUI with nine decimals.
pub fn format_sui(mist: u64) -> String {
    format!("{}.{:09}", mist / MIST_PER_SUI, mist % MIST_PER_SUI)
}
