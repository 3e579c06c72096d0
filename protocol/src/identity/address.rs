//! # Addresses
//!
//! An [`Address`] holds the 20 raw bytes behind an IoTeX account. Its
//! canonical text form is Bech32 with the `io` HRP; the `0x`-prefixed hex
//! form used by Ethereum tooling parses to the same value.
//!
//! For a secp256k1 key the bytes are `keccak256(uncompressed[1..])[12..]`.
//! Protocol pools have no key. Their bytes are `hash160b(protocol_id)`.

use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{ADDRESS_HRP, ADDRESS_LENGTH, REWARDING_PROTOCOL_ID, STAKING_PROTOCOL_ID};
use crate::crypto::hash::hash160b;
use crate::crypto::keys::PublicKey;

const HRP: Hrp = Hrp::parse_unchecked(ADDRESS_HRP);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty address")]
    Empty,

    #[error("bech32 decode error: {0}")]
    Bech32Decode(String),

    #[error("invalid HRP: expected '{expected}', got '{got}'")]
    InvalidHrp { expected: String, got: String },

    #[error("invalid hex address: {0}")]
    InvalidHex(String),

    #[error("invalid address data length: expected {expected} bytes, got {got}")]
    InvalidDataLength { expected: usize, got: usize },
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account address.
///
/// # Examples
///
/// ```
/// use iotex_rosetta::identity::Address;
///
/// let addr: Address = "0x0000000000000000000000000000000000000001".parse().unwrap();
/// let native = addr.to_string();
/// assert!(native.starts_with("io1"));
/// assert_eq!(native.parse::<Address>().unwrap(), addr);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; ADDRESS_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| AddressError::InvalidDataLength {
                    expected: ADDRESS_LENGTH,
                    got: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    /// The address controlled by a secp256k1 public key.
    pub fn from_public_key(pk: &PublicKey) -> Self {
        Self(pk.address_bytes())
    }

    /// Parse either the native Bech32 or the `0x` hex form.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if let Some(hex_part) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            let bytes = hex::decode(hex_part).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
            return Self::from_slice(&bytes);
        }

        let (hrp, data) =
            bech32::decode(s).map_err(|e| AddressError::Bech32Decode(e.to_string()))?;
        if hrp != HRP {
            return Err(AddressError::InvalidHrp {
                expected: ADDRESS_HRP.to_string(),
                got: hrp.to_string(),
            });
        }
        Self::from_slice(&data)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = bech32::encode::<Bech32>(HRP, &self.0).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Protocol pools
// ---------------------------------------------------------------------------

/// Addresses of the pools that receive fees and stake.
///
/// Derived once at startup and handed to the ledger engine by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolAddresses {
    /// Receives gas fees and reward-fund deposits, pays out reward claims.
    pub rewarding: Address,
    /// Holds staked principal.
    pub staking: Address,
}

impl ProtocolAddresses {
    pub fn derive() -> Self {
        Self {
            rewarding: Address(hash160b(REWARDING_PROTOCOL_ID.as_bytes())),
            staking: Address(hash160b(STAKING_PROTOCOL_ID.as_bytes())),
        }
    }
}

impl Default for ProtocolAddresses {
    fn default() -> Self {
        Self::derive()
    }
}
