//! # Hashing Utilities
//!
//! IoTeX uses two hash functions and this module exposes exactly those:
//!
//! - **BLAKE2b-256** (`hash256b`) — action hashes, signing payloads and the
//!   derivation of protocol pool addresses (`hash160b`).
//! - **Keccak-256** — address derivation from secp256k1 public keys, which
//!   keeps IoTeX addresses byte-compatible with Ethereum ones.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use sha3::Keccak256;

use crate::config::{ADDRESS_LENGTH, HASH_LENGTH};

type Blake2b256 = Blake2b<U32>;

/// Compute the BLAKE2b-256 digest of the input.
///
/// # Example
///
/// ```
/// use iotex_rosetta::crypto::hash256b;
///
/// let h = hash256b(b"rewarding");
/// assert_eq!(h.len(), 32);
/// ```
pub fn hash256b(data: &[u8]) -> [u8; HASH_LENGTH] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// The trailing 20 bytes of [`hash256b`].
pub fn hash160b(data: &[u8]) -> [u8; ADDRESS_LENGTH] {
    let digest = hash256b(data);
    let mut out = [0u8; ADDRESS_LENGTH];
    out.copy_from_slice(&digest[HASH_LENGTH - ADDRESS_LENGTH..]);
    out
}

/// Compute the Keccak-256 digest (the pre-standard SHA-3 padding).
pub fn keccak256(data: &[u8]) -> [u8; HASH_LENGTH] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash256b_is_deterministic() {
        assert_eq!(hash256b(b"iotex"), hash256b(b"iotex"));
        assert_ne!(hash256b(b"iotex"), hash256b(b"iotx"));
    }

    #[test]
    fn hash160b_is_suffix_of_hash256b() {
        let full = hash256b(b"staking");
        let short = hash160b(b"staking");
        assert_eq!(&full[12..], &short[..]);
    }

    #[test]
    fn keccak256_of_empty_input() {
        // Well-known Keccak-256("") vector.
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn blake2b_256_of_abc() {
        // RFC 7693 style vector for BLAKE2b with 32-byte output.
        assert_eq!(
            hex::encode(hash256b(b"abc")),
            "bddd813c634239723171ef3fee98579b94964e3bb1cb3e427262c8c068d52319"
        );
    }
}
