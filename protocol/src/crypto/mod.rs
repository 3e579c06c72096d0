//! # Cryptographic Primitives
//!
//! The chain fixes every primitive here, so this module is a set of thin,
//! typed wrappers rather than a menu:
//!
//! - **secp256k1** recoverable ECDSA for action signatures.
//! - **BLAKE2b-256** (`hash256b`) for action hashes and signing payloads.
//! - **Keccak-256** for deriving addresses from public keys.

pub mod hash;
pub mod keys;

pub use hash::{hash160b, hash256b, keccak256};
pub use keys::{KeyError, PrivateKey, PublicKey, Signature};
