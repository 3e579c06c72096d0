//! # Key Management
//!
//! secp256k1 public keys, private keys and recoverable signatures, the only
//! key material an IoTeX action can carry.
//!
//! The gateway itself never holds a private key for a real account.
//! [`PrivateKey`] exists for two reasons: gas estimation signs a draft
//! action with a throwaway key, and tests need a signer.
//!
//! ## Signature layout
//!
//! Signatures travel as 65 bytes `r || s || v` with `v ∈ {0, 1}`. Signers
//! following the Ethereum convention hand us `v ∈ {27, 28}`; those are
//! normalized on the way in. A 64-byte compact signature is accepted when
//! the signer's public key is known, because the recovery id can then be
//! reconstructed by trying both candidates.

use std::fmt;

use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature as SecpRecoverable, RecoveryId};
use secp256k1::{Message, PublicKey as SecpPublicKey, SecretKey, SECP256K1};
use thiserror::Error;

use crate::config::{
    ADDRESS_LENGTH, COMPACT_SIGNATURE_LENGTH, COMPRESSED_PUBLIC_KEY_LENGTH, HASH_LENGTH,
    RECOVERABLE_SIGNATURE_LENGTH, UNCOMPRESSED_PUBLIC_KEY_LENGTH,
};
use crate::crypto::hash::keccak256;

/// Ethereum-style offset some wallets add to the recovery id.
const ETH_V_OFFSET: u8 = 27;

/// Errors raised while decoding keys or checking signatures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid secret key")]
    InvalidSecretKey,

    #[error("invalid signature length {0}: expected 64 or 65 bytes")]
    InvalidSignatureLength(usize),

    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),

    #[error("malformed signature")]
    MalformedSignature,

    #[error("signature does not match public key")]
    SignatureMismatch,
}

// ---------------------------------------------------------------------------
// Public keys
// ---------------------------------------------------------------------------

/// A validated secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(SecpPublicKey);

impl PublicKey {
    /// Parse a compressed (33 byte) or uncompressed (65 byte) SEC1 key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != COMPRESSED_PUBLIC_KEY_LENGTH
            && bytes.len() != UNCOMPRESSED_PUBLIC_KEY_LENGTH
        {
            return Err(KeyError::InvalidPublicKey(format!(
                "length {} is neither {} nor {}",
                bytes.len(),
                COMPRESSED_PUBLIC_KEY_LENGTH,
                UNCOMPRESSED_PUBLIC_KEY_LENGTH
            )));
        }
        SecpPublicKey::from_slice(bytes)
            .map(Self)
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))
    }

    /// Parse a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(trimmed).map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// The 65-byte uncompressed encoding embedded in actions.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_PUBLIC_KEY_LENGTH] {
        self.0.serialize_uncompressed()
    }

    /// The 33-byte compressed encoding.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_PUBLIC_KEY_LENGTH] {
        self.0.serialize()
    }

    /// Raw address payload: `keccak256(uncompressed[1..])[12..]`.
    pub fn address_bytes(&self) -> [u8; ADDRESS_LENGTH] {
        let uncompressed = self.to_uncompressed();
        let digest = keccak256(&uncompressed[1..]);
        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(&digest[HASH_LENGTH - ADDRESS_LENGTH..]);
        out
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_compressed()))
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// A 65-byte recoverable ECDSA signature, `v` already normalized to 0/1.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; RECOVERABLE_SIGNATURE_LENGTH],
}

impl Signature {
    /// Accept a 65-byte `r || s || v` signature. `v` may be 0, 1, 27 or 28.
    pub fn from_recoverable(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != RECOVERABLE_SIGNATURE_LENGTH {
            return Err(KeyError::InvalidSignatureLength(bytes.len()));
        }
        let v = normalize_v(bytes[COMPACT_SIGNATURE_LENGTH])?;
        let mut out = [0u8; RECOVERABLE_SIGNATURE_LENGTH];
        out[..COMPACT_SIGNATURE_LENGTH].copy_from_slice(&bytes[..COMPACT_SIGNATURE_LENGTH]);
        out[COMPACT_SIGNATURE_LENGTH] = v;
        let sig = Self { bytes: out };
        // Reject r/s values that libsecp256k1 refuses to parse.
        sig.to_secp()?;
        Ok(sig)
    }

    /// Accept either signature form for a known signer.
    ///
    /// A 65-byte input is normalized and must recover `signer`. A 64-byte
    /// compact input gets whichever recovery id makes it recover `signer`.
    pub fn from_bytes_for_signer(
        bytes: &[u8],
        digest: &[u8; HASH_LENGTH],
        signer: &PublicKey,
    ) -> Result<Self, KeyError> {
        match bytes.len() {
            RECOVERABLE_SIGNATURE_LENGTH => {
                let sig = Self::from_recoverable(bytes)?;
                if sig.verify(digest, signer) {
                    Ok(sig)
                } else {
                    Err(KeyError::SignatureMismatch)
                }
            }
            COMPACT_SIGNATURE_LENGTH => {
                for v in 0u8..=1 {
                    let mut candidate = [0u8; RECOVERABLE_SIGNATURE_LENGTH];
                    candidate[..COMPACT_SIGNATURE_LENGTH].copy_from_slice(bytes);
                    candidate[COMPACT_SIGNATURE_LENGTH] = v;
                    let sig = Self { bytes: candidate };
                    if sig.verify(digest, signer) {
                        return Ok(sig);
                    }
                }
                Err(KeyError::SignatureMismatch)
            }
            other => Err(KeyError::InvalidSignatureLength(other)),
        }
    }

    pub fn as_bytes(&self) -> &[u8; RECOVERABLE_SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// Recover the public key that produced this signature over `digest`.
    pub fn recover(&self, digest: &[u8; HASH_LENGTH]) -> Result<PublicKey, KeyError> {
        let message = Message::from_digest(*digest);
        SECP256K1
            .recover_ecdsa(&message, &self.to_secp()?)
            .map(PublicKey)
            .map_err(|_| KeyError::SignatureMismatch)
    }

    /// `true` when the signature over `digest` recovers exactly `signer`.
    pub fn verify(&self, digest: &[u8; HASH_LENGTH], signer: &PublicKey) -> bool {
        matches!(self.recover(digest), Ok(recovered) if recovered == *signer)
    }

    fn to_secp(&self) -> Result<SecpRecoverable, KeyError> {
        let recovery_id = RecoveryId::from_i32(i32::from(self.bytes[COMPACT_SIGNATURE_LENGTH]))
            .map_err(|_| KeyError::InvalidRecoveryId(self.bytes[COMPACT_SIGNATURE_LENGTH]))?;
        SecpRecoverable::from_compact(&self.bytes[..COMPACT_SIGNATURE_LENGTH], recovery_id)
            .map_err(|_| KeyError::MalformedSignature)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.bytes))
    }
}

fn normalize_v(v: u8) -> Result<u8, KeyError> {
    match v {
        0 | 1 => Ok(v),
        27 | 28 => Ok(v - ETH_V_OFFSET),
        other => Err(KeyError::InvalidRecoveryId(other)),
    }
}

// ---------------------------------------------------------------------------
// Private keys
// ---------------------------------------------------------------------------

/// A secp256k1 signing key. Key bytes are never logged or serialized.
pub struct PrivateKey {
    secret: SecretKey,
}

impl PrivateKey {
    /// Generate a fresh key from the OS RNG.
    pub fn generate() -> Self {
        Self {
            secret: SecretKey::new(&mut OsRng),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        SecretKey::from_slice(bytes)
            .map(|secret| Self { secret })
            .map_err(|_| KeyError::InvalidSecretKey)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(SecpPublicKey::from_secret_key(SECP256K1, &self.secret))
    }

    /// Sign a 32-byte digest, returning `r || s || v` with `v ∈ {0, 1}`.
    pub fn sign(&self, digest: &[u8; HASH_LENGTH]) -> Signature {
        let message = Message::from_digest(*digest);
        let (recovery_id, compact) = SECP256K1
            .sign_ecdsa_recoverable(&message, &self.secret)
            .serialize_compact();
        let mut bytes = [0u8; RECOVERABLE_SIGNATURE_LENGTH];
        bytes[..COMPACT_SIGNATURE_LENGTH].copy_from_slice(&compact);
        // Recovery ids from libsecp256k1 are always 0..=3 and fit in a byte.
        bytes[COMPACT_SIGNATURE_LENGTH] = recovery_id.to_i32() as u8;
        Signature { bytes }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}
