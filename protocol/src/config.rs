//! # Protocol Configuration & Constants
//!
//! Every chain-level constant the gateway relies on lives here. Values in
//! this module are facts about IoTeX itself; anything an operator may want
//! to change per deployment belongs in the gateway's TOML configuration.

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Blockchain name reported in Rosetta network identifiers.
pub const BLOCKCHAIN: &str = "IoTeX";

/// Chain id stamped into mainnet actions.
pub const MAINNET_CHAIN_ID: u32 = 1;

/// Chain id stamped into testnet actions.
pub const TESTNET_CHAIN_ID: u32 = 2;

/// Bech32 human-readable prefix of native addresses (`io1...`).
pub const ADDRESS_HRP: &str = "io";

/// Length of the raw address payload. Addresses are the trailing 20 bytes
/// of a 32-byte digest, same as Ethereum.
pub const ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Symbol of the native token.
pub const NATIVE_SYMBOL: &str = "IOTX";

/// Decimal exponent of the native token (1 IOTX = 10^18 Rau).
pub const NATIVE_DECIMALS: u32 = 18;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// The only curve accepted for sender keys.
pub const CURVE_TYPE: &str = "secp256k1";

/// Rosetta signature type requested from external signers.
pub const SIGNATURE_TYPE: &str = "ecdsa_recovery";

/// Compressed secp256k1 public key length.
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;

/// Uncompressed secp256k1 public key length. Actions always embed this form.
pub const UNCOMPRESSED_PUBLIC_KEY_LENGTH: usize = 65;

/// Recoverable signature: `r || s || v`.
pub const RECOVERABLE_SIGNATURE_LENGTH: usize = 65;

/// Compact signature: `r || s`. The recovery id is reconstructed against
/// the signer's public key during combine.
pub const COMPACT_SIGNATURE_LENGTH: usize = 64;

/// Signature lengths accepted by the combine stage.
pub const ACCEPTED_SIGNATURE_LENGTHS: [usize; 2] =
    [COMPACT_SIGNATURE_LENGTH, RECOVERABLE_SIGNATURE_LENGTH];

/// Hash output length of `hash256b`.
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Protocol Identifiers
// ---------------------------------------------------------------------------

/// Seed of the rewarding pool address: `hash160b("rewarding")`.
pub const REWARDING_PROTOCOL_ID: &str = "rewarding";

/// Seed of the staking bucket pool address: `hash160b("staking")`.
pub const STAKING_PROTOCOL_ID: &str = "staking";

/// Seed of the implicit-log topic marking a bucket withdrawal.
pub const WITHDRAW_AMOUNT_TOPIC_SEED: &str = "withdrawAmount";

// ---------------------------------------------------------------------------
// Action Encoding
// ---------------------------------------------------------------------------

/// `ActionCore.version` written into newly constructed actions.
pub const ACTION_VERSION: u32 = 1;

/// Receipt status code for a successfully executed action.
pub const RECEIPT_STATUS_SUCCESS: u64 = 1;

// ---------------------------------------------------------------------------
// Hard Forks
// ---------------------------------------------------------------------------

/// Mainnet Pacific upgrade height. Below it, execution actions were charged
/// twice the nominal gas fee.
pub const PACIFIC_BLOCK_HEIGHT: u64 = 432_001;

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

/// Fixed-point scale used when applying a float fee multiplier to an
/// integer gas price. Six decimal places is finer than any multiplier a
/// wallet actually sends.
pub const FEE_MULTIPLIER_SCALE: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// Rosetta
// ---------------------------------------------------------------------------

/// Rosetta specification version implemented by the gateway.
pub const ROSETTA_VERSION: &str = "1.4.10";

/// Node version reported when the node does not advertise one.
pub const FALLBACK_NODE_VERSION: &str = "v1.1.0";
