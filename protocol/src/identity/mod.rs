//! # Identity Module
//!
//! IoTeX account addresses and the well-known protocol pool addresses.
//!
//! An address is 20 bytes. Users see it as Bech32 with the `io` HRP
//! (`io1...`), while Ethereum tooling hands us the same bytes as `0x` hex.
//! Both forms are accepted everywhere and normalized to the native form.

pub mod address;

pub use address::{Address, AddressError, ProtocolAddresses};
