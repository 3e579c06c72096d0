// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # IoTeX Rosetta: Core Library
//!
//! Reads the IoTeX chain as a ledger of balanced debit/credit operations and
//! builds native transfers for offline signers, in the shape the Rosetta API
//! expects.
//!
//! ## Architecture
//!
//! - **action**: protobuf action envelope, receipts, transfer logs.
//! - **ledger**: classifier, fee calculator, log reconciler, assembler and
//!   the whole-block decoder, plus tip balance lookups.
//! - **construction**: derive, preprocess, metadata, payloads, combine,
//!   parse, hash, submit.
//! - **client**: the async node boundary every online stage goes through.
//! - **crypto**: blake2b/keccak hashing and secp256k1 keys.
//! - **identity**: 20-byte addresses, `io` bech32 text form.
//! - **error**: the numbered Rosetta error catalog.
//! - **config**: chain and protocol constants.
//!
//! ## Ground rules
//!
//! 1. Balances are never computed here. Operations only restate what the
//!    node already executed.
//! 2. Every decoded transaction nets to zero across its operations, except
//!    the pre-Pacific execution fee, which is reported as the chain did it.
//! 3. A block decodes completely or not at all.

pub mod action;
pub mod client;
pub mod config;
pub mod construction;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod ledger;
