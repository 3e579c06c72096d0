// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # IoTeX Rosetta Gateway
//!
//! HTTP surface, configuration, logging and metrics around the
//! `iotex-rosetta` library. The binary in `main.rs` runs it in offline mode;
//! a program that owns a node connection builds an [`api::AppState`] with
//! its own [`iotex_rosetta::client::ChainClient`] and serves
//! [`api::create_router`] itself.

pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
