//! Reelforge - Digital Cinema Package ingest tool
//!
//! This library crate exposes the configuration layer for integration testing.
//! The DCP readers live in `reelforge-dcp`.

pub mod config;
