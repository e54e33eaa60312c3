//! Reelforge-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across reelforge:
//!
//! - **Identifiers**: URN stripping into [`AssetId`]
//! - **Core Types**: dialects, rationals, aspect ratios and content kinds
//! - **Dates**: issue-date parsing with whole-second UTC normalization
//! - **Path Utilities**: essence and manifest file recognition
//! - **Error Handling**: the [`ErrorKind`] taxonomy every reader maps onto
//!
//! # Examples
//!
//! ```
//! use reelforge_common::{AssetId, Dialect, Rational};
//! use reelforge_common::paths::is_essence_file;
//! use std::path::Path;
//!
//! let id = AssetId::from_urn("urn:uuid:649a5ca6-95d9-4dab-ad21-7636a636ca54").unwrap();
//! assert_eq!(id.as_str(), "649a5ca6-95d9-4dab-ad21-7636a636ca54");
//!
//! let am_ns = "http://www.smpte-ra.org/schemas/429-9/2007/AM";
//! assert_eq!(Dialect::detect(Some(am_ns)), Dialect::Smpte);
//! assert_eq!("24 1".parse::<Rational>().unwrap(), Rational::new(24, 1));
//! assert!(is_essence_file(Path::new("picture.mxf")));
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod time;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use ids::AssetId;
pub use types::*;
