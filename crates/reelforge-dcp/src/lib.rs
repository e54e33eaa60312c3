//! Reelforge-DCP: readers and integrity checks for Digital Cinema Packages
//!
//! This crate reads the manifests of a DCP and cross-validates them against
//! each other and against the files on disk.
//!
//! # Modules
//!
//! - `assetmap` - ASSETMAP reader: asset id to file path
//! - `pkl` - Packing list reader and hash verification
//! - `cpl` - Composition playlist reader (Interop and SMPTE)
//! - `kdm` - KDM, bundle catalog and bundle archive reader
//! - `package` - [`Dcp`] aggregator for a whole package directory
//! - `hash` - Streaming SHA-1/base64 digests
//! - `staging` - Hard-linking compositions into an ingest directory
//!
//! # Validation contract
//!
//! The aggregating checks ([`AssetMap::validate_files_all`],
//! [`PackingList::verify_hashes_all`]) return every failure found. The
//! fail-fast variants ([`AssetMap::validate_files`],
//! [`PackingList::validate_hashes`]) stop at the first one.
//!
//! # Example
//!
//! ```no_run
//! use reelforge_dcp::Dcp;
//! use std::path::Path;
//!
//! let dcp = Dcp::open(Path::new("/mnt/ingest/TRAILER_SMPTE")).unwrap();
//! for cpl in dcp.cpls.values() {
//!     println!("{} ({} reels)", cpl.title, cpl.reels.len());
//! }
//! ```

pub mod assetmap;
pub mod cpl;
pub mod error;
mod fields;
pub mod hash;
pub mod kdm;
pub mod options;
pub mod package;
pub mod pkl;
pub mod staging;

pub use assetmap::{AssetEntry, AssetMap};
pub use cpl::{
    Asset, AssetKind, CompositionMetadata, CompositionPlaylist, ContentVersion, PictureEssence,
    Reel, Slot, UnresolvedReference,
};
pub use error::{
    AssetMapError, CplError, DcpError, FieldError, IntegrityFailure, KdmError, PackingListError,
    StagingError,
};
pub use kdm::{Kdm, KdmBundle, KdmCatalog, KdmFileEntry, TypedKeyId};
pub use options::{DuplicatePolicy, HashOptions, OpenOptions, ParseOptions, ResolutionPolicy};
pub use package::{discover, CplFailure, CplSummary, Dcp, DcpReport, FailureSummary, Manifests};
pub use pkl::{PackingList, PackingListEntry};
pub use staging::IngestStager;
