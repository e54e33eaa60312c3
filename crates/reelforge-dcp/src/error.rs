//! Error types for reelforge-dcp.
//!
//! Each reader has its own error enum. All of them map onto
//! [`ErrorKind`] through `kind()`, which is what the aggregator and the CLI
//! use to decide between skipping a document and giving up.

use reelforge_common::{AssetId, ErrorKind};
use reelforge_xml::{SchemaError, XmlError};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::cpl::Slot;

/// A mandatory field was absent or unparsable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{path}: missing required element <{field}>")]
    Missing { path: PathBuf, field: String },

    #[error("{path}: invalid <{field}> value {value:?}: {reason}")]
    Invalid {
        path: PathBuf,
        field: String,
        value: String,
        reason: String,
    },
}

impl FieldError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Missing { .. } => ErrorKind::MissingRequiredField,
            Self::Invalid { .. } => ErrorKind::MalformedDocument,
        }
    }
}

/// One failed on-disk check. Produced by the aggregating validators.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "failure", rename_all = "snake_case")]
pub enum IntegrityFailure {
    /// A manifest-declared file is not on disk.
    #[error("File not found: {path} (asset {id})")]
    MissingFile { id: AssetId, path: PathBuf },

    /// The recomputed digest differs from the declared one.
    #[error("Hash doesn't match: {path} (expected {expected}, computed {computed})")]
    HashMismatch {
        id: AssetId,
        path: PathBuf,
        expected: String,
        computed: String,
    },

    /// The file exists but could not be read.
    #[error("Cannot read {path}: {message}")]
    UnreadableFile {
        id: AssetId,
        path: PathBuf,
        message: String,
    },

    /// A packing list entry has no asset map counterpart.
    #[error("Asset {id} is not listed in the asset map")]
    UnknownAsset { id: AssetId },

    /// A non-essence packing list entry declares no hash.
    #[error("No hash declared for {path} (asset {id})")]
    MissingHash { id: AssetId, path: PathBuf },

    /// The declared hash is not valid base64.
    #[error("Declared hash {value:?} for {path} is not base64")]
    MalformedHash {
        id: AssetId,
        path: PathBuf,
        value: String,
    },
}

impl IntegrityFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAsset { .. } => ErrorKind::ReferenceResolutionFailure,
            Self::MissingHash { .. } => ErrorKind::MissingRequiredField,
            Self::MalformedHash { .. } => ErrorKind::MalformedDocument,
            Self::MissingFile { .. }
            | Self::HashMismatch { .. }
            | Self::UnreadableFile { .. } => ErrorKind::IntegrityFailure,
        }
    }
}

/// Errors from reading or checking an ASSETMAP.
#[derive(Debug, Error)]
pub enum AssetMapError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("{path}: asset {id} has no chunk")]
    MissingChunk { path: PathBuf, id: AssetId },

    #[error("{path}: duplicate asset id {id}")]
    DuplicateId { path: PathBuf, id: AssetId },

    #[error("Asset {0} is not listed in the asset map")]
    UnknownAsset(AssetId),

    #[error(transparent)]
    Integrity(IntegrityFailure),
}

impl AssetMapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Xml(e) => e.kind(),
            Self::Schema(e) => e.kind(),
            Self::Field(e) => e.kind(),
            Self::MissingChunk { .. } => ErrorKind::MissingRequiredField,
            Self::DuplicateId { .. } => ErrorKind::MalformedDocument,
            Self::UnknownAsset(_) => ErrorKind::ReferenceResolutionFailure,
            Self::Integrity(f) => f.kind(),
        }
    }
}

/// Errors from reading or checking a packing list.
#[derive(Debug, Error)]
pub enum PackingListError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("{path}: duplicate asset id {id}")]
    DuplicateId { path: PathBuf, id: AssetId },

    #[error(transparent)]
    Integrity(IntegrityFailure),
}

impl PackingListError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Xml(e) => e.kind(),
            Self::Schema(e) => e.kind(),
            Self::Field(e) => e.kind(),
            Self::DuplicateId { .. } => ErrorKind::MalformedDocument,
            Self::Integrity(f) => f.kind(),
        }
    }
}

/// Errors from reading a composition playlist.
#[derive(Debug, Error)]
pub enum CplError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("{path}: reel {reel} has unknown asset type <{tag}>")]
    UnknownAssetType {
        path: PathBuf,
        reel: AssetId,
        tag: String,
    },

    #[error("{path}: reel {reel} has no {slot} asset")]
    MissingSlot {
        path: PathBuf,
        reel: AssetId,
        slot: Slot,
    },

    #[error("{path}: reel {reel} has more than one {slot} asset")]
    DuplicateSlot {
        path: PathBuf,
        reel: AssetId,
        slot: Slot,
    },

    #[error(
        "{path}: reel {reel} {slot} asset has entry point {entry_point} + duration {duration} \
         beyond intrinsic duration {intrinsic_duration}"
    )]
    InvalidTiming {
        path: PathBuf,
        reel: AssetId,
        slot: Slot,
        entry_point: u64,
        duration: u64,
        intrinsic_duration: u64,
    },

    #[error("{path}: reel {reel} {slot} asset {id} is not listed in the asset map")]
    UnresolvedAsset {
        path: PathBuf,
        reel: AssetId,
        slot: Slot,
        id: AssetId,
    },
}

impl CplError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Xml(e) => e.kind(),
            Self::Schema(e) => e.kind(),
            Self::Field(e) => e.kind(),
            Self::UnknownAssetType { .. }
            | Self::DuplicateSlot { .. }
            | Self::InvalidTiming { .. } => ErrorKind::MalformedDocument,
            Self::MissingSlot { .. } => ErrorKind::MissingRequiredField,
            Self::UnresolvedAsset { .. } => ErrorKind::ReferenceResolutionFailure,
        }
    }
}

/// Errors from reading a KDM, a bundle catalog or a bundle archive.
#[derive(Debug, Error)]
pub enum KdmError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("Failed to read KDM bundle {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("KDM bundle {bundle} has no member {member}")]
    MissingMember { bundle: PathBuf, member: String },
}

impl KdmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Xml(e) => e.kind(),
            Self::Field(e) => e.kind(),
            Self::Archive { .. } => ErrorKind::FatalConfiguration,
            Self::MissingMember { .. } => ErrorKind::ReferenceResolutionFailure,
        }
    }
}

/// Errors from opening a DCP directory.
#[derive(Debug, Error)]
pub enum DcpError {
    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Directory walk of {root} exceeded its {limit:?} deadline")]
    WalkDeadline { root: PathBuf, limit: Duration },

    #[error("Required manifest {manifest} not found in {root}")]
    ManifestMissing {
        root: PathBuf,
        manifest: &'static str,
    },

    #[error(transparent)]
    AssetMap(#[from] AssetMapError),

    #[error(transparent)]
    PackingList(#[from] PackingListError),

    #[error("{} integrity failure(s) in {root}: {}", .failures.len(), format_failures(.failures))]
    Integrity {
        root: PathBuf,
        failures: Vec<IntegrityFailure>,
    },

    #[error("CPL {id}: {source}")]
    Cpl {
        id: AssetId,
        #[source]
        source: CplError,
    },
}

impl DcpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Walk { .. } | Self::WalkDeadline { .. } | Self::ManifestMissing { .. } => {
                ErrorKind::FatalConfiguration
            }
            Self::AssetMap(e) => e.kind(),
            Self::PackingList(e) => e.kind(),
            Self::Integrity { failures, .. } => failures
                .iter()
                .map(IntegrityFailure::kind)
                .find(|k| *k == ErrorKind::IntegrityFailure)
                .or_else(|| failures.first().map(IntegrityFailure::kind))
                .unwrap_or(ErrorKind::IntegrityFailure),
            Self::Cpl { source, .. } => source.kind(),
        }
    }

    /// Integrity failures carried by [`DcpError::Integrity`].
    pub fn failures(&self) -> &[IntegrityFailure] {
        match self {
            Self::Integrity { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Errors from hard-linking a composition into an ingest directory.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("CPL {0} is not part of this DCP")]
    UnknownCpl(AssetId),

    #[error("Failed to stage {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StagingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownCpl(_) => ErrorKind::ReferenceResolutionFailure,
            Self::Io { .. } => ErrorKind::FatalConfiguration,
        }
    }
}

fn format_failures(failures: &[IntegrityFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
