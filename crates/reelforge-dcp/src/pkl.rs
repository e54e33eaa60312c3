//! Packing list reader and hash verification.
//!
//! Essence files (`.mxf`) are never hashed. They are the multi-gigabyte
//! picture and sound tracks, and their integrity is left to the playback
//! server's own checks. Every other listed file is hashed and compared with
//! its declared digest.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use reelforge_common::paths::is_essence_file;
use reelforge_common::AssetId;
use reelforge_xml::{Document, DocumentKind, INLINE_ORIGIN};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::assetmap::AssetMap;
use crate::error::{IntegrityFailure, PackingListError};
use crate::fields::Fields;
use crate::hash::{decode_digest, digest_file, encode_digest};
use crate::options::{DuplicatePolicy, HashOptions, ParseOptions};

/// Type marker Interop packing lists put on composition playlists.
pub const CPL_TYPE_MARKER: &str = "asdcpKind=CPL";

/// One row of the packing list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackingListEntry {
    pub id: AssetId,
    /// Declared base64 SHA-1.
    pub content_hash: Option<String>,
    pub declared_size: Option<u64>,
    /// MIME-like type, e.g. `text/xml;asdcpKind=CPL`.
    pub file_type: Option<String>,
    pub annotation_text: Option<String>,
    pub original_file_name: Option<String>,
}

impl PackingListEntry {
    /// Whether the type carries the CPL marker.
    pub fn is_cpl(&self) -> bool {
        self.file_type
            .as_deref()
            .is_some_and(|t| t.contains(CPL_TYPE_MARKER))
    }

    /// Whether the type is plain XML (SMPTE lists CPLs as `text/xml`).
    pub fn is_xml(&self) -> bool {
        self.file_type
            .as_deref()
            .is_some_and(|t| t.trim_start().starts_with("text/xml"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PackingList {
    pub id: AssetId,
    pub annotation_text: Option<String>,
    pub issue_date: Option<DateTime<Utc>>,
    pub issuer: Option<String>,
    pub creator: Option<String>,
    pub entries: BTreeMap<AssetId, PackingListEntry>,
    pub source: PathBuf,
}

impl PackingList {
    pub fn parse(path: &Path) -> Result<Self, PackingListError> {
        Self::parse_with(path, &ParseOptions::default())
    }

    pub fn parse_with(path: &Path, options: &ParseOptions) -> Result<Self, PackingListError> {
        let document = Document::from_file(path)?;
        Self::from_document(&document, options)
    }

    pub fn parse_str(xml: &str, options: &ParseOptions) -> Result<Self, PackingListError> {
        let document = Document::parse_with_origin(xml, Path::new(INLINE_ORIGIN))?;
        Self::from_document(&document, options)
    }

    pub fn from_document(
        document: &Document,
        options: &ParseOptions,
    ) -> Result<Self, PackingListError> {
        if let Some(schema) = &options.schema {
            schema.check(document, DocumentKind::PackingList)?;
        }

        let path = document.origin();
        let root = Fields::new(document.root(), document.namespace(), path);
        let id = root.id("Id")?;
        let asset_list = root.required_child("AssetList")?;

        let mut entries = BTreeMap::new();
        for element in asset_list.children("Asset", document.namespace()) {
            let asset = root.on(element);
            let entry = PackingListEntry {
                id: asset.id("Id")?,
                content_hash: asset.owned_text("Hash"),
                declared_size: asset.optional("Size")?,
                file_type: asset.owned_text("Type"),
                annotation_text: asset.owned_text("AnnotationText"),
                original_file_name: asset.owned_text("OriginalFileName"),
            };
            let entry_id = entry.id.clone();
            if entries.insert(entry_id.clone(), entry).is_some() {
                match options.duplicates {
                    DuplicatePolicy::Reject => {
                        return Err(PackingListError::DuplicateId {
                            path: path.to_path_buf(),
                            id: entry_id,
                        });
                    }
                    DuplicatePolicy::LastWins => warn!(
                        path = %path.display(),
                        id = %entry_id,
                        "duplicate packing list id, keeping the later entry"
                    ),
                }
            }
        }

        debug!(path = %path.display(), id = %id, entries = entries.len(), "parsed packing list");

        Ok(Self {
            id,
            annotation_text: root.owned_text("AnnotationText"),
            issue_date: root.optional_date("IssueDate")?,
            issuer: root.owned_text("Issuer"),
            creator: root.owned_text("Creator"),
            entries,
            source: path.to_path_buf(),
        })
    }

    pub fn get(&self, id: &AssetId) -> Option<&PackingListEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of entries typed as composition playlists.
    pub fn cpl_ids(&self) -> impl Iterator<Item = &AssetId> {
        self.entries.values().filter(|e| e.is_cpl()).map(|e| &e.id)
    }

    /// Verify every non-essence entry against its declared hash, collecting
    /// all failures. Files are hashed in parallel when `options.parallel`.
    pub fn verify_hashes_all(
        &self,
        dcp_root: &Path,
        assetmap: &AssetMap,
        options: &HashOptions,
    ) -> Vec<IntegrityFailure> {
        let check =
            |entry: &PackingListEntry| verify_entry(entry, dcp_root, assetmap, options.chunk_size);

        let failures: Vec<IntegrityFailure> = if options.parallel {
            self.entries.par_iter().filter_map(|(_, e)| check(e)).collect()
        } else {
            self.entries.values().filter_map(check).collect()
        };

        info!(
            packing_list = %self.id,
            checked = self.entries.len(),
            failures = failures.len(),
            "hash verification finished"
        );
        failures
    }

    /// Verify hashes, stopping at the first failure.
    pub fn validate_hashes(
        &self,
        dcp_root: &Path,
        assetmap: &AssetMap,
    ) -> Result<(), PackingListError> {
        self.validate_hashes_with(dcp_root, assetmap, &HashOptions::default())
    }

    pub fn validate_hashes_with(
        &self,
        dcp_root: &Path,
        assetmap: &AssetMap,
        options: &HashOptions,
    ) -> Result<(), PackingListError> {
        let failure = self
            .entries
            .values()
            .find_map(|e| verify_entry(e, dcp_root, assetmap, options.chunk_size));
        match failure {
            Some(failure) => Err(PackingListError::Integrity(failure)),
            None => Ok(()),
        }
    }
}

fn verify_entry(
    entry: &PackingListEntry,
    dcp_root: &Path,
    assetmap: &AssetMap,
    chunk_size: usize,
) -> Option<IntegrityFailure> {
    let id = entry.id.clone();
    let Some(asset) = assetmap.get(&entry.id) else {
        warn!(id = %id, "packing list entry is not in the asset map");
        return Some(IntegrityFailure::UnknownAsset { id });
    };
    let path = asset.resolve(dcp_root);

    if is_essence_file(&path) {
        debug!(path = %path.display(), "skipping essence file hash");
        return None;
    }

    let Some(declared) = entry.content_hash.as_deref() else {
        return Some(IntegrityFailure::MissingHash { id, path });
    };
    let Some(expected) = decode_digest(declared) else {
        return Some(IntegrityFailure::MalformedHash {
            id,
            path,
            value: declared.to_string(),
        });
    };

    let computed = match digest_file(&path, chunk_size) {
        Ok(digest) => digest,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Some(IntegrityFailure::MissingFile { id, path });
        }
        Err(e) => {
            return Some(IntegrityFailure::UnreadableFile {
                id,
                path,
                message: e.to_string(),
            });
        }
    };

    if computed[..] == expected[..] {
        debug!(path = %path.display(), "hash verified");
        None
    } else {
        warn!(path = %path.display(), expected = declared, "hash mismatch");
        Some(IntegrityFailure::HashMismatch {
            id,
            path,
            expected: declared.to_string(),
            computed: encode_digest(&computed),
        })
    }
}
