//! ASSETMAP reader.
//!
//! The asset map is the root of every reference chain: packing list entries
//! and CPL reel assets both resolve their ids to files through it.
//!
//! Only the first chunk of a chunk list is honored. SMPTE allows an asset to
//! be split across several chunks (and volumes), which never happens in
//! practice for packages delivered to a single filesystem; extra chunks are
//! ignored with a warning.

use chrono::{DateTime, Utc};
use reelforge_common::paths::is_essence_file;
use reelforge_common::AssetId;
use reelforge_xml::{Document, DocumentKind, INLINE_ORIGIN};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{AssetMapError, IntegrityFailure};
use crate::fields::Fields;
use crate::options::{DuplicatePolicy, ParseOptions};

/// One row of the asset map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetEntry {
    pub id: AssetId,
    /// Path relative to the DCP root, from the first chunk.
    pub path: PathBuf,
    pub volume_index: u32,
    pub byte_offset: u64,
    /// Declared chunk length. Absent means the whole file.
    pub byte_length: Option<u64>,
    /// The entry is flagged `<PackingList>true</PackingList>`.
    pub packing_list: bool,
}

impl AssetEntry {
    /// Absolute location under `dcp_root`.
    pub fn resolve(&self, dcp_root: &Path) -> PathBuf {
        dcp_root.join(&self.path)
    }

    pub fn is_essence(&self) -> bool {
        is_essence_file(&self.path)
    }

    /// Declared length, or the size of the file on disk when undeclared.
    pub fn resolved_length(&self, dcp_root: &Path) -> io::Result<u64> {
        match self.byte_length {
            Some(length) => Ok(length),
            None => fs::metadata(self.resolve(dcp_root)).map(|m| m.len()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetMap {
    pub id: AssetId,
    pub annotation_text: Option<String>,
    pub volume_count: u32,
    pub issue_date: DateTime<Utc>,
    pub issuer: String,
    pub creator: String,
    pub assets: BTreeMap<AssetId, AssetEntry>,
    /// File the map was read from.
    pub source: PathBuf,
}

impl AssetMap {
    pub fn parse(path: &Path) -> Result<Self, AssetMapError> {
        Self::parse_with(path, &ParseOptions::default())
    }

    pub fn parse_with(path: &Path, options: &ParseOptions) -> Result<Self, AssetMapError> {
        let document = Document::from_file(path)?;
        Self::from_document(&document, options)
    }

    /// Parse from memory. Errors name the `<inline>` origin.
    pub fn parse_str(xml: &str, options: &ParseOptions) -> Result<Self, AssetMapError> {
        let document = Document::parse_with_origin(xml, Path::new(INLINE_ORIGIN))?;
        Self::from_document(&document, options)
    }

    pub fn from_document(
        document: &Document,
        options: &ParseOptions,
    ) -> Result<Self, AssetMapError> {
        if let Some(schema) = &options.schema {
            schema.check(document, DocumentKind::AssetMap)?;
        }

        let path = document.origin();
        let root = Fields::new(document.root(), document.namespace(), path);

        let id = root.id("Id")?;
        let volume_count: u32 = root.parse("VolumeCount")?;
        if volume_count == 0 {
            return Err(root.invalid("VolumeCount", "0", "must be at least 1").into());
        }
        let issue_date = root.date("IssueDate")?;
        let issuer = root.required("Issuer")?.to_string();
        let creator = root.required("Creator")?.to_string();
        let asset_list = root.required_child("AssetList")?;

        let mut assets = BTreeMap::new();
        for element in asset_list.children("Asset", document.namespace()) {
            let entry = parse_entry(root.on(element))?;
            let entry_id = entry.id.clone();
            if let Some(previous) = assets.insert(entry_id.clone(), entry) {
                match options.duplicates {
                    DuplicatePolicy::Reject => {
                        return Err(AssetMapError::DuplicateId {
                            path: path.to_path_buf(),
                            id: entry_id,
                        });
                    }
                    DuplicatePolicy::LastWins => warn!(
                        path = %path.display(),
                        id = %entry_id,
                        replaced = %previous.path.display(),
                        "duplicate asset id, keeping the later entry"
                    ),
                }
            }
        }

        debug!(path = %path.display(), id = %id, assets = assets.len(), "parsed asset map");

        Ok(Self {
            id,
            annotation_text: root.owned_text("AnnotationText"),
            volume_count,
            issue_date,
            issuer,
            creator,
            assets,
            source: path.to_path_buf(),
        })
    }

    pub fn get(&self, id: &AssetId) -> Option<&AssetEntry> {
        self.assets.get(id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &AssetEntry> {
        self.assets.values()
    }

    /// The entry flagged as the packing list, if any.
    pub fn packing_list_entry(&self) -> Option<&AssetEntry> {
        self.assets.values().find(|entry| entry.packing_list)
    }

    /// Join `dcp_root` with the path of asset `id`.
    pub fn resolve_path(&self, dcp_root: &Path, id: &AssetId) -> Result<PathBuf, AssetMapError> {
        self.get(id)
            .map(|entry| entry.resolve(dcp_root))
            .ok_or_else(|| AssetMapError::UnknownAsset(id.clone()))
    }

    /// Check every entry exists on disk, collecting all failures.
    pub fn validate_files_all(&self, dcp_root: &Path) -> Vec<IntegrityFailure> {
        self.assets
            .values()
            .filter_map(|entry| check_exists(entry, dcp_root))
            .collect()
    }

    /// Check every entry exists on disk, stopping at the first missing file.
    pub fn validate_files(&self, dcp_root: &Path) -> Result<(), AssetMapError> {
        match self.assets.values().find_map(|entry| check_exists(entry, dcp_root)) {
            Some(failure) => Err(AssetMapError::Integrity(failure)),
            None => Ok(()),
        }
    }
}

fn check_exists(entry: &AssetEntry, dcp_root: &Path) -> Option<IntegrityFailure> {
    let path = entry.resolve(dcp_root);
    if path.is_file() {
        return None;
    }
    warn!(path = %path.display(), id = %entry.id, "asset file not found");
    Some(IntegrityFailure::MissingFile {
        id: entry.id.clone(),
        path,
    })
}

fn parse_entry(asset: Fields<'_>) -> Result<AssetEntry, AssetMapError> {
    let id = asset.id("Id")?;
    let packing_list = asset
        .text("PackingList")
        .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");

    let missing_chunk = || AssetMapError::MissingChunk {
        path: asset.path().to_path_buf(),
        id: id.clone(),
    };
    let chunk_list = asset.element().child("ChunkList", None).ok_or_else(missing_chunk)?;
    let mut chunks = chunk_list.children("Chunk", None);
    let chunk = chunks.next().ok_or_else(missing_chunk)?;
    let extra = chunks.count();
    if extra > 0 {
        warn!(id = %id, ignored = extra, "multi-chunk asset, only the first chunk is used");
    }

    let chunk = asset.on(chunk);
    let raw_path = chunk.required("Path")?;
    let path = PathBuf::from(raw_path);
    if path.is_absolute() || path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(chunk.invalid("Path", raw_path, "must stay inside the package root").into());
    }
    let volume_index = chunk.optional::<u32>("VolumeIndex")?.unwrap_or(1);
    if volume_index == 0 {
        return Err(chunk.invalid("VolumeIndex", "0", "must be at least 1").into());
    }

    Ok(AssetEntry {
        id,
        path,
        volume_index,
        byte_offset: chunk.optional("Offset")?.unwrap_or(0),
        byte_length: chunk.optional("Length")?,
        packing_list,
    })
}
