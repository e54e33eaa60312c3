//! DCP aggregator: discovers the manifests of a package directory and reads
//! them in dependency order (asset map, packing list, playlists).

use rayon::prelude::*;
use reelforge_common::paths::{is_assetmap_name, is_pkl_name};
use reelforge_common::{AssetId, ContentKind, Dialect, ErrorKind};
use reelforge_xml::Document;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::assetmap::AssetMap;
use crate::cpl::CompositionPlaylist;
use crate::error::{CplError, DcpError};
use crate::options::OpenOptions;
use crate::pkl::PackingList;

/// Manifest files found in a package directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifests {
    pub assetmap: Option<PathBuf>,
    pub pkl: Option<PathBuf>,
}

/// Walk `root` once looking for the ASSETMAP and the PKL.
///
/// Entries are visited in file-name order, so the first match is stable.
/// With a `deadline`, the walk fails once it has run longer than that.
pub fn discover(root: &Path, deadline: Option<Duration>) -> Result<Manifests, DcpError> {
    let started = Instant::now();
    let mut found = Manifests::default();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        if let Some(limit) = deadline {
            if started.elapsed() >= limit {
                return Err(DcpError::WalkDeadline {
                    root: root.to_path_buf(),
                    limit,
                });
            }
        }

        let entry = entry.map_err(|source| DcpError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if found.assetmap.is_none() && is_assetmap_name(&name) {
            debug!(path = %entry.path().display(), "found asset map");
            found.assetmap = Some(entry.path().to_path_buf());
        } else if found.pkl.is_none() && is_pkl_name(&name) {
            debug!(path = %entry.path().display(), "found packing list");
            found.pkl = Some(entry.path().to_path_buf());
        }
        if found.assetmap.is_some() && found.pkl.is_some() {
            break;
        }
    }

    Ok(found)
}

/// A playlist that failed to parse while its siblings succeeded.
#[derive(Debug)]
pub struct CplFailure {
    pub id: AssetId,
    pub error: CplError,
}

/// An opened, cross-validated package.
#[derive(Debug)]
pub struct Dcp {
    pub root: PathBuf,
    pub assetmap: AssetMap,
    pub pkl: PackingList,
    pub cpls: BTreeMap<AssetId, CompositionPlaylist>,
    pub cpl_failures: Vec<CplFailure>,
}

impl Dcp {
    pub fn open(root: &Path) -> Result<Self, DcpError> {
        Self::open_with(root, &OpenOptions::default())
    }

    pub fn open_with(root: &Path, options: &OpenOptions) -> Result<Self, DcpError> {
        info!(root = %root.display(), "opening DCP");
        let manifests = discover(root, options.walk_timeout)?;

        let assetmap_path = manifests.assetmap.ok_or_else(|| DcpError::ManifestMissing {
            root: root.to_path_buf(),
            manifest: "ASSETMAP",
        })?;
        let assetmap = AssetMap::parse_with(&assetmap_path, &options.parse)?;

        let mut failures = Vec::new();
        if options.fail_fast {
            assetmap.validate_files(root)?;
        } else {
            failures.extend(assetmap.validate_files_all(root));
        }

        let pkl_path = manifests
            .pkl
            .or_else(|| assetmap.packing_list_entry().map(|entry| entry.resolve(root)))
            .ok_or_else(|| DcpError::ManifestMissing {
                root: root.to_path_buf(),
                manifest: "PKL",
            })?;
        let pkl = PackingList::parse_with(&pkl_path, &options.parse)?;

        if options.fail_fast {
            pkl.validate_hashes_with(root, &assetmap, &options.hashing)?;
        } else {
            for failure in pkl.verify_hashes_all(root, &assetmap, &options.hashing) {
                if !failures.contains(&failure) {
                    failures.push(failure);
                }
            }
            if !failures.is_empty() {
                return Err(DcpError::Integrity {
                    root: root.to_path_buf(),
                    failures,
                });
            }
        }

        let cpl_paths = select_cpls(root, &assetmap, &pkl);
        let parse = |(id, path): &(AssetId, PathBuf)| {
            let result = CompositionPlaylist::parse(path, &assetmap, root, &options.parse);
            (id.clone(), result)
        };

        let results: Vec<(AssetId, Result<CompositionPlaylist, CplError>)> = if options.parallel {
            cpl_paths.par_iter().map(parse).collect()
        } else {
            cpl_paths.iter().map(parse).collect()
        };

        let mut cpls = BTreeMap::new();
        let mut cpl_failures = Vec::new();
        for (id, result) in results {
            match result {
                Ok(cpl) => {
                    cpls.insert(id, cpl);
                }
                Err(error)
                    if options.fail_fast || error.kind() == ErrorKind::FatalConfiguration =>
                {
                    return Err(DcpError::Cpl { id, source: error });
                }
                Err(error) => {
                    warn!(id = %id, error = %error, "composition playlist failed");
                    cpl_failures.push(CplFailure { id, error });
                }
            }
        }

        info!(
            root = %root.display(),
            assets = assetmap.len(),
            cpls = cpls.len(),
            failed = cpl_failures.len(),
            "DCP opened"
        );

        Ok(Self {
            root: root.to_path_buf(),
            assetmap,
            pkl,
            cpls,
            cpl_failures,
        })
    }

    pub fn cpl(&self, id: &AssetId) -> Option<&CompositionPlaylist> {
        self.cpls.get(id)
    }

    /// Serializable summary of the package.
    pub fn report(&self) -> DcpReport {
        DcpReport {
            root: self.root.clone(),
            assetmap_id: self.assetmap.id.clone(),
            pkl_id: self.pkl.id.clone(),
            assets: self.assetmap.len(),
            cpls: self
                .cpls
                .values()
                .map(|cpl| CplSummary {
                    id: cpl.id.clone(),
                    title: cpl.title.clone(),
                    dialect: cpl.dialect,
                    content_kind: cpl.content_kind.clone(),
                    reels: cpl.reels.len(),
                    duration: cpl.total_duration(),
                    unresolved: cpl.unresolved.len(),
                })
                .collect(),
            cpl_failures: self
                .cpl_failures
                .iter()
                .map(|failure| FailureSummary {
                    id: failure.id.clone(),
                    kind: failure.error.kind(),
                    message: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

/// CPLs listed in the packing list, with their resolved paths.
///
/// Interop lists mark playlists with `asdcpKind=CPL`. SMPTE lists type them
/// as plain `text/xml`, so those entries are sniffed for a
/// `CompositionPlaylist` root.
fn select_cpls(root: &Path, assetmap: &AssetMap, pkl: &PackingList) -> Vec<(AssetId, PathBuf)> {
    pkl.entries
        .values()
        .filter_map(|entry| {
            let path = assetmap.get(&entry.id)?.resolve(root);
            let is_cpl = entry.is_cpl() || (entry.is_xml() && has_cpl_root(&path));
            is_cpl.then(|| (entry.id.clone(), path))
        })
        .collect()
}

fn has_cpl_root(path: &Path) -> bool {
    match Document::from_file(path) {
        Ok(doc) => doc.root().name() == "CompositionPlaylist",
        Err(e) => {
            debug!(path = %path.display(), error = %e, "not sniffable as XML");
            false
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DcpReport {
    pub root: PathBuf,
    pub assetmap_id: AssetId,
    pub pkl_id: AssetId,
    pub assets: usize,
    pub cpls: Vec<CplSummary>,
    pub cpl_failures: Vec<FailureSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CplSummary {
    pub id: AssetId,
    pub title: String,
    pub dialect: Dialect,
    pub content_kind: ContentKind,
    pub reels: usize,
    /// Total picture duration in edit units.
    pub duration: u64,
    pub unresolved: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureSummary {
    pub id: AssetId,
    pub kind: ErrorKind,
    pub message: String,
}
