//! Ingest staging: hard-links a composition and its reel assets into a
//! per-CPL folder of an ingest directory.
//!
//! Runs on an opened [`Dcp`]; parsing never writes anything.

use reelforge_common::AssetId;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::StagingError;
use crate::package::Dcp;

#[derive(Debug, Clone)]
pub struct IngestStager {
    ingest_dir: PathBuf,
}

impl IngestStager {
    pub fn new(ingest_dir: impl Into<PathBuf>) -> Self {
        Self {
            ingest_dir: ingest_dir.into(),
        }
    }

    pub fn ingest_dir(&self) -> &Path {
        &self.ingest_dir
    }

    /// Link the CPL file and every resolved reel asset into
    /// `<ingest_dir>/<cpl_id>/`. Existing links are left alone.
    ///
    /// Returns the staged paths, CPL first.
    pub fn stage(&self, dcp: &Dcp, cpl_id: &AssetId) -> Result<Vec<PathBuf>, StagingError> {
        let cpl = dcp
            .cpl(cpl_id)
            .ok_or_else(|| StagingError::UnknownCpl(cpl_id.clone()))?;

        let target = self.ingest_dir.join(cpl_id.as_str());
        fs::create_dir_all(&target).map_err(|source| StagingError::Io {
            path: target.clone(),
            source,
        })?;

        let sources = std::iter::once(cpl.source.as_path()).chain(
            cpl.reels
                .iter()
                .flat_map(|reel| reel.iter())
                .filter_map(|asset| asset.resolved_path.as_deref()),
        );

        let mut staged = Vec::new();
        for source in sources {
            let Some(name) = source.file_name() else {
                continue;
            };
            let link = target.join(name);
            if !staged.contains(&link) {
                link_once(source, &link)?;
                staged.push(link);
            }
        }

        info!(
            cpl = %cpl_id,
            target = %target.display(),
            files = staged.len(),
            "staged composition"
        );
        Ok(staged)
    }
}

fn link_once(source: &Path, link: &Path) -> Result<(), StagingError> {
    match fs::hard_link(source, link) {
        Ok(()) => {
            debug!(source = %source.display(), link = %link.display(), "linked");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            debug!(link = %link.display(), "already staged");
            Ok(())
        }
        Err(source_err) => Err(StagingError::Io {
            path: source.to_path_buf(),
            source: source_err,
        }),
    }
}
