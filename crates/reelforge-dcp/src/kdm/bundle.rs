//! KDM bundle archive reader.
//!
//! A bundle is a tar holding a `CATALOG` and the KDMs it lists, normally
//! under `CONTENT/`. Some producers wrap everything in a top-level
//! directory, so the catalog nearest the archive root is used and catalog
//! paths are looked up relative to it, with or without the `CONTENT/`
//! prefix.
//!
//! Members are read into memory and never written to disk.

use reelforge_common::AssetId;
use reelforge_xml::{Document, XmlError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Kdm, KdmCatalog};
use crate::error::KdmError;

const CATALOG_MEMBER: &str = "CATALOG";
const CONTENT_DIR: &str = "CONTENT";

type Members = BTreeMap<PathBuf, Vec<u8>>;

#[derive(Debug, Clone, Serialize)]
pub struct KdmBundle {
    pub catalog: KdmCatalog,
    /// One KDM per catalog entry, in catalog order.
    pub kdms: Vec<Kdm>,
}

impl KdmBundle {
    /// Read a bundle tar file.
    pub fn from_tarfile(path: &Path) -> Result<Self, KdmError> {
        let file = File::open(path).map_err(|source| archive_error(path, source))?;
        Self::from_reader(file, path)
    }

    /// Read a bundle from a tar stream. `origin` names the archive in errors.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, KdmError> {
        let members = read_members(reader, origin)?;

        let catalog_path = members
            .keys()
            .filter(|p| p.file_name().is_some_and(|n| n == CATALOG_MEMBER))
            .min_by_key(|p| p.components().count())
            .cloned()
            .ok_or_else(|| missing_member(origin, CATALOG_MEMBER))?;
        let base = catalog_path.parent().unwrap_or(Path::new(""));
        let catalog = KdmCatalog::from_document(&parse_member(&members, &catalog_path, origin)?)?;

        let kdms = catalog
            .files
            .iter()
            .map(|entry| -> Result<Kdm, KdmError> {
                let member = locate(&members, base, &entry.file_path).ok_or_else(|| {
                    missing_member(origin, &entry.file_path.display().to_string())
                })?;
                let kdm = Kdm::from_document(&parse_member(&members, member, origin)?)?;
                if kdm.cpl_id != entry.cpl_id {
                    warn!(
                        member = %member.display(),
                        catalog = %entry.cpl_id,
                        kdm = %kdm.cpl_id,
                        "catalog and KDM disagree on the composition"
                    );
                }
                Ok(kdm)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            bundle = %origin.display(),
            catalog = %catalog.id,
            kdms = kdms.len(),
            "read KDM bundle"
        );
        Ok(Self { catalog, kdms })
    }

    /// KDMs that unlock one composition.
    pub fn for_cpl<'a>(&'a self, cpl_id: &'a AssetId) -> impl Iterator<Item = &'a Kdm> + 'a {
        self.kdms.iter().filter(move |kdm| &kdm.cpl_id == cpl_id)
    }
}

fn read_members<R: Read>(reader: R, origin: &Path) -> Result<Members, KdmError> {
    let io_error = |source: io::Error| archive_error(origin, source);
    let mut archive = tar::Archive::new(reader);
    let mut members = Members::new();

    for entry in archive.entries().map_err(io_error)? {
        let mut entry = entry.map_err(io_error)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = normalize(&entry.path().map_err(io_error)?);
        let mut data = Vec::new();
        entry.read_to_end(&mut data).map_err(io_error)?;
        members.insert(name, data);
    }

    debug!(bundle = %origin.display(), members = members.len(), "read bundle members");
    Ok(members)
}

fn locate<'a>(members: &'a Members, base: &Path, file_path: &Path) -> Option<&'a PathBuf> {
    [base.join(file_path), base.join(CONTENT_DIR).join(file_path)]
        .iter()
        .map(|candidate| normalize(candidate))
        .find_map(|candidate| members.get_key_value(&candidate).map(|(name, _)| name))
}

fn parse_member(members: &Members, name: &Path, origin: &Path) -> Result<Document, KdmError> {
    let path = origin.join(name);
    let data = members
        .get(name)
        .ok_or_else(|| missing_member(origin, &name.display().to_string()))?;
    let xml = std::str::from_utf8(data)
        .map_err(|e| XmlError::malformed(&path, format!("not valid UTF-8: {e}")))?;
    Ok(Document::parse_with_origin(xml, &path)?)
}

/// Member names without `.` segments, with `..` applied.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::ParentDir => {
                normalized.pop();
            }
            _ => {}
        }
    }
    normalized
}

fn archive_error(path: &Path, source: io::Error) -> KdmError {
    KdmError::Archive {
        path: path.to_path_buf(),
        source,
    }
}

fn missing_member(bundle: &Path, member: &str) -> KdmError {
    KdmError::MissingMember {
        bundle: bundle.to_path_buf(),
        member: member.to_string(),
    }
}
