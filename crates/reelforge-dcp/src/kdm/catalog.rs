//! KDM bundle `CATALOG` reader.
//!
//! A bundle ships many KDMs with a catalog listing which file unlocks which
//! composition. [`KdmBundle`](super::KdmBundle) reads the archive around it.

use chrono::{DateTime, Utc};
use reelforge_common::AssetId;
use reelforge_xml::{Document, INLINE_ORIGIN};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::KdmError;
use crate::fields::Fields;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KdmFileEntry {
    pub cpl_id: AssetId,
    /// Path of the KDM inside the bundle.
    pub file_path: PathBuf,
    pub not_before: Option<DateTime<Utc>>,
    pub not_after: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KdmCatalog {
    pub id: AssetId,
    pub annotation_text: Option<String>,
    pub creator: Option<String>,
    pub files: Vec<KdmFileEntry>,
}

impl KdmCatalog {
    pub fn from_file(path: &Path) -> Result<Self, KdmError> {
        Self::from_document(&Document::from_file(path)?)
    }

    pub fn parse_str(xml: &str) -> Result<Self, KdmError> {
        Self::from_document(&Document::parse_with_origin(xml, Path::new(INLINE_ORIGIN))?)
    }

    pub fn from_document(document: &Document) -> Result<Self, KdmError> {
        let root = Fields::new(document.root(), document.namespace(), document.origin());
        let list = root.required_child("KDMFileList")?;

        let files = list
            .elements()
            .map(|element| -> Result<KdmFileEntry, KdmError> {
                let file = root.on(element);
                Ok(KdmFileEntry {
                    cpl_id: file.id("CompositionPlaylistId")?,
                    file_path: PathBuf::from(file.required("FilePath")?),
                    not_before: file.optional_date("ContentKeysNotValidBefore")?,
                    not_after: file.optional_date("ContentKeysNotValidAfter")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: root.id("Id")?,
            annotation_text: root.owned_text("AnnotationText"),
            creator: root.owned_text("Creator"),
            files,
        })
    }

    /// Catalog entries for one composition.
    pub fn for_cpl<'a>(
        &'a self,
        cpl_id: &'a AssetId,
    ) -> impl Iterator<Item = &'a KdmFileEntry> + 'a {
        self.files.iter().filter(move |f| &f.cpl_id == cpl_id)
    }
}
