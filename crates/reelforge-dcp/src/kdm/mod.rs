//! Key Delivery Message reader.
//!
//! Extracts the public metadata of a KDM: which composition it unlocks,
//! for whom, and when. The encrypted key blobs are carried as opaque base64
//! and never decrypted.

mod bundle;
mod catalog;

pub use bundle::KdmBundle;
pub use catalog::{KdmCatalog, KdmFileEntry};

use chrono::{DateTime, Utc};
use reelforge_common::{AssetId, Dialect};
use reelforge_xml::{Document, Element, INLINE_ORIGIN};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::KdmError;
use crate::fields::Fields;

/// Namespace of the SMPTE `KDMRequiredExtensions` block.
pub const SMPTE_KDM_NS: &str = "http://www.smpte-ra.org/schemas/430-1/2006/KDM";

/// A content key id with its key type (`MDIK`, `MDAK`, `MDSK`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedKeyId {
    pub key_type: Option<String>,
    pub key_id: AssetId,
}

#[derive(Debug, Clone, Serialize)]
pub struct Kdm {
    /// `MessageId`.
    pub id: AssetId,
    pub dialect: Dialect,
    pub annotation_text: Option<String>,
    pub issue_date: DateTime<Utc>,
    pub cpl_id: AssetId,
    pub content_title_text: Option<String>,
    pub not_valid_before: DateTime<Utc>,
    pub not_valid_after: DateTime<Utc>,
    /// Subject name of the recipient certificate.
    pub recipient: Option<String>,
    pub keys: Vec<TypedKeyId>,
    /// Encrypted key blobs, base64 as delivered.
    #[serde(skip_serializing)]
    pub cipher_values: Vec<String>,
    pub source: PathBuf,
}

impl Kdm {
    pub fn from_file(path: &Path) -> Result<Self, KdmError> {
        Self::from_document(&Document::from_file(path)?)
    }

    pub fn parse_str(xml: &str) -> Result<Self, KdmError> {
        Self::from_document(&Document::parse_with_origin(xml, Path::new(INLINE_ORIGIN))?)
    }

    pub fn from_document(document: &Document) -> Result<Self, KdmError> {
        let path = document.origin();
        let ns = document.namespace();
        let dialect = Dialect::detect(ns);
        let root = Fields::new(document.root(), ns, path);

        let public = root.on(root.required_child("AuthenticatedPublic")?);
        let required = public.on(public.required_child("RequiredExtensions")?);

        // SMPTE nests the KDM fields in their own namespace one level deeper.
        let extensions = match dialect {
            Dialect::Smpte => {
                let block = required
                    .element()
                    .child("KDMRequiredExtensions", Some(SMPTE_KDM_NS))
                    .ok_or_else(|| required.missing("KDMRequiredExtensions"))?;
                Fields::new(block, Some(SMPTE_KDM_NS), path)
            }
            Dialect::Interop => required,
        };

        let keys = extensions
            .element()
            .descendants("TypedKeyId", None)
            .map(|typed| -> Result<TypedKeyId, KdmError> {
                let fields = Fields::new(typed, None, path);
                Ok(TypedKeyId {
                    key_type: fields.owned_text("KeyType"),
                    key_id: fields.id("KeyId")?,
                })
            })
            .collect::<Result<Vec<_>, KdmError>>()?;

        let recipient = extensions
            .element()
            .descendants("X509SubjectName", None)
            .next()
            .map(|e| e.text().to_string())
            .filter(|s| !s.is_empty());

        let cipher_values = document
            .root()
            .child("AuthenticatedPrivate", ns)
            .map(cipher_values)
            .unwrap_or_default();

        let kdm = Self {
            id: public.id("MessageId")?,
            dialect,
            annotation_text: public.owned_text("AnnotationText"),
            issue_date: public.date("IssueDate")?,
            cpl_id: extensions.id("CompositionPlaylistId")?,
            content_title_text: extensions.owned_text("ContentTitleText"),
            not_valid_before: extensions.date("ContentKeysNotValidBefore")?,
            not_valid_after: extensions.date("ContentKeysNotValidAfter")?,
            recipient,
            keys,
            cipher_values,
            source: path.to_path_buf(),
        };
        debug!(id = %kdm.id, cpl = %kdm.cpl_id, keys = kdm.keys.len(), "parsed KDM");
        Ok(kdm)
    }

    /// Whether `instant` falls inside the key validity window (inclusive).
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        self.not_valid_before <= instant && instant <= self.not_valid_after
    }
}

fn cipher_values(private: &Element) -> Vec<String> {
    private
        .descendants("CipherValue", None)
        .map(|e| e.text().split_whitespace().collect::<String>())
        .filter(|s| !s.is_empty())
        .collect()
}
