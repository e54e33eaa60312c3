//! Composition playlist reader.
//!
//! The dialect is decided once from the root namespace and passed down to
//! the few places that depend on it (see [`dialect`]). Every reel asset is
//! resolved to a file through the asset map as it is read; a playlist is
//! only returned once all of its reels are built.

pub mod dialect;
pub mod reel;

use chrono::{DateTime, Utc};
use reelforge_common::{AssetId, ContentKind, Dialect};
use reelforge_xml::{Document, DocumentKind, INLINE_ORIGIN};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::assetmap::AssetMap;
use crate::error::CplError;
use crate::fields::Fields;
use crate::options::ParseOptions;
use reel::{ParsedReel, ReelContext};

pub use reel::{Asset, AssetKind, PictureEssence, Reel, Slot, UnresolvedReference};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentVersion {
    pub id: Option<String>,
    pub label: Option<String>,
}

/// ST 429-16 composition metadata carried by SMPTE playlists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CompositionMetadata {
    pub full_content_title: Option<String>,
    pub version_number: Option<String>,
    pub main_sound_configuration: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompositionPlaylist {
    pub id: AssetId,
    pub dialect: Dialect,
    /// `ContentTitleText`.
    pub title: String,
    pub annotation_text: Option<String>,
    pub issue_date: DateTime<Utc>,
    pub issuer: Option<String>,
    pub creator: Option<String>,
    pub content_kind: ContentKind,
    pub content_version: Option<ContentVersion>,
    pub metadata: Option<CompositionMetadata>,
    /// Reels in playback order.
    pub reels: Vec<Reel>,
    pub unresolved: Vec<UnresolvedReference>,
    pub source: PathBuf,
    #[serde(skip)]
    issue_date_text: String,
}

impl CompositionPlaylist {
    pub fn parse(
        path: &Path,
        assetmap: &AssetMap,
        dcp_root: &Path,
        options: &ParseOptions,
    ) -> Result<Self, CplError> {
        let document = Document::from_file(path)?;
        Self::from_document(&document, assetmap, dcp_root, options)
    }

    pub fn parse_str(
        xml: &str,
        assetmap: &AssetMap,
        dcp_root: &Path,
        options: &ParseOptions,
    ) -> Result<Self, CplError> {
        let document = Document::parse_with_origin(xml, Path::new(INLINE_ORIGIN))?;
        Self::from_document(&document, assetmap, dcp_root, options)
    }

    pub fn from_document(
        document: &Document,
        assetmap: &AssetMap,
        dcp_root: &Path,
        options: &ParseOptions,
    ) -> Result<Self, CplError> {
        if let Some(schema) = &options.schema {
            schema.check(document, DocumentKind::CompositionPlaylist)?;
        }

        let path = document.origin();
        let ns = document.namespace();
        let dialect = Dialect::detect(ns);
        let root = Fields::new(document.root(), ns, path);

        let id = root.id("Id")?;
        let title = root.required("ContentTitleText")?.to_string();
        let issue_date_text = root.required("IssueDate")?.to_string();
        let issue_date = root.date("IssueDate")?;
        let content_kind = ContentKind::parse(root.required("ContentKind")?);
        let content_version = root.element().child("ContentVersion", ns).map(|element| {
            let version = root.on(element);
            ContentVersion {
                id: version.owned_text("Id"),
                label: version.owned_text("LabelText"),
            }
        });

        let ctx = ReelContext {
            dialect,
            ns,
            path,
            assetmap,
            dcp_root,
            resolution: options.resolution,
        };
        let reel_list = root.required_child("ReelList")?;
        let mut reels = Vec::new();
        let mut metadata = None;
        let mut unresolved = Vec::new();
        for element in reel_list.children("Reel", ns) {
            let ParsedReel {
                reel,
                metadata: reel_metadata,
                unresolved: reel_unresolved,
            } = reel::parse_reel(element, &ctx)?;
            if metadata.is_none() {
                metadata = reel_metadata;
            }
            unresolved.extend(reel_unresolved);
            reels.push(reel);
        }
        if reels.is_empty() {
            return Err(root.on(reel_list).missing("Reel").into());
        }

        info!(
            path = %path.display(),
            id = %id,
            dialect = %dialect,
            reels = reels.len(),
            unresolved = unresolved.len(),
            "parsed composition playlist"
        );

        Ok(Self {
            id,
            dialect,
            title,
            annotation_text: root.owned_text("AnnotationText"),
            issue_date,
            issuer: root.owned_text("Issuer"),
            creator: root.owned_text("Creator"),
            content_kind,
            content_version,
            metadata,
            reels,
            unresolved,
            source: path.to_path_buf(),
            issue_date_text,
        })
    }

    /// `urn:uri:{id}_{issue date}`, as written in the playlist.
    pub fn version_id(&self) -> String {
        format!("urn:uri:{}", self.version_label())
    }

    pub fn version_label(&self) -> String {
        format!("{}_{}", self.id, self.issue_date_text)
    }

    /// Sum of the picture durations of all reels, in edit units.
    pub fn total_duration(&self) -> u64 {
        self.reels.iter().map(|reel| reel.picture.duration).sum()
    }

    /// Whether every reel asset resolved to a file.
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Find an asset in any reel.
    pub fn asset(&self, id: &AssetId) -> Option<&Asset> {
        self.reels.iter().flat_map(Reel::iter).find(|asset| &asset.id == id)
    }
}
