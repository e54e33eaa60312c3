//! Reels and the typed assets they reference.

use reelforge_common::{AssetId, Dialect, Rational, ScreenAspectRatio};
use reelforge_xml::Element;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::dialect::{self, AssetTag};
use super::CompositionMetadata;
use crate::assetmap::AssetMap;
use crate::error::CplError;
use crate::fields::Fields;
use crate::options::ResolutionPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Picture,
    StereoscopicPicture,
    Sound,
    Subtitle,
}

impl AssetKind {
    pub fn slot(self) -> Slot {
        match self {
            Self::Picture | Self::StereoscopicPicture => Slot::Picture,
            Self::Sound => Slot::Sound,
            Self::Subtitle => Slot::Subtitle,
        }
    }
}

/// Position of an asset within a reel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Picture,
    Sound,
    Subtitle,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Picture => write!(f, "picture"),
            Self::Sound => write!(f, "sound"),
            Self::Subtitle => write!(f, "subtitle"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PictureEssence {
    pub frame_rate: Rational,
    pub screen_aspect_ratio: ScreenAspectRatio,
}

/// A track referenced by a reel. Durations are in edit units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub kind: AssetKind,
    pub id: AssetId,
    pub annotation_text: Option<String>,
    pub edit_rate: Rational,
    pub intrinsic_duration: u64,
    pub entry_point: u64,
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<PictureEssence>,
    pub key_id: Option<AssetId>,
    pub hash: Option<String>,
    /// File the asset resolved to through the asset map.
    pub resolved_path: Option<PathBuf>,
}

impl Asset {
    pub fn slot(&self) -> Slot {
        self.kind.slot()
    }

    pub fn is_encrypted(&self) -> bool {
        self.key_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reel {
    pub id: AssetId,
    pub picture: Asset,
    pub sound: Asset,
    pub subtitle: Option<Asset>,
}

impl Reel {
    /// Assets in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        [Some(&self.picture), Some(&self.sound), self.subtitle.as_ref()]
            .into_iter()
            .flatten()
    }

    /// The reel's assets keyed by id.
    pub fn assets(&self) -> BTreeMap<&AssetId, &Asset> {
        self.iter().map(|asset| (&asset.id, asset)).collect()
    }
}

/// A reel asset left without a file under [`ResolutionPolicy::Lenient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    pub reel: AssetId,
    pub slot: Slot,
    pub id: AssetId,
}

/// Everything a reel needs from its playlist.
pub(crate) struct ReelContext<'a> {
    pub dialect: Dialect,
    pub ns: Option<&'a str>,
    pub path: &'a Path,
    pub assetmap: &'a AssetMap,
    pub dcp_root: &'a Path,
    pub resolution: ResolutionPolicy,
}

pub(crate) struct ParsedReel {
    pub reel: Reel,
    pub metadata: Option<CompositionMetadata>,
    pub unresolved: Vec<UnresolvedReference>,
}

pub(crate) fn parse_reel(element: &Element, ctx: &ReelContext<'_>) -> Result<ParsedReel, CplError> {
    let fields = Fields::new(element, ctx.ns, ctx.path);
    let reel_id = fields.id("Id")?;
    let asset_list = fields.required_child("AssetList")?;

    let mut picture = None;
    let mut sound = None;
    let mut subtitle = None;
    let mut metadata = None;
    let mut unresolved = Vec::new();

    for child in asset_list.elements() {
        let tag = match dialect::classify(ctx.dialect, child.name()) {
            Some(tag) => tag,
            None => {
                return Err(CplError::UnknownAssetType {
                    path: ctx.path.to_path_buf(),
                    reel: reel_id,
                    tag: child.name().to_string(),
                })
            }
        };
        let (slot, kind) = match tag {
            AssetTag::Metadata => {
                if metadata.is_none() {
                    metadata = Some(dialect::composition_metadata(child));
                }
                continue;
            }
            AssetTag::Picture(kind) => (&mut picture, kind),
            AssetTag::Sound => (&mut sound, AssetKind::Sound),
            AssetTag::Subtitle => (&mut subtitle, AssetKind::Subtitle),
        };
        if slot.is_some() {
            return Err(CplError::DuplicateSlot {
                path: ctx.path.to_path_buf(),
                reel: reel_id,
                slot: kind.slot(),
            });
        }
        *slot = Some(parse_asset(child, kind, &reel_id, ctx, &mut unresolved)?);
    }

    let missing = |slot: Slot| CplError::MissingSlot {
        path: ctx.path.to_path_buf(),
        reel: reel_id.clone(),
        slot,
    };
    let picture = picture.ok_or_else(|| missing(Slot::Picture))?;
    let sound = sound.ok_or_else(|| missing(Slot::Sound))?;

    Ok(ParsedReel {
        reel: Reel {
            id: reel_id,
            picture,
            sound,
            subtitle,
        },
        metadata,
        unresolved,
    })
}

fn parse_asset(
    element: &Element,
    kind: AssetKind,
    reel_id: &AssetId,
    ctx: &ReelContext<'_>,
    unresolved: &mut Vec<UnresolvedReference>,
) -> Result<Asset, CplError> {
    // Stereoscopic pictures live in their own namespace; their children do not.
    let fields = Fields::new(element, None, ctx.path);
    let id = fields.id("Id")?;
    let edit_rate: Rational = fields.parse("EditRate")?;
    let intrinsic_duration: u64 = fields.parse("IntrinsicDuration")?;
    let entry_point: u64 = fields.optional("EntryPoint")?.unwrap_or(0);
    let duration: u64 = fields
        .optional("Duration")?
        .unwrap_or_else(|| intrinsic_duration.saturating_sub(entry_point));

    let fits = entry_point
        .checked_add(duration)
        .is_some_and(|end| end <= intrinsic_duration);
    if !fits {
        return Err(CplError::InvalidTiming {
            path: ctx.path.to_path_buf(),
            reel: reel_id.clone(),
            slot: kind.slot(),
            entry_point,
            duration,
            intrinsic_duration,
        });
    }

    let picture = match kind {
        AssetKind::Picture | AssetKind::StereoscopicPicture => {
            let value = fields.required("ScreenAspectRatio")?;
            let screen_aspect_ratio = dialect::screen_aspect_ratio(ctx.dialect, value)
                .map_err(|reason| fields.invalid("ScreenAspectRatio", value, reason))?;
            Some(PictureEssence {
                frame_rate: fields.parse("FrameRate")?,
                screen_aspect_ratio,
            })
        }
        AssetKind::Sound | AssetKind::Subtitle => None,
    };

    let resolved_path = match ctx.assetmap.get(&id) {
        Some(entry) => Some(entry.resolve(ctx.dcp_root)),
        None => match ctx.resolution {
            ResolutionPolicy::Strict => {
                return Err(CplError::UnresolvedAsset {
                    path: ctx.path.to_path_buf(),
                    reel: reel_id.clone(),
                    slot: kind.slot(),
                    id,
                });
            }
            ResolutionPolicy::Lenient => {
                warn!(
                    cpl = %ctx.path.display(),
                    reel = %reel_id,
                    slot = %kind.slot(),
                    id = %id,
                    "reel asset not in asset map"
                );
                unresolved.push(UnresolvedReference {
                    reel: reel_id.clone(),
                    slot: kind.slot(),
                    id: id.clone(),
                });
                None
            }
        },
    };

    Ok(Asset {
        kind,
        id,
        annotation_text: fields.owned_text("AnnotationText"),
        edit_rate,
        intrinsic_duration,
        entry_point,
        duration,
        picture,
        key_id: fields.optional_id("KeyId")?,
        hash: fields.owned_text("Hash"),
        resolved_path,
    })
}
