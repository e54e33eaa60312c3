//! The points where Interop and SMPTE playlists differ.

use reelforge_common::{Dialect, Rational, ScreenAspectRatio};
use reelforge_xml::Element;

use super::reel::AssetKind;
use super::CompositionMetadata;

pub const SMPTE_CPL_NS: &str = "http://www.smpte-ra.org/schemas/429-7/2006/CPL";
pub const INTEROP_CPL_NS: &str = "http://www.digicine.com/PROTO-ASDCP-CPL-20040511#";
pub const SMPTE_METADATA_NS: &str = "http://www.smpte-ra.org/schemas/429-16/2014/CPL-Metadata";

/// What an element of a reel asset list holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssetTag {
    Picture(AssetKind),
    Sound,
    Subtitle,
    Metadata,
}

/// Classify a reel asset list child by its local name.
pub(crate) fn classify(dialect: Dialect, tag: &str) -> Option<AssetTag> {
    match (tag, dialect) {
        ("MainPicture", _) => Some(AssetTag::Picture(AssetKind::Picture)),
        ("MainStereoscopicPicture", _) => Some(AssetTag::Picture(AssetKind::StereoscopicPicture)),
        ("MainSound", _) => Some(AssetTag::Sound),
        ("MainSubtitle", _) => Some(AssetTag::Subtitle),
        ("CompositionMetadataAsset", Dialect::Smpte) => Some(AssetTag::Metadata),
        _ => None,
    }
}

/// SMPTE requires `"<n> <d>"`; Interop also accepts a decimal such as `1.85`.
pub(crate) fn screen_aspect_ratio(
    dialect: Dialect,
    value: &str,
) -> Result<ScreenAspectRatio, String> {
    let value = value.trim();
    let rational = || {
        value
            .parse::<Rational>()
            .map(ScreenAspectRatio::Rational)
            .map_err(|e| e.to_string())
    };
    match dialect {
        Dialect::Smpte => rational(),
        Dialect::Interop if value.contains(char::is_whitespace) => rational(),
        Dialect::Interop => match value.parse::<f64>() {
            Ok(ratio) if ratio.is_finite() && ratio > 0.0 => Ok(ScreenAspectRatio::Decimal(ratio)),
            _ => Err("expected a positive decimal or \"<n> <d>\"".to_string()),
        },
    }
}

/// Read an ST 429-16 `CompositionMetadataAsset`.
pub(crate) fn composition_metadata(element: &Element) -> CompositionMetadata {
    let text = |name: &str| element.child_text(name, None).map(str::to_string);
    CompositionMetadata {
        full_content_title: text("FullContentTitleText"),
        version_number: text("VersionNumber"),
        main_sound_configuration: text("MainSoundConfiguration"),
    }
}
