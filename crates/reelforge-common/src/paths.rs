//! Path utilities for recognizing DCP files by name and extension.
//!
//! These rules drive manifest discovery in a DCP directory and the essence
//! exclusion of the packing-list hash check.

use std::path::Path;

/// Extension of essence (picture/sound track) files.
pub const ESSENCE_EXTENSION: &str = "mxf";

/// Marker a file name must contain to be taken as the asset map.
const ASSETMAP_MARKER: &str = "assetmap";

/// Marker a file name must contain to be taken as the packing list.
const PKL_MARKER: &str = "pkl.xml";

/// Check if a path names an essence file.
///
/// Essence files are the large binary media tracks. Their hashes are never
/// recomputed during packing-list verification.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use reelforge_common::paths::is_essence_file;
///
/// assert!(is_essence_file(Path::new("reel1_picture.mxf")));
/// assert!(is_essence_file(Path::new("/dcp/REEL1_SOUND.MXF")));
/// assert!(!is_essence_file(Path::new("cpl.xml")));
/// ```
pub fn is_essence_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(ESSENCE_EXTENSION))
        .unwrap_or(false)
}

/// Check if a file name looks like an asset map (`ASSETMAP`, `ASSETMAP.xml`).
///
/// # Examples
///
/// ```
/// use reelforge_common::paths::is_assetmap_name;
///
/// assert!(is_assetmap_name("ASSETMAP"));
/// assert!(is_assetmap_name("assetmap.xml"));
/// assert!(!is_assetmap_name("VOLINDEX.xml"));
/// ```
pub fn is_assetmap_name(file_name: &str) -> bool {
    file_name.to_lowercase().contains(ASSETMAP_MARKER)
}

/// Check if a file name looks like a packing list (`..._pkl.xml`).
///
/// # Examples
///
/// ```
/// use reelforge_common::paths::is_pkl_name;
///
/// assert!(is_pkl_name("feature_pkl.xml"));
/// assert!(is_pkl_name("PKL.XML"));
/// assert!(!is_pkl_name("PKL_1234.xml"));
/// ```
pub fn is_pkl_name(file_name: &str) -> bool {
    file_name.to_lowercase().contains(PKL_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_essence_file() {
        assert!(is_essence_file(Path::new("picture.mxf")));
        assert!(is_essence_file(Path::new("picture.MXF")));
        assert!(is_essence_file(Path::new("nested/dir/sound.Mxf")));

        assert!(!is_essence_file(Path::new("cpl.xml")));
        assert!(!is_essence_file(Path::new("subtitle.ttf")));
        assert!(!is_essence_file(Path::new("mxf")));
        assert!(!is_essence_file(Path::new("")));
    }

    #[test]
    fn test_manifest_names() {
        assert!(is_assetmap_name("ASSETMAP"));
        assert!(is_assetmap_name("ASSETMAP.xml"));
        assert!(is_assetmap_name("my_AssetMap.xml"));
        assert!(!is_assetmap_name("cpl.xml"));

        assert!(is_pkl_name("pkl.xml"));
        assert!(is_pkl_name("Feature_PKL.xml"));
        assert!(!is_pkl_name("pkl.txt"));
        assert!(!is_pkl_name("ASSETMAP"));
    }
}
