//! Identifier handling for DCP documents.
//!
//! Manifests spell identifiers as URNs (`urn:uuid:...`, `urn:x-facilityID:...`).
//! Every join between documents compares the bare trailing segment, so the
//! URN prefix is stripped once when the id is read and never carried around.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{Error, Result};

/// URN-stripped identifier of an asset, reel, composition or message.
///
/// UUID values are normalized to their lowercase hyphenated form so that
/// `urn:uuid:ABCD...` in one document matches `urn:uuid:abcd...` in another.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Wrap an already-bare identifier.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(normalize(id.into().trim()))
    }

    /// Parse a URN and keep only its trailing identifier segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use reelforge_common::AssetId;
    ///
    /// let id = AssetId::from_urn("urn:uuid:01658edd-edfb-4c52-beec-1f5b9616e813").unwrap();
    /// assert_eq!(id.as_str(), "01658edd-edfb-4c52-beec-1f5b9616e813");
    /// assert!(AssetId::from_urn("01658edd").is_err());
    /// ```
    pub fn from_urn(urn: &str) -> Result<Self> {
        let urn = urn.trim();
        let mut segments = urn.split(':');
        let scheme = segments.next().unwrap_or_default();
        if !scheme.eq_ignore_ascii_case("urn") {
            return Err(Error::invalid_id(urn));
        }
        let rest: Vec<&str> = segments.collect();
        if rest.len() < 2 {
            return Err(Error::invalid_id(urn));
        }
        match rest.last() {
            Some(tail) if !tail.is_empty() => Ok(Self(normalize(tail))),
            _ => Err(Error::invalid_id(urn)),
        }
    }

    /// The bare identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render back as a `urn:uuid:` URN.
    pub fn to_urn(&self) -> String {
        format!("urn:uuid:{}", self.0)
    }
}

fn normalize(raw: &str) -> String {
    match Uuid::parse_str(raw) {
        Ok(uuid) => uuid.hyphenated().to_string(),
        Err(_) => raw.to_string(),
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for AssetId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_uuid_urn() {
        let id = AssetId::from_urn("urn:uuid:7ec59b28-8ef4-4963-88e8-9d0a08763b4a").unwrap();
        assert_eq!(id.as_str(), "7ec59b28-8ef4-4963-88e8-9d0a08763b4a");
        assert_eq!(id.to_urn(), "urn:uuid:7ec59b28-8ef4-4963-88e8-9d0a08763b4a");
    }

    #[test]
    fn test_uuid_case_is_normalized() {
        let upper = AssetId::from_urn("urn:uuid:7EC59B28-8EF4-4963-88E8-9D0A08763B4A").unwrap();
        let lower = AssetId::from_urn("urn:uuid:7ec59b28-8ef4-4963-88e8-9d0a08763b4a").unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_facility_urn_keeps_trailing_segment() {
        let id = AssetId::from_urn("urn:x-facilityID:aam.com:Site42").unwrap();
        assert_eq!(id.as_str(), "Site42");
    }

    #[test]
    fn test_rejects_non_urn_values() {
        assert!(AssetId::from_urn("").is_err());
        assert!(AssetId::from_urn("7ec59b28-8ef4").is_err());
        assert!(AssetId::from_urn("urn:uuid").is_err());
        assert!(AssetId::from_urn("urn:uuid:").is_err());
        assert!(AssetId::from_urn("http:uuid:abc").is_err());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let id = AssetId::from_urn("  urn:uuid:7ec59b28-8ef4-4963-88e8-9d0a08763b4a\n").unwrap();
        assert_eq!(id, AssetId::new("7ec59b28-8ef4-4963-88e8-9d0a08763b4a"));
    }

    #[test]
    fn test_serializes_transparently() {
        let id = AssetId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
