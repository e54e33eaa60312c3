//! Core value types shared by the DCP readers.
//!
//! Enums serialize in lowercase to match the spelling used inside the
//! manifests themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Namespace fragment that identifies SMPTE documents.
const SMPTE_NAMESPACE_MARKER: &str = "smpte-ra.org";

/// One of the two historical dialects of DCP metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// The legacy digicine.com namespace family.
    Interop,
    /// The SMPTE ST 429 namespace family.
    Smpte,
}

impl Dialect {
    /// Decide the dialect from a document's root namespace URI.
    ///
    /// Any `smpte-ra.org` namespace is SMPTE; everything else, including a
    /// missing namespace, is treated as Interop.
    pub fn detect(namespace: Option<&str>) -> Self {
        match namespace {
            Some(ns) if ns.contains(SMPTE_NAMESPACE_MARKER) => Self::Smpte,
            _ => Self::Interop,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interop => write!(f, "interop"),
            Self::Smpte => write!(f, "smpte"),
        }
    }
}

/// An exact rational such as an edit rate (`24 1`) or aspect ratio (`1998 1080`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rational {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl FromStr for Rational {
    type Err = Error;

    /// Parse the whitespace separated `"<numerator> <denominator>"` form.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let (Some(num), Some(den), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::invalid_rational(s));
        };
        let numerator: u32 = num.parse().map_err(|_| Error::invalid_rational(s))?;
        let denominator: u32 = den.parse().map_err(|_| Error::invalid_rational(s))?;
        if denominator == 0 {
            return Err(Error::invalid_rational(s));
        }
        Ok(Self::new(numerator, denominator))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.numerator, self.denominator)
    }
}

/// Screen aspect ratio of a picture track.
///
/// SMPTE writes a rational (`1998 1080`); Interop commonly writes a decimal
/// (`1.85`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScreenAspectRatio {
    Rational(Rational),
    Decimal(f64),
}

impl ScreenAspectRatio {
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Rational(r) => r.as_f64(),
            Self::Decimal(d) => *d,
        }
    }
}

/// Kind of content a composition carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Feature,
    Trailer,
    Teaser,
    Test,
    Rating,
    Advertisement,
    Short,
    Transitional,
    Psa,
    Policy,
    /// Any value outside the registered set, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

impl ContentKind {
    /// Parse a `ContentKind` element value. Never fails: unknown kinds are
    /// preserved as [`ContentKind::Other`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "feature" => Self::Feature,
            "trailer" => Self::Trailer,
            "teaser" => Self::Teaser,
            "test" => Self::Test,
            "rating" => Self::Rating,
            "advertisement" => Self::Advertisement,
            "short" => Self::Short,
            "transitional" => Self::Transitional,
            "psa" => Self::Psa,
            "policy" => Self::Policy,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feature => write!(f, "feature"),
            Self::Trailer => write!(f, "trailer"),
            Self::Teaser => write!(f, "teaser"),
            Self::Test => write!(f, "test"),
            Self::Rating => write!(f, "rating"),
            Self::Advertisement => write!(f, "advertisement"),
            Self::Short => write!(f, "short"),
            Self::Transitional => write!(f, "transitional"),
            Self::Psa => write!(f, "psa"),
            Self::Policy => write!(f, "policy"),
            Self::Other(other) => write!(f, "{}", other),
        }
    }
}
