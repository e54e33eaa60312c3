//! Common error types used throughout reelforge.
//!
//! Every reader in the workspace reports failures with its own error enum, but
//! all of them classify into one [`ErrorKind`] so callers can decide whether to
//! skip a document, retry with a fixed setup, or give up.

use serde::Serialize;
use std::fmt;

/// Classification shared by every reelforge error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// XML not well-formed, or rejected by schema validation.
    MalformedDocument,
    /// A mandatory element is absent from an otherwise well-formed document.
    MissingRequiredField,
    /// An id in one document has no counterpart in the document it joins.
    ReferenceResolutionFailure,
    /// Content hash mismatch or a manifest-declared file missing on disk.
    IntegrityFailure,
    /// Broken setup: unreadable schema, manifests absent from a DCP directory.
    FatalConfiguration,
}

impl ErrorKind {
    /// Whether the caller can skip the offending item and carry on.
    pub fn is_recoverable(self) -> bool {
        !matches!(self, Self::FatalConfiguration)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDocument => write!(f, "malformed document"),
            Self::MissingRequiredField => write!(f, "missing required field"),
            Self::ReferenceResolutionFailure => write!(f, "reference resolution failure"),
            Self::IntegrityFailure => write!(f, "integrity failure"),
            Self::FatalConfiguration => write!(f, "fatal configuration"),
        }
    }
}

/// Error for the value parsers in this crate (ids, rationals, dates).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The value is not a URN with a usable trailing identifier.
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// The value is not an `"<numerator> <denominator>"` pair.
    #[error("Invalid rational: {0}")]
    InvalidRational(String),

    /// The value is not an ISO-8601 timestamp.
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl Error {
    /// Create a new InvalidId error.
    pub fn invalid_id<S: Into<String>>(msg: S) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Create a new InvalidRational error.
    pub fn invalid_rational<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRational(msg.into())
    }

    /// Create a new InvalidDate error.
    pub fn invalid_date<S: Into<String>>(msg: S) -> Self {
        Self::InvalidDate(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
