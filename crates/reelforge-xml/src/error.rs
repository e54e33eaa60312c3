//! Error types for reelforge-xml.

use reelforge_common::ErrorKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for reelforge-xml operations.
pub type Result<T> = std::result::Result<T, XmlError>;

/// Failure to load a document into an element tree.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The content is not well-formed XML.
    #[error("Malformed XML in {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// The content parsed but contains no root element.
    #[error("No root element in {path}")]
    Empty { path: PathBuf },
}

impl XmlError {
    /// Create a malformed-document error.
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Path of the offending document.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Malformed { path, .. } | Self::Empty { path } => path,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedDocument
    }
}

/// A single schema breach found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Slash-separated element path, e.g. `/AssetMap/AssetList`.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of a failed schema validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document does not conform. Recoverable: skip the document.
    #[error("{path} failed schema validation: {}", format_violations(.violations))]
    Invalid {
        path: PathBuf,
        violations: Vec<Violation>,
    },

    /// The schema itself could not be loaded. Fatal: the setup is broken.
    #[error("Schema {schema} could not be loaded: {message}")]
    SchemaUnreadable { schema: PathBuf, message: String },
}

impl SchemaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid { .. } => ErrorKind::MalformedDocument,
            Self::SchemaUnreadable { .. } => ErrorKind::FatalConfiguration,
        }
    }

    /// Violations carried by an [`SchemaError::Invalid`] error.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid { violations, .. } => violations,
            Self::SchemaUnreadable { .. } => &[],
        }
    }
}

impl From<XmlError> for SchemaError {
    /// A document that does not even parse is reported as invalid.
    fn from(err: XmlError) -> Self {
        let path = err.path().to_path_buf();
        Self::Invalid {
            path,
            violations: vec![Violation {
                path: "/".to_string(),
                message: err.to_string(),
            }],
        }
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
