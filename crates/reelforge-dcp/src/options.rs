//! Knobs for the readers and the aggregator.

use reelforge_xml::SchemaCheck;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::hash::DEFAULT_CHUNK_SIZE;

/// What to do when an ASSETMAP or PKL lists the same id twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail the parse.
    #[default]
    Reject,
    /// Keep the later entry and log a warning.
    LastWins,
}

/// What to do when a CPL asset id is not in the asset map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Fail the CPL parse, naming reel, slot and id.
    #[default]
    Strict,
    /// Leave the asset unresolved and record it on the CPL.
    Lenient,
}

/// Options shared by the ASSETMAP, PKL and CPL readers.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Schema check run before field extraction. Skipped when `None`.
    pub schema: Option<SchemaCheck>,
    pub duplicates: DuplicatePolicy,
    pub resolution: ResolutionPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashOptions {
    pub chunk_size: usize,
    /// Hash independent files on the rayon pool.
    pub parallel: bool,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: true,
        }
    }
}

/// Options for [`crate::Dcp::open_with`].
#[derive(Debug, Clone)]
pub struct OpenOptions {
    pub parse: ParseOptions,
    pub hashing: HashOptions,
    /// Stop at the first failure instead of collecting them.
    pub fail_fast: bool,
    /// Parse CPLs on the rayon pool.
    pub parallel: bool,
    /// Deadline for manifest discovery.
    pub walk_timeout: Option<Duration>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            hashing: HashOptions::default(),
            fail_fast: false,
            parallel: true,
            walk_timeout: None,
        }
    }
}
