use reelforge_dcp::hash::DEFAULT_CHUNK_SIZE;
use reelforge_dcp::{DuplicatePolicy, ResolutionPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub performance: PerformanceConfig,

    #[serde(default)]
    pub staging: StagingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Directory holding `interop/` and `smpte/` XSD sets. Schema checks are
    /// skipped when unset.
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,

    /// Stop at the first failure instead of collecting them
    #[serde(default)]
    pub fail_fast: bool,

    /// What to do with CPL assets missing from the asset map
    #[serde(default)]
    pub resolution: ResolutionPolicy,

    /// What to do with ids listed twice in an ASSETMAP or PKL
    #[serde(default)]
    pub duplicate_ids: DuplicatePolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PerformanceConfig {
    /// Hash files and parse CPLs on a thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Read buffer size for hashing, in bytes
    #[serde(default = "default_hash_chunk_size")]
    pub hash_chunk_size: usize,

    /// Give up discovering manifests after this many seconds
    #[serde(default)]
    pub walk_timeout_secs: Option<u64>,
}

fn default_parallel() -> bool {
    true
}

fn default_hash_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            hash_chunk_size: default_hash_chunk_size(),
            walk_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StagingConfig {
    /// Where `stage` links compositions to
    #[serde(default)]
    pub ingest_dir: Option<PathBuf>,
}
