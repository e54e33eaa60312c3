mod types;

pub use types::*;

use anyhow::{Context, Result};
use reelforge_dcp::{HashOptions, OpenOptions, ParseOptions};
use reelforge_xml::SchemaCheck;
use std::path::Path;
use std::time::Duration;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./reelforge.toml",
        "~/.config/reelforge/config.toml",
        "/etc/reelforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.performance.hash_chunk_size == 0 {
        anyhow::bail!("performance.hash_chunk_size cannot be 0");
    }

    if let Some(dir) = &config.validation.schema_dir {
        if !dir.is_dir() {
            tracing::warn!("Schema directory does not exist: {:?}", dir);
        }
    }

    if let Some(dir) = &config.staging.ingest_dir {
        if !dir.is_dir() {
            tracing::warn!("Ingest directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}

impl Config {
    /// Reader and aggregator options for this configuration.
    pub fn open_options(&self) -> OpenOptions {
        let validation = &self.validation;
        let performance = &self.performance;

        OpenOptions {
            parse: ParseOptions {
                schema: validation.schema_dir.as_deref().map(SchemaCheck::structural),
                duplicates: validation.duplicate_ids,
                resolution: validation.resolution,
            },
            hashing: HashOptions {
                chunk_size: performance.hash_chunk_size,
                parallel: performance.parallel,
            },
            fail_fast: validation.fail_fast,
            parallel: performance.parallel,
            walk_timeout: performance.walk_timeout_secs.map(Duration::from_secs),
        }
    }
}
