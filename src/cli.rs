use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelforge")]
#[command(author, version, about = "Digital Cinema Package ingest and verification tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a DCP and check its manifests, files and hashes
    Verify {
        /// DCP directory
        #[arg(required = true)]
        dcp: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open a DCP and display its compositions
    Inspect {
        /// DCP directory
        #[arg(required = true)]
        dcp: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display the public metadata of a KDM or a KDM bundle
    Kdm {
        /// KDM file, or a bundle `.tar` with a CATALOG
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Hard-link a composition and its assets into the ingest directory
    Stage {
        /// DCP directory
        #[arg(required = true)]
        dcp: PathBuf,

        /// Id of the composition playlist (URN or bare UUID)
        #[arg(required = true)]
        cpl_id: String,

        /// Ingest directory (overrides the config file)
        #[arg(long)]
        ingest_dir: Option<PathBuf>,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
