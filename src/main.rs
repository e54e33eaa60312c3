mod cli;

use reelforge::config;
use reelforge_common::AssetId;
use reelforge_dcp::{Dcp, DcpError, IngestStager, Kdm, KdmBundle};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelforge=trace,reelforge_dcp=trace,reelforge_xml=debug,reelforge_common=debug"
                .to_string()
        } else {
            "reelforge=info,reelforge_dcp=info,reelforge_xml=warn".to_string()
        }
    });

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Verify { dcp, json } => verify_dcp(&dcp, cli.config.as_deref(), json),
        Commands::Inspect { dcp, json } => inspect_dcp(&dcp, cli.config.as_deref(), json),
        Commands::Kdm { file, json } => show_kdm(&file, json),
        Commands::Stage {
            dcp,
            cpl_id,
            ingest_dir,
        } => stage_cpl(&dcp, &cpl_id, ingest_dir.as_deref(), cli.config.as_deref()),
        Commands::ValidateConfig {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_dcp(dir: &Path, config_path: Option<&Path>) -> Result<std::result::Result<Dcp, DcpError>> {
    let config = config::load_config_or_default(config_path)?;

    if !dir.is_dir() {
        anyhow::bail!("DCP directory does not exist: {:?}", dir);
    }

    Ok(Dcp::open_with(dir, &config.open_options()))
}

fn verify_dcp(dir: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    tracing::info!("Verifying DCP: {:?}", dir);

    match open_dcp(dir, config_path)? {
        Ok(dcp) => {
            let report = dcp.report();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("DCP: {}", dcp.root.display());
                println!("Assets: {}", report.assets);
                println!("Compositions: {}", report.cpls.len());
                for cpl in &report.cpls {
                    println!("  ✓ {} ({})", cpl.title, cpl.id);
                }
                for failure in &report.cpl_failures {
                    println!("  ✗ {} [{}]: {}", failure.id, failure.kind, failure.message);
                }
            }

            if !report.cpl_failures.is_empty() {
                anyhow::bail!(
                    "{} composition playlist(s) failed to parse",
                    report.cpl_failures.len()
                );
            }
            if !json {
                println!("\n✓ DCP is valid");
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let failures = serde_json::to_value(e.failures())?;
                let value = serde_json::json!({
                    "root": dir,
                    "kind": e.kind(),
                    "error": e.to_string(),
                    "failures": failures,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("DCP: {}", dir.display());
                println!("✗ {} ({})", e, e.kind());
                for failure in e.failures() {
                    println!("  - {}", failure);
                }
            }
            Err(e).context("DCP verification failed")
        }
    }
}

fn inspect_dcp(dir: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let dcp = open_dcp(dir, config_path)??;

    if json {
        let cpls: Vec<_> = dcp.cpls.values().collect();
        let value = serde_json::json!({
            "assetmap": dcp.assetmap,
            "pkl": dcp.pkl,
            "cpls": cpls,
            "cpl_failures": dcp.report().cpl_failures,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("DCP: {}", dcp.root.display());
    println!("Asset map: {} ({} assets)", dcp.assetmap.id, dcp.assetmap.len());
    println!("Packing list: {} ({} entries)", dcp.pkl.id, dcp.pkl.len());

    for cpl in dcp.cpls.values() {
        println!("\nComposition: {}", cpl.title);
        println!("  Id: {}", cpl.id);
        println!("  Dialect: {}", cpl.dialect);
        println!("  Kind: {}", cpl.content_kind);
        println!("  Issued: {}", cpl.issue_date.to_rfc3339());
        if let Some(ref version) = cpl.content_version {
            if let Some(ref label) = version.label {
                println!("  Version: {}", label);
            }
        }
        if let Some(ref metadata) = cpl.metadata {
            if let Some(ref sound) = metadata.main_sound_configuration {
                println!("  Sound configuration: {}", sound);
            }
        }
        println!("  Duration: {} edit units", cpl.total_duration());

        println!("  Reels: {}", cpl.reels.len());
        for (i, reel) in cpl.reels.iter().enumerate() {
            println!("    [{}] {}", i, reel.id);
            for asset in reel.iter() {
                print!(
                    "        {:?} {} {}/{}",
                    asset.kind, asset.id, asset.duration, asset.intrinsic_duration
                );
                match asset.resolved_path {
                    Some(ref path) => print!(" - {}", path.display()),
                    None => print!(" - unresolved"),
                }
                if asset.is_encrypted() {
                    print!(" [encrypted]");
                }
                println!();
            }
        }
    }

    for failure in &dcp.cpl_failures {
        println!("\n✗ Composition {}: {}", failure.id, failure.error);
    }

    Ok(())
}

fn show_kdm(file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let is_bundle = file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tar"));
    if is_bundle {
        return show_kdm_bundle(file, json);
    }

    let kdm = Kdm::from_file(file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&kdm)?);
        return Ok(());
    }

    print_kdm(&kdm);
    Ok(())
}

fn show_kdm_bundle(file: &Path, json: bool) -> Result<()> {
    let bundle = KdmBundle::from_tarfile(file)
        .with_context(|| format!("Failed to read KDM bundle {:?}", file))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
        return Ok(());
    }

    println!("Bundle: {}", bundle.catalog.id);
    if let Some(ref creator) = bundle.catalog.creator {
        println!("Creator: {}", creator);
    }
    println!("KDMs: {}", bundle.kdms.len());
    for kdm in &bundle.kdms {
        println!();
        print_kdm(kdm);
    }

    Ok(())
}

fn print_kdm(kdm: &Kdm) {
    println!("KDM: {}", kdm.id);
    println!("Dialect: {}", kdm.dialect);
    if let Some(ref title) = kdm.content_title_text {
        println!("Title: {}", title);
    }
    println!("Composition: {}", kdm.cpl_id);
    if let Some(ref recipient) = kdm.recipient {
        println!("Recipient: {}", recipient);
    }
    println!(
        "Valid: {} to {}",
        kdm.not_valid_before.to_rfc3339(),
        kdm.not_valid_after.to_rfc3339()
    );
    println!("Keys: {}", kdm.keys.len());
    for key in &kdm.keys {
        println!(
            "  {} {}",
            key.key_type.as_deref().unwrap_or("?"),
            key.key_id
        );
    }
}

fn stage_cpl(
    dir: &Path,
    cpl_id: &str,
    ingest_dir: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let ingest_dir = ingest_dir
        .map(Path::to_path_buf)
        .or(config.staging.ingest_dir.clone())
        .context("No ingest directory: pass --ingest-dir or set staging.ingest_dir")?;

    let id = parse_id(cpl_id)?;
    let dcp = Dcp::open_with(dir, &config.open_options())?;
    let staged = IngestStager::new(&ingest_dir).stage(&dcp, &id)?;

    println!("Staged {} file(s) into {}", staged.len(), ingest_dir.join(id.as_str()).display());
    for path in &staged {
        println!("  {}", path.display());
    }

    Ok(())
}

/// Accept either a URN or a bare id on the command line.
fn parse_id(value: &str) -> Result<AssetId> {
    if value.trim_start().to_ascii_lowercase().starts_with("urn:") {
        Ok(AssetId::from_urn(value)?)
    } else {
        Ok(AssetId::new(value))
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            println!("Default config:");
            print_config(&config::Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &config::Config) {
    let validation = &config.validation;
    match validation.schema_dir {
        Some(ref dir) => println!("  Schema dir: {}", dir.display()),
        None => println!("  Schema dir: none (schema checks skipped)"),
    }
    println!("  Fail fast: {}", validation.fail_fast);
    println!("  Resolution: {:?}", validation.resolution);
    println!("  Duplicate ids: {:?}", validation.duplicate_ids);
    println!("  Parallel: {}", config.performance.parallel);
    println!("  Hash chunk size: {} bytes", config.performance.hash_chunk_size);
    if let Some(ref dir) = config.staging.ingest_dir {
        println!("  Ingest dir: {}", dir.display());
    }
}
