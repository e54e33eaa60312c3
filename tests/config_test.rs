//! Integration tests for configuration loading and how it drives opening a DCP.

mod common;

use reelforge::config::{load_config, load_config_or_default, Config};
use reelforge_common::ErrorKind;
use reelforge_dcp::{Dcp, DcpError, ResolutionPolicy};
use std::fs;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn explicit_path_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[validation]\nresolution = \"lenient\"\n").unwrap();

    let config = load_config_or_default(Some(&path)).unwrap();
    assert_eq!(config.validation.resolution, ResolutionPolicy::Lenient);
}

#[test]
fn malformed_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[validation\nfail_fast = ").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

// ---------------------------------------------------------------------------
// Driving the aggregator
// ---------------------------------------------------------------------------

#[test]
fn default_config_opens_fixture() {
    let dir = tempfile::tempdir().unwrap();
    common::write_dcp(dir.path());

    let dcp = Dcp::open_with(dir.path(), &Config::default().open_options()).unwrap();
    assert_eq!(dcp.cpls.len(), 1);
    assert_eq!(dcp.report().cpls[0].title, common::CPL_TITLE);
}

#[test]
fn fail_fast_config_reports_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    common::write_dcp(dir.path());
    common::tamper_cpl(dir.path());
    fs::remove_file(dir.path().join("sound.mxf")).unwrap();

    let mut config = Config::default();
    let collected = Dcp::open_with(dir.path(), &config.open_options()).unwrap_err();
    assert_eq!(collected.failures().len(), 2);

    config.validation.fail_fast = true;
    let first = Dcp::open_with(dir.path(), &config.open_options()).unwrap_err();
    assert!(matches!(first, DcpError::AssetMap(_)));
    assert_eq!(first.kind(), ErrorKind::IntegrityFailure);
}

#[test]
fn sequential_config_opens_fixture() {
    let dir = tempfile::tempdir().unwrap();
    common::write_dcp(dir.path());
    let path = dir.path().join("reelforge.toml");
    fs::write(
        &path,
        "[performance]\nparallel = false\nhash_chunk_size = 7\nwalk_timeout_secs = 60\n",
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    let dcp = Dcp::open_with(dir.path(), &config.open_options()).unwrap();
    assert_eq!(dcp.cpls.len(), 1);
}

#[test]
fn unreadable_schema_dir_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    common::write_dcp(dir.path());

    let mut config = Config::default();
    config.validation.schema_dir = Some(dir.path().join("no-schemas"));

    let err = Dcp::open_with(dir.path(), &config.open_options()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
}
