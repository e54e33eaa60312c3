//! Integration tests for opening whole packages.

mod common;

use common::{DcpBuilder, Flavor, FEATURE_CPL, PICTURE_ID, SOUND_ID};
use reelforge_common::{AssetId, ContentKind, Dialect, ErrorKind};
use reelforge_dcp::{
    AssetMapError, AssetKind, Dcp, DcpError, IntegrityFailure, OpenOptions,
};
use std::time::Duration;

const TRAILER_CPL: &str = "77777777-7777-7777-7777-777777777777";
const BROKEN_CPL: &str = "88888888-8888-8888-8888-888888888888";

fn fail_fast() -> OpenOptions {
    OpenOptions {
        fail_fast: true,
        ..OpenOptions::default()
    }
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[test]
fn test_smpte_package_opens() {
    let fixture = DcpBuilder::new(Flavor::Smpte).build();
    let dcp = Dcp::open(fixture.root()).unwrap();

    assert_eq!(dcp.assetmap.len(), 4);
    assert_eq!(dcp.pkl.len(), 3);
    assert!(dcp.cpl_failures.is_empty());
    assert_eq!(dcp.cpls.len(), 1);

    let cpl = dcp.cpl(&AssetId::new(FEATURE_CPL)).unwrap();
    assert_eq!(cpl.dialect, Dialect::Smpte);
    assert_eq!(cpl.title, "FEATURE_FTR_F_EN-XX_51_2K_20130528");
    assert_eq!(cpl.content_kind, ContentKind::Feature);
    assert_eq!(cpl.source, fixture.cpl_path(FEATURE_CPL));
    assert_eq!(cpl.reels.len(), 1);

    let reel = &cpl.reels[0];
    assert_eq!(reel.picture.kind, AssetKind::Picture);
    assert_eq!(reel.picture.id, AssetId::new(PICTURE_ID));
    assert_eq!(reel.picture.resolved_path, Some(fixture.path("picture.mxf")));
    assert_eq!(reel.sound.id, AssetId::new(SOUND_ID));
    assert_eq!(reel.sound.resolved_path, Some(fixture.path("sound.mxf")));
    assert!(reel.subtitle.is_none());
    assert!(cpl.is_fully_resolved());
}

#[test]
fn test_interop_package_matches_smpte_model() {
    let smpte_fixture = DcpBuilder::new(Flavor::Smpte).build();
    let interop_fixture = DcpBuilder::new(Flavor::Interop).build();
    let smpte = Dcp::open(smpte_fixture.root()).unwrap();
    let interop = Dcp::open(interop_fixture.root()).unwrap();

    let id = AssetId::new(FEATURE_CPL);
    let (a, b) = (smpte.cpl(&id).unwrap(), interop.cpl(&id).unwrap());
    assert_eq!(b.dialect, Dialect::Interop);
    assert_eq!(a.title, b.title);
    assert_eq!(a.total_duration(), b.total_duration());
    assert_eq!(a.reels[0].picture.id, b.reels[0].picture.id);
    assert_eq!(a.reels[0].sound.id, b.reels[0].sound.id);
}

#[test]
fn test_report_serializes() {
    let fixture = DcpBuilder::new(Flavor::Smpte)
        .playlist(TRAILER_CPL, "TRAILER_TLR_F_EN-XX_51_2K")
        .build();
    let dcp = Dcp::open(fixture.root()).unwrap();
    let report = dcp.report();

    assert_eq!(report.assets, 5);
    assert_eq!(report.cpls.len(), 2);
    assert_eq!(report.cpls[0].duration, 240);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["pkl_id"], common::PKL_ID);
    assert_eq!(json["cpls"][0]["dialect"], "smpte");
    assert_eq!(json["cpls"][1]["id"], TRAILER_CPL);
    assert!(json["cpl_failures"].as_array().unwrap().is_empty());
}

#[test]
fn test_sequential_and_parallel_open_agree() {
    let fixture = DcpBuilder::new(Flavor::Interop)
        .playlist(TRAILER_CPL, "TRAILER")
        .build();
    let sequential = OpenOptions {
        parallel: false,
        hashing: reelforge_dcp::HashOptions {
            parallel: false,
            ..Default::default()
        },
        ..OpenOptions::default()
    };

    let a = Dcp::open_with(fixture.root(), &sequential).unwrap();
    let b = Dcp::open(fixture.root()).unwrap();
    assert_eq!(
        a.cpls.keys().collect::<Vec<_>>(),
        b.cpls.keys().collect::<Vec<_>>()
    );
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[test]
fn test_missing_assetmap_is_fatal() {
    let fixture = DcpBuilder::new(Flavor::Smpte).build();
    fixture.remove(fixture.assetmap_name);

    let err = Dcp::open(fixture.root()).unwrap_err();
    assert!(matches!(
        err,
        DcpError::ManifestMissing {
            manifest: "ASSETMAP",
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
    assert!(!err.kind().is_recoverable());
}

#[test]
fn test_packing_list_found_through_assetmap_flag() {
    let fixture = DcpBuilder::new(Flavor::Interop)
        .pkl_name("packing_list.xml")
        .build();

    let dcp = Dcp::open(fixture.root()).unwrap();
    assert_eq!(dcp.pkl.source, fixture.path("packing_list.xml"));
    assert_eq!(dcp.cpls.len(), 1);
}

#[test]
fn test_walk_deadline_is_fatal() {
    let fixture = DcpBuilder::new(Flavor::Smpte).build();
    let options = OpenOptions {
        walk_timeout: Some(Duration::ZERO),
        ..OpenOptions::default()
    };

    let err = Dcp::open_with(fixture.root(), &options).unwrap_err();
    assert!(matches!(err, DcpError::WalkDeadline { .. }));
    assert_eq!(err.kind(), ErrorKind::FatalConfiguration);
}

#[test]
fn test_missing_root_is_a_walk_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Dcp::open(&dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, DcpError::Walk { .. }));
}

// ---------------------------------------------------------------------------
// Integrity
// ---------------------------------------------------------------------------

#[test]
fn test_integrity_failures_are_collected() {
    let fixture = DcpBuilder::new(Flavor::Smpte).build();
    fixture.remove("sound.mxf");
    fixture.corrupt(&common::cpl_file_name(FEATURE_CPL));

    let err = Dcp::open(fixture.root()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IntegrityFailure);

    let failures = err.failures();
    assert_eq!(failures.len(), 2, "{failures:?}");
    assert!(failures.iter().any(|f| matches!(
        f,
        IntegrityFailure::MissingFile { path, .. } if *path == fixture.path("sound.mxf")
    )));
    assert!(failures.iter().any(|f| matches!(
        f,
        IntegrityFailure::HashMismatch { path, .. } if *path == fixture.cpl_path(FEATURE_CPL)
    )));
}

#[test]
fn test_fail_fast_stops_at_first_failure() {
    let fixture = DcpBuilder::new(Flavor::Smpte).build();
    fixture.remove("sound.mxf");
    fixture.corrupt(&common::cpl_file_name(FEATURE_CPL));

    let err = Dcp::open_with(fixture.root(), &fail_fast()).unwrap_err();
    assert!(matches!(
        err,
        DcpError::AssetMap(AssetMapError::Integrity(IntegrityFailure::MissingFile { .. }))
    ));
    assert_eq!(err.kind(), ErrorKind::IntegrityFailure);
}

#[test]
fn test_essence_hashes_are_not_checked() {
    // The fixture declares a bogus hash for both essence files.
    let fixture = DcpBuilder::new(Flavor::Interop).build();
    std::fs::write(fixture.path("picture.mxf"), b"re-encoded picture").unwrap();

    assert!(Dcp::open(fixture.root()).is_ok());
}

// ---------------------------------------------------------------------------
// Playlist failures
// ---------------------------------------------------------------------------

#[test]
fn test_failed_playlist_does_not_block_siblings() {
    let fixture = DcpBuilder::new(Flavor::Smpte)
        .playlist_without_sound(BROKEN_CPL, "BROKEN")
        .build();

    let dcp = Dcp::open(fixture.root()).unwrap();
    assert_eq!(dcp.cpls.len(), 1);
    assert!(dcp.cpl(&AssetId::new(FEATURE_CPL)).is_some());

    assert_eq!(dcp.cpl_failures.len(), 1);
    let failure = &dcp.cpl_failures[0];
    assert_eq!(failure.id, AssetId::new(BROKEN_CPL));
    assert_eq!(failure.error.kind(), ErrorKind::MissingRequiredField);

    let report = dcp.report();
    assert_eq!(report.cpl_failures.len(), 1);
    assert_eq!(report.cpl_failures[0].kind, ErrorKind::MissingRequiredField);
}

#[test]
fn test_failed_playlist_aborts_when_fail_fast() {
    let fixture = DcpBuilder::new(Flavor::Smpte)
        .playlist_without_sound(BROKEN_CPL, "BROKEN")
        .build();

    let err = Dcp::open_with(fixture.root(), &fail_fast()).unwrap_err();
    match err {
        DcpError::Cpl { id, source } => {
            assert_eq!(id, AssetId::new(BROKEN_CPL));
            assert_eq!(source.kind(), ErrorKind::MissingRequiredField);
        }
        other => panic!("expected a CPL error, got {other:?}"),
    }
}
