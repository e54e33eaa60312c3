//! Shared fixtures for the root integration tests.
//!
//! [`write_dcp`] lays down a one-composition SMPTE package with correct
//! packing list hashes; [`write_kdm`] writes a KDM for that composition and
//! [`write_kdm_bundle`] wraps the same KDM in a bundle tar.

#![allow(dead_code)]

use reelforge_dcp::hash::hash_file;
use std::fs;
use std::path::{Path, PathBuf};

pub const CPL_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const CPL_TITLE: &str = "FEATURE_FTR_F_EN-XX_51_2K_20130528_SMPTE";
pub const CPL_FILE: &str = "cpl_feature.xml";
pub const PICTURE_ID: &str = "22222222-2222-2222-2222-222222222222";
pub const SOUND_ID: &str = "33333333-3333-3333-3333-333333333333";
pub const PKL_ID: &str = "44444444-4444-4444-4444-444444444444";
pub const BUNDLE_ID: &str = "dddddddd-dddd-dddd-dddd-dddddddddddd";

fn cpl_xml() -> String {
    let track = |tag: &str, id: &str, extra: &str| {
        format!(
            "<{tag}><Id>urn:uuid:{id}</Id><EditRate>24 1</EditRate>\
             <IntrinsicDuration>480</IntrinsicDuration><EntryPoint>0</EntryPoint>\
             <Duration>480</Duration>{extra}</{tag}>"
        )
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<CompositionPlaylist xmlns="http://www.smpte-ra.org/schemas/429-7/2006/CPL">
  <Id>urn:uuid:{CPL_ID}</Id>
  <AnnotationText>{CPL_TITLE}</AnnotationText>
  <IssueDate>2013-05-28T10:47:08+00:00</IssueDate>
  <Issuer>Lab</Issuer>
  <Creator>reelforge fixtures</Creator>
  <ContentTitleText>{CPL_TITLE}</ContentTitleText>
  <ContentKind>feature</ContentKind>
  <ContentVersion><Id>urn:uri:{CPL_ID}_2013-05-28T10:47:08+00:00</Id><LabelText>v1</LabelText></ContentVersion>
  <ReelList>
    <Reel>
      <Id>urn:uuid:66666666-6666-6666-6666-666666666666</Id>
      <AssetList>{picture}{sound}</AssetList>
    </Reel>
  </ReelList>
</CompositionPlaylist>"#,
        picture = track(
            "MainPicture",
            PICTURE_ID,
            "<FrameRate>24 1</FrameRate><ScreenAspectRatio>1998 1080</ScreenAspectRatio>"
        ),
        sound = track("MainSound", SOUND_ID, ""),
    )
}

/// Write a verifiable SMPTE package into `root`.
pub fn write_dcp(root: &Path) {
    fs::create_dir_all(root).unwrap();
    fs::write(root.join("picture.mxf"), b"picture essence").unwrap();
    fs::write(root.join("sound.mxf"), b"sound essence").unwrap();
    fs::write(root.join(CPL_FILE), cpl_xml()).unwrap();
    let cpl_hash = hash_file(&root.join(CPL_FILE)).unwrap();

    fs::write(
        root.join("feature_pkl.xml"),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<PackingList xmlns="http://www.smpte-ra.org/schemas/429-8/2007/PKL">
  <Id>urn:uuid:{PKL_ID}</Id>
  <IssueDate>2013-05-28T10:47:08+00:00</IssueDate>
  <Issuer>Lab</Issuer>
  <Creator>reelforge fixtures</Creator>
  <AssetList>
    <Asset><Id>urn:uuid:{CPL_ID}</Id><Hash>{cpl_hash}</Hash><Size>1</Size><Type>text/xml</Type></Asset>
    <Asset><Id>urn:uuid:{PICTURE_ID}</Id><Hash>AAAAAAAAAAAAAAAAAAAAAAAAAAA=</Hash><Size>15</Size><Type>application/mxf</Type></Asset>
    <Asset><Id>urn:uuid:{SOUND_ID}</Id><Hash>AAAAAAAAAAAAAAAAAAAAAAAAAAA=</Hash><Size>13</Size><Type>application/mxf</Type></Asset>
  </AssetList>
</PackingList>"#
        ),
    )
    .unwrap();

    let asset = |id: &str, path: &str| {
        format!(
            "<Asset><Id>urn:uuid:{id}</Id><ChunkList><Chunk><Path>{path}</Path></Chunk></ChunkList></Asset>"
        )
    };
    fs::write(
        root.join("ASSETMAP.xml"),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<AssetMap xmlns="http://www.smpte-ra.org/schemas/429-9/2007/AM">
  <Id>urn:uuid:55555555-5555-5555-5555-555555555555</Id>
  <Creator>reelforge fixtures</Creator>
  <VolumeCount>1</VolumeCount>
  <IssueDate>2013-05-28T10:47:08+00:00</IssueDate>
  <Issuer>Lab</Issuer>
  <AssetList>
    <Asset><Id>urn:uuid:{PKL_ID}</Id><PackingList>true</PackingList><ChunkList><Chunk><Path>feature_pkl.xml</Path></Chunk></ChunkList></Asset>
    {}{}{}
  </AssetList>
</AssetMap>"#,
            asset(CPL_ID, CPL_FILE),
            asset(PICTURE_ID, "picture.mxf"),
            asset(SOUND_ID, "sound.mxf"),
        ),
    )
    .unwrap();
}

/// Replace the playlist contents without touching the declared hash.
pub fn tamper_cpl(root: &Path) {
    let path = root.join(CPL_FILE);
    let xml = fs::read_to_string(&path).unwrap().replace("v1", "v2");
    fs::write(path, xml).unwrap();
}

/// Write an SMPTE KDM for the fixture composition and return its path.
pub fn write_kdm(dir: &Path) -> PathBuf {
    let path = dir.join("kdm.xml");
    fs::write(&path, kdm_xml()).unwrap();
    path
}

/// Write a one-KDM bundle tar for the fixture composition and return its path.
pub fn write_kdm_bundle(dir: &Path) -> PathBuf {
    let catalog = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<CATALOG xmlns="http://www.smpte-ra.org/430-9/2006/KDM-BUNDLE">
  <Id>urn:uuid:{BUNDLE_ID}</Id>
  <Creator>reelforge fixtures</Creator>
  <KDMFileList>
    <KDMFile>
      <CompositionPlaylistId>urn:uuid:{CPL_ID}</CompositionPlaylistId>
      <FilePath>feature.xml</FilePath>
    </KDMFile>
  </KDMFileList>
</CATALOG>"#
    );

    let path = dir.join("bundle.tar");
    let mut builder = tar::Builder::new(fs::File::create(&path).unwrap());
    for (name, data) in [("CATALOG", catalog), ("CONTENT/feature.xml", kdm_xml())] {
        let mut header = tar::Header::new_gnu();
        header.set_path(name).unwrap();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append(&header, data.as_bytes()).unwrap();
    }
    builder.finish().unwrap();
    path
}

fn kdm_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<DCinemaSecurityMessage xmlns="http://www.smpte-ra.org/schemas/430-3/2006/ETM"
    xmlns:enc="http://www.w3.org/2001/04/xmlenc#">
  <AuthenticatedPublic>
    <MessageId>urn:uuid:99999999-9999-9999-9999-999999999999</MessageId>
    <AnnotationText>Feature KDM</AnnotationText>
    <IssueDate>2013-05-28T10:47:08+00:00</IssueDate>
    <RequiredExtensions>
      <KDMRequiredExtensions xmlns="http://www.smpte-ra.org/schemas/430-1/2006/KDM">
        <Recipient><X509SubjectName>CN=SM.ws-1,O=Cinema</X509SubjectName></Recipient>
        <CompositionPlaylistId>urn:uuid:{CPL_ID}</CompositionPlaylistId>
        <ContentTitleText>{CPL_TITLE}</ContentTitleText>
        <ContentKeysNotValidBefore>2013-06-01T00:00:00+00:00</ContentKeysNotValidBefore>
        <ContentKeysNotValidAfter>2013-06-30T23:59:59+00:00</ContentKeysNotValidAfter>
        <KeyIdList>
          <TypedKeyId><KeyType>MDIK</KeyType><KeyId>urn:uuid:aaaaaaaa-aaaa-aaaa-aaaa-aaaaaaaaaaaa</KeyId></TypedKeyId>
        </KeyIdList>
      </KDMRequiredExtensions>
    </RequiredExtensions>
  </AuthenticatedPublic>
  <AuthenticatedPrivate>
    <enc:EncryptedKey><enc:CipherData><enc:CipherValue>c2VjcmV0</enc:CipherValue></enc:CipherData></enc:EncryptedKey>
  </AuthenticatedPrivate>
</DCinemaSecurityMessage>"#
    )
}
