//! DCP fixture builder for integration tests.
//!
//! Writes a small but complete package (asset map, packing list, playlists
//! and stub essence) into a temp directory. Packing list hashes are computed
//! from the written files, so the package verifies until a test breaks it.

#![allow(dead_code)]

use reelforge_dcp::hash::hash_file;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const FEATURE_CPL: &str = "11111111-1111-1111-1111-111111111111";
pub const PICTURE_ID: &str = "22222222-2222-2222-2222-222222222222";
pub const SOUND_ID: &str = "33333333-3333-3333-3333-333333333333";
pub const PKL_ID: &str = "44444444-4444-4444-4444-444444444444";
pub const ASSETMAP_ID: &str = "55555555-5555-5555-5555-555555555555";

/// Declared for essence; never checked since `.mxf` hashes are skipped.
const BOGUS_ESSENCE_HASH: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAA=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Smpte,
    Interop,
}

impl Flavor {
    fn assetmap_ns(self) -> &'static str {
        match self {
            Self::Smpte => "http://www.smpte-ra.org/schemas/429-9/2007/AM",
            Self::Interop => "http://www.digicine.com/PROTO-ASDCP-AM-20040311#",
        }
    }

    fn pkl_ns(self) -> &'static str {
        match self {
            Self::Smpte => "http://www.smpte-ra.org/schemas/429-8/2007/PKL",
            Self::Interop => "http://www.digicine.com/PROTO-ASDCP-PKL-20040311#",
        }
    }

    fn cpl_ns(self) -> &'static str {
        match self {
            Self::Smpte => "http://www.smpte-ra.org/schemas/429-7/2006/CPL",
            Self::Interop => "http://www.digicine.com/PROTO-ASDCP-CPL-20040511#",
        }
    }

    fn assetmap_name(self) -> &'static str {
        match self {
            Self::Smpte => "ASSETMAP.xml",
            Self::Interop => "ASSETMAP",
        }
    }

    fn aspect_ratio(self) -> &'static str {
        match self {
            Self::Smpte => "1998 1080",
            Self::Interop => "1.85",
        }
    }

    fn cpl_type(self) -> &'static str {
        match self {
            Self::Smpte => "text/xml",
            Self::Interop => "text/xml;asdcpKind=CPL",
        }
    }
}

#[derive(Debug, Clone)]
struct Playlist {
    id: String,
    title: String,
    with_sound: bool,
}

/// Builds a package directory.
#[derive(Debug, Clone)]
pub struct DcpBuilder {
    flavor: Flavor,
    playlists: Vec<Playlist>,
    pkl_name: String,
}

impl DcpBuilder {
    /// A package with one feature playlist.
    pub fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            playlists: vec![Playlist {
                id: FEATURE_CPL.to_string(),
                title: "FEATURE_FTR_F_EN-XX_51_2K_20130528".to_string(),
                with_sound: true,
            }],
            pkl_name: "feature_pkl.xml".to_string(),
        }
    }

    pub fn playlist(mut self, id: &str, title: &str) -> Self {
        self.playlists.push(Playlist {
            id: id.to_string(),
            title: title.to_string(),
            with_sound: true,
        });
        self
    }

    /// A playlist whose only reel lacks its sound track.
    pub fn playlist_without_sound(mut self, id: &str, title: &str) -> Self {
        self.playlists.push(Playlist {
            id: id.to_string(),
            title: title.to_string(),
            with_sound: false,
        });
        self
    }

    pub fn pkl_name(mut self, name: &str) -> Self {
        self.pkl_name = name.to_string();
        self
    }

    pub fn build(self) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("picture.mxf"), b"picture essence").unwrap();
        fs::write(root.join("sound.mxf"), b"sound essence").unwrap();

        let mut pkl_assets = String::new();
        let mut am_assets = format!(
            "<Asset><Id>urn:uuid:{PKL_ID}</Id><PackingList>true</PackingList>{}</Asset>",
            chunk(&self.pkl_name)
        );

        for playlist in &self.playlists {
            let name = cpl_file_name(&playlist.id);
            let path = root.join(&name);
            fs::write(&path, self.cpl_xml(playlist)).unwrap();
            let size = fs::metadata(&path).unwrap().len();
            pkl_assets.push_str(&format!(
                "<Asset><Id>urn:uuid:{}</Id><AnnotationText>{}</AnnotationText>\
                 <Hash>{}</Hash><Size>{size}</Size><Type>{}</Type>\
                 <OriginalFileName>{name}</OriginalFileName></Asset>",
                playlist.id,
                playlist.title,
                hash_file(&path).unwrap(),
                self.flavor.cpl_type()
            ));
            am_assets.push_str(&format!(
                "<Asset><Id>urn:uuid:{}</Id>{}</Asset>",
                playlist.id,
                chunk(&name)
            ));
        }

        for (id, name) in [(PICTURE_ID, "picture.mxf"), (SOUND_ID, "sound.mxf")] {
            pkl_assets.push_str(&format!(
                "<Asset><Id>urn:uuid:{id}</Id><Hash>{BOGUS_ESSENCE_HASH}</Hash>\
                 <Size>15</Size><Type>application/mxf</Type></Asset>"
            ));
            am_assets.push_str(&format!("<Asset><Id>urn:uuid:{id}</Id>{}</Asset>", chunk(name)));
        }

        fs::write(
            root.join(&self.pkl_name),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<PackingList xmlns="{}">
  <Id>urn:uuid:{PKL_ID}</Id>
  <AnnotationText>Feature</AnnotationText>
  <IssueDate>2013-05-28T10:47:08+00:00</IssueDate>
  <Issuer>Lab</Issuer>
  <Creator>reelforge fixtures</Creator>
  <AssetList>{pkl_assets}</AssetList>
</PackingList>"#,
                self.flavor.pkl_ns()
            ),
        )
        .unwrap();

        fs::write(
            root.join(self.flavor.assetmap_name()),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<AssetMap xmlns="{}">
  <Id>urn:uuid:{ASSETMAP_ID}</Id>
  <AnnotationText>Feature</AnnotationText>
  <Creator>reelforge fixtures</Creator>
  <VolumeCount>1</VolumeCount>
  <IssueDate>2013-05-28T10:47:08+00:00</IssueDate>
  <Issuer>Lab</Issuer>
  <AssetList>{am_assets}</AssetList>
</AssetMap>"#,
                self.flavor.assetmap_ns()
            ),
        )
        .unwrap();

        Fixture {
            dir,
            flavor: self.flavor,
            assetmap_name: self.flavor.assetmap_name(),
            pkl_name: self.pkl_name,
        }
    }

    fn cpl_xml(&self, playlist: &Playlist) -> String {
        let track = |tag: &str, id: &str, extra: &str| {
            format!(
                "<{tag}><Id>urn:uuid:{id}</Id><EditRate>24 1</EditRate>\
                 <IntrinsicDuration>240</IntrinsicDuration><EntryPoint>0</EntryPoint>\
                 <Duration>240</Duration>{extra}</{tag}>"
            )
        };
        let mut assets = track(
            "MainPicture",
            PICTURE_ID,
            &format!(
                "<FrameRate>24 1</FrameRate><ScreenAspectRatio>{}</ScreenAspectRatio>",
                self.flavor.aspect_ratio()
            ),
        );
        if playlist.with_sound {
            assets.push_str(&track("MainSound", SOUND_ID, ""));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<CompositionPlaylist xmlns="{ns}">
  <Id>urn:uuid:{id}</Id>
  <AnnotationText>{title}</AnnotationText>
  <IssueDate>2013-05-28T10:47:08+00:00</IssueDate>
  <Issuer>Lab</Issuer>
  <Creator>reelforge fixtures</Creator>
  <ContentTitleText>{title}</ContentTitleText>
  <ContentKind>feature</ContentKind>
  <ReelList>
    <Reel>
      <Id>urn:uuid:66666666-6666-6666-6666-666666666666</Id>
      <AssetList>{assets}</AssetList>
    </Reel>
  </ReelList>
</CompositionPlaylist>"#,
            ns = self.flavor.cpl_ns(),
            id = playlist.id,
            title = playlist.title,
        )
    }
}

fn chunk(path: &str) -> String {
    format!("<ChunkList><Chunk><Path>{path}</Path><VolumeIndex>1</VolumeIndex></Chunk></ChunkList>")
}

pub fn cpl_file_name(id: &str) -> String {
    format!("cpl_{id}.xml")
}

/// A package written to a temp directory, removed on drop.
pub struct Fixture {
    dir: TempDir,
    pub flavor: Flavor,
    pub assetmap_name: &'static str,
    pub pkl_name: String,
}

impl Fixture {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn cpl_path(&self, id: &str) -> PathBuf {
        self.path(&cpl_file_name(id))
    }

    pub fn remove(&self, name: &str) {
        fs::remove_file(self.path(name)).unwrap();
    }

    /// Flip one byte of a file in place.
    pub fn corrupt(&self, name: &str) {
        let path = self.path(name);
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        fs::write(&path, bytes).unwrap();
    }
}
