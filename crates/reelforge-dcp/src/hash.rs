//! Streaming SHA-1 digests, base64 encoded the way packing lists declare them.
//!
//! Files are read in fixed-size chunks, so memory use does not depend on file
//! size. The digest is the same for any chunk size.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Default read size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Length of a SHA-1 digest in bytes.
pub const DIGEST_LEN: usize = 20;

/// Raw SHA-1 of everything `reader` yields, read `chunk_size` bytes at a time.
pub fn digest_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<[u8; DIGEST_LEN]> {
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&hasher.finalize());
    Ok(digest)
}

/// Base64 SHA-1 of a reader.
pub fn hash_reader<R: Read>(reader: R, chunk_size: usize) -> io::Result<String> {
    digest_reader(reader, chunk_size).map(|d| encode_digest(&d))
}

/// Raw SHA-1 of a file.
pub fn digest_file(path: &Path, chunk_size: usize) -> io::Result<[u8; DIGEST_LEN]> {
    digest_reader(File::open(path)?, chunk_size)
}

/// Base64 SHA-1 of a file, read in 1 MiB chunks.
///
/// # Examples
///
/// ```
/// use reelforge_dcp::hash::hash_file;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("abc.txt");
/// std::fs::write(&path, b"abc").unwrap();
/// assert_eq!(hash_file(&path).unwrap(), "qZk+NkcGgWq6PiVxeFDCbJzQ2J0=");
/// ```
pub fn hash_file(path: &Path) -> io::Result<String> {
    hash_file_with_chunk_size(path, DEFAULT_CHUNK_SIZE)
}

pub fn hash_file_with_chunk_size(path: &Path, chunk_size: usize) -> io::Result<String> {
    digest_file(path, chunk_size).map(|d| encode_digest(&d))
}

pub fn encode_digest(digest: &[u8]) -> String {
    STANDARD.encode(digest)
}

/// Decode a declared base64 digest. `None` if it is not base64.
pub fn decode_digest(value: &str) -> Option<Vec<u8>> {
    STANDARD.decode(value.trim()).ok()
}
