//! Transparent decompression of repository metadata files.
//!
//! Metadata files are usually gzip-compressed (`primary.xml.gz`,
//! `modules.yaml.gz`), but plain files are accepted too. The format is
//! detected from the leading magic bytes rather than the file extension.

use flate2::read::MultiGzDecoder;
use std::io::{self, Read};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];
const BZIP2_MAGIC: &[u8] = b"BZh";

/// Compression formats seen in repodata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Xz,
    Zstd,
    Bzip2,
}

impl Compression {
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(GZIP_MAGIC) {
            Compression::Gzip
        } else if bytes.starts_with(XZ_MAGIC) {
            Compression::Xz
        } else if bytes.starts_with(ZSTD_MAGIC) {
            Compression::Zstd
        } else if bytes.starts_with(BZIP2_MAGIC) {
            Compression::Bzip2
        } else {
            Compression::None
        }
    }
}

/// Return the decompressed content of `bytes`.
///
/// Only gzip is supported; xz, zstd and bzip2 input yields an
/// `InvalidData` error naming the format.
pub fn decompress(bytes: Vec<u8>) -> io::Result<Vec<u8>> {
    match Compression::detect(&bytes) {
        Compression::None => Ok(bytes),
        Compression::Gzip => {
            let mut out = Vec::new();
            MultiGzDecoder::new(bytes.as_slice()).read_to_end(&mut out)?;
            Ok(out)
        }
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported compression format: {:?}", other),
        )),
    }
}
