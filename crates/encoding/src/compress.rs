//! zlib compression stage.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Compresses `data` in zlib format at the maximum compression level.
pub fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inflates zlib-compressed bytes.
pub fn decompress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"sign here, compress there".repeat(20);
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn zlib_header_present() {
        // 0x78 is the zlib CMF byte for deflate with a 32K window.
        let compressed = compress(b"x").unwrap();
        assert_eq!(compressed[0], 0x78);
    }

    #[test]
    fn rejects_garbage_input() {
        assert!(decompress(&[0xDE, 0xAD, 0xBE, 0xEF]).is_err());
    }
}
