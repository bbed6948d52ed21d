//! zlib wrapper for the container payload
//!
//! Encode always uses the best compression level. Decode is all-or-nothing:
//! output is only returned once the stream end marker and the adler32
//! checksum have been read, so a truncated file never yields a partial clip.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::error::TbaError;

/// Upper bound on decompressed payload size (256 MB)
pub const MAX_DECOMPRESSED_SIZE: usize = 256 * 1024 * 1024;

/// Initial output chunk for decompression
const MIN_OUTPUT_CHUNK: usize = 4 * 1024;

/// Compress bytes into a zlib stream at maximum compression (level 9)
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, TbaError> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::best());
    encoder.write_all(bytes).map_err(encoder_failed)?;
    let compressed = encoder.finish().map_err(encoder_failed)?;
    tracing::debug!(
        input = bytes.len(),
        output = compressed.len(),
        "compressed payload"
    );
    Ok(compressed)
}

fn encoder_failed(e: std::io::Error) -> TbaError {
    TbaError::corrupt(format!("zlib encoder failed: {}", e))
}

/// Decompress a complete zlib stream
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, TbaError> {
    if bytes.is_empty() {
        return Err(TbaError::corrupt("empty input"));
    }

    let mut inflater = Decompress::new(true);
    let mut out = Vec::with_capacity(bytes.len().saturating_mul(4).max(MIN_OUTPUT_CHUNK));

    loop {
        if out.len() == out.capacity() {
            if out.len() >= MAX_DECOMPRESSED_SIZE {
                return Err(TbaError::corrupt(format!(
                    "decompressed payload exceeds {} bytes",
                    MAX_DECOMPRESSED_SIZE
                )));
            }
            out.reserve(out.capacity());
        }

        let consumed = inflater.total_in() as usize;
        let produced = out.len();

        let status = inflater
            .decompress_vec(&bytes[consumed..], &mut out, FlushDecompress::None)
            .map_err(|e| TbaError::corrupt(format!("invalid zlib stream: {}", e)))?;

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                let exhausted = inflater.total_in() as usize >= bytes.len();
                let stalled = inflater.total_in() as usize == consumed && out.len() == produced;
                // Output space left over means the inflater wants more input
                if out.len() < out.capacity() && (exhausted || stalled) {
                    return Err(TbaError::corrupt(format!(
                        "truncated zlib stream ({} bytes read, stream end not reached)",
                        bytes.len()
                    )));
                }
            }
        }
    }

    if out.len() > MAX_DECOMPRESSED_SIZE {
        return Err(TbaError::corrupt(format!(
            "decompressed payload exceeds {} bytes",
            MAX_DECOMPRESSED_SIZE
        )));
    }

    let trailing = bytes.len() - inflater.total_in() as usize;
    if trailing > 0 {
        tracing::debug!(trailing, "ignoring bytes after zlib stream end");
    }

    Ok(out)
}

/// Compressed size as a percentage of the uncompressed size.
///
/// Diagnostic only; returns 0 for an empty input.
pub fn compression_ratio(compressed_len: usize, uncompressed_len: usize) -> f64 {
    if uncompressed_len == 0 {
        return 0.0;
    }
    compressed_len as f64 / uncompressed_len as f64 * 100.0
}
