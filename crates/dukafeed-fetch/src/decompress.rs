//! LZMA decompression for bi5 files.

use lzma_rs::lzma_decompress;
use std::io::{BufReader, Cursor};
use thiserror::Error;

/// Errors that can occur during decompression.
#[derive(Error, Debug)]
pub enum DecompressError {
    /// LZMA decompression failed.
    #[error("LZMA decompression failed: {0}")]
    Lzma(String),

    /// Empty input data.
    #[error("empty input data")]
    EmptyInput,
}

/// Decompresses an LZMA-compressed bi5 body.
///
/// # Errors
///
/// Returns an error if the input is empty or not valid LZMA data.
pub fn decompress_bi5(compressed: &[u8]) -> Result<Vec<u8>, DecompressError> {
    if compressed.is_empty() {
        return Err(DecompressError::EmptyInput);
    }

    let mut decompressed = Vec::new();
    let mut reader = BufReader::new(Cursor::new(compressed));

    lzma_decompress(&mut reader, &mut decompressed)
        .map_err(|e| DecompressError::Lzma(e.to_string()))?;

    Ok(decompressed)
}
