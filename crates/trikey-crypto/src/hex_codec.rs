//! Hex encoding for key fragments
//!
//! Encoding is uppercase so key files match the ones the tool has always
//! written; decoding accepts either case.

use trikey_core::{TrikeyError, TrikeyResult};

use crate::BLOCK_SIZE;

/// Encode bytes as uppercase hex (two characters per byte).
pub fn encode(data: &[u8]) -> String {
    ::hex::encode_upper(data)
}

/// Decode `text` into exactly `expected_len` bytes.
///
/// Surrounding whitespace is ignored (values are usually pasted by hand).
/// Fails with `InvalidHex` on non-hex characters, odd length, or a decoded
/// length other than `expected_len`.
pub fn decode(text: &str, expected_len: usize) -> TrikeyResult<Vec<u8>> {
    let text = text.trim();
    if text.len() != expected_len * 2 {
        return Err(TrikeyError::InvalidHex(format!(
            "expected {} hex characters ({expected_len} bytes), got {}",
            expected_len * 2,
            text.len()
        )));
    }
    ::hex::decode(text).map_err(|e| TrikeyError::InvalidHex(e.to_string()))
}

/// Decode a single 16-byte block (key fragment or IV).
pub fn decode_block(text: &str) -> TrikeyResult<[u8; BLOCK_SIZE]> {
    let bytes = decode(text, BLOCK_SIZE)?;
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(&bytes);
    Ok(block)
}
