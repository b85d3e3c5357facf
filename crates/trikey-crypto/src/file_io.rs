//! Whole-file reads and writes
//!
//! Files are materialized in memory in full. Writes truncate and overwrite the
//! destination in place; a crash mid-write leaves a truncated file.

use std::path::Path;

use trikey_core::{TrikeyError, TrikeyResult};

/// Read the whole file at `path`.
pub fn read_whole(path: &Path) -> TrikeyResult<Vec<u8>> {
    match std::fs::read(path) {
        Ok(data) => {
            tracing::debug!(path = %path.display(), bytes = data.len(), "read file");
            Ok(data)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TrikeyError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Read a file that is about to be encrypted; an empty file is invalid input.
pub fn read_plaintext(path: &Path) -> TrikeyResult<Vec<u8>> {
    let data = read_whole(path)?;
    if data.is_empty() {
        return Err(TrikeyError::EmptyFile(path.to_path_buf()));
    }
    Ok(data)
}

/// Write `data` to `path`, replacing any existing file.
pub fn write_whole(path: &Path, data: &[u8]) -> TrikeyResult<()> {
    std::fs::write(path, data)?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "wrote file");
    Ok(())
}
