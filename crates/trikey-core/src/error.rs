use std::path::PathBuf;
use thiserror::Error;

pub type TrikeyResult<T> = Result<T, TrikeyError>;

#[derive(Debug, Error)]
pub enum TrikeyError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("file is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("corrupt or truncated ciphertext: {len} bytes (minimum {min})")]
    CorruptData { len: usize, min: usize },

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("invalid hex key: {0}")]
    InvalidHex(String),

    #[error("entropy source unavailable: {0}")]
    EntropySource(String),

    #[error("malformed key file: {0}")]
    Sidecar(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrikeyError {
    /// Short category name shown next to the message at the CLI boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            TrikeyError::FileNotFound(_) => "file-not-found",
            TrikeyError::EmptyFile(_) => "empty-file",
            TrikeyError::CorruptData { .. } => "corrupt-data",
            TrikeyError::Crypto(_) => "crypto",
            TrikeyError::InvalidHex(_) => "invalid-hex",
            TrikeyError::EntropySource(_) => "entropy-source",
            TrikeyError::Sidecar(_) => "key-file",
            TrikeyError::Config(_) => "config",
            TrikeyError::InvalidArgument(_) => "invalid-argument",
            TrikeyError::Io(_) => "io",
        }
    }
}
