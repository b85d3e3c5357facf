use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::TrikeyError;

/// Which kind of directory entry a name search should report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Regular files
    File,
    /// Directories
    Directory,
}

impl FromStr for SearchKind {
    type Err = TrikeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "f" | "file" => Ok(SearchKind::File),
            "d" | "dir" | "directory" => Ok(SearchKind::Directory),
            other => Err(TrikeyError::InvalidArgument(format!(
                "unknown search kind '{other}' (expected 'f' or 'dir')"
            ))),
        }
    }
}

/// A single name-search match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub path: PathBuf,
}
