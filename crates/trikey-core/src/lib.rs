pub mod config;
pub mod error;
pub mod types;

pub use config::TrikeyConfig;
pub use error::{TrikeyError, TrikeyResult};
pub use types::SearchKind;
