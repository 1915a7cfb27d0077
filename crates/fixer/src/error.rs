use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FixerError>;

#[derive(Error, Debug)]
pub enum FixerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("backup of {original} failed: {reason}")]
    BackupFailed { original: PathBuf, reason: String },

    #[error("overlapping or out-of-bounds edit at {start}..{end}")]
    InvalidEdit { start: usize, end: usize },
}
