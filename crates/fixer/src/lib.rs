//! # Backup Manager & Fixer
//!
//! Mutation safety for the reference engine: every file is snapshotted under
//! a per-run timestamped folder before its first rewrite, and all byte-offset
//! replacements for a file are applied back-to-front in a single pass over a
//! stable content copy.
//!
//! The default path never mutates: `Live` mode is explicit opt-in, and
//! `DryRun` computes identical plans without writing.

mod backup;
mod edit;
mod error;
mod fix;

pub use backup::{BackupManager, BackupRecord};
pub use edit::{apply_edits, Edit};
pub use error::{FixerError, Result};
pub use fix::{relative_target, FileFixOutcome, FixMode, Fixer, PlannedFix};
