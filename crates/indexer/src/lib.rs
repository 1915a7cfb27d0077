//! # Corpus Indexer
//!
//! Walks a documentation/source tree and builds a normalized, path-keyed
//! index of every allow-listed file.
//!
//! ## Pipeline
//!
//! ```text
//! Root directory
//!     │
//!     ├──> Corpus Scanner (prunes excluded directories)
//!     │      └─> CorpusFile set
//!     │
//!     └──> CorpusIndex (normalized relative-path lookup)
//! ```

mod error;
mod index;
mod scanner;

pub use error::{IndexerError, Result};
pub use index::{normalize_key, CorpusFile, CorpusIndex};
pub use scanner::{CorpusScanner, ScanOptions, DEFAULT_EXTENSIONS, EXCLUDED_DIR_NAMES, SKIPPED_FILE_NAMES};
