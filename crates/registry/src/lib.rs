//! # ID Registry & Migration Engine
//!
//! Maps legacy reference text to canonical `EGOS-<TYPE>-<SUBSYSTEM>-<NUMBER>`
//! identifiers, issuing new IDs as needed, and rewrites legacy annotations to
//! canonical form. The legacy→canonical mapping is the only durable state of
//! the engine besides backups: it persists across runs, entries are never
//! deleted, and it is always consulted before issuing a new ID.

mod error;
mod id;
mod migrate;
mod store;

pub use error::{RegistryError, Result};
pub use id::{infer_subsystem, CanonicalId, RefType, Subsystem, SUBSYSTEM_KEYWORDS};
pub use migrate::{MigrationOutcome, Migrator};
pub use store::RegistryStore;
