//! Content loaders for leveled list data.
//!
//! Turns exported data files into the immutable inputs `leveled-core`
//! resolves against:
//! - Leveled list tables (JSON or RON)
//! - Resolver tunables (TOML)
//! - Global variable snapshots (TOML)
//!
//! Loading happens once at start-up; resolution itself never touches disk.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, GlobalsLoader, LoadResult, TableLoader};
