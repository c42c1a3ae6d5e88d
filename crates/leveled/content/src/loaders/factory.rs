//! Content factory for loading resolver inputs from a data directory.

use std::path::{Path, PathBuf};

use leveled_core::{GlobalSnapshot, LeveledTable, ResolverConfig};

use crate::loaders::{ConfigLoader, GlobalsLoader, LoadResult, TableLoader};

/// Content factory that loads all resolver content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── leveled_lists.json   (or leveled_lists.ron)
/// ├── resolver.toml        (optional)
/// └── globals.toml         (optional)
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    const TABLE_FILES: [&'static str; 2] = ["leveled_lists.json", "leveled_lists.ron"];

    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the list table from `leveled_lists.json`, falling back to
    /// `leveled_lists.ron`.
    pub fn load_table(&self) -> LoadResult<LeveledTable> {
        let path = Self::TABLE_FILES
            .iter()
            .map(|name| self.data_dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No leveled list table in {} (expected {})",
                    self.data_dir.display(),
                    Self::TABLE_FILES.join(" or ")
                )
            })?;
        TableLoader::load(&path)
    }

    /// Load resolver configuration from `resolver.toml`, or defaults when absent.
    pub fn load_config(&self) -> LoadResult<ResolverConfig> {
        let path = self.data_dir.join("resolver.toml");
        if !path.is_file() {
            return Ok(ResolverConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load `globals.toml` bound to `table`, or an empty snapshot when absent.
    pub fn load_globals(&self, table: &LeveledTable) -> LoadResult<GlobalSnapshot> {
        let path = self.data_dir.join("globals.toml");
        if !path.is_file() {
            return Ok(GlobalSnapshot::new());
        }
        GlobalsLoader::load(&path, table)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
