//! Resolver configuration loader.

use std::path::Path;

use leveled_core::ResolverConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for resolver configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing ResolverConfig
    ///
    /// # Returns
    ///
    /// Returns a ResolverConfig. Keys missing from the file keep their defaults.
    pub fn load(path: &Path) -> LoadResult<ResolverConfig> {
        let content = read_file(path)?;
        let config: ResolverConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}
