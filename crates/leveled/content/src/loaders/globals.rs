//! Global variable snapshot loader.
//!
//! The file is a flat TOML table of `name = value` pairs:
//!
//! ```toml
//! GV_Tier = 2
//! GV_Difficulty = 0.75
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use leveled_core::{GlobalSnapshot, LeveledTable};

use crate::loaders::{LoadResult, read_file};

/// Loader for global variable snapshots from TOML files.
pub struct GlobalsLoader;

impl GlobalsLoader {
    /// Load a snapshot bound to the identifiers of `table`.
    ///
    /// Globals that no list or condition of `table` mentions are skipped.
    pub fn load(path: &Path, table: &LeveledTable) -> LoadResult<GlobalSnapshot> {
        let content = read_file(path)?;
        let values = Self::parse(&content)?;

        let snapshot = GlobalSnapshot::from_named(
            table,
            values.iter().map(|(name, value)| (name.as_str(), *value)),
        );

        tracing::debug!(
            path = %path.display(),
            loaded = snapshot.len(),
            skipped = values.len() - snapshot.len(),
            "loaded global snapshot"
        );
        Ok(snapshot)
    }

    /// Parse raw `name = value` pairs. Integers are widened to `f32`.
    pub fn parse(content: &str) -> LoadResult<BTreeMap<String, f32>> {
        let raw: BTreeMap<String, toml::Value> = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse globals TOML: {}", e))?;

        raw.into_iter()
            .map(|(name, value)| {
                let number = match value {
                    toml::Value::Float(value) => value as f32,
                    toml::Value::Integer(value) => value as f32,
                    toml::Value::Boolean(value) => f32::from(u8::from(value)),
                    other => anyhow::bail!(
                        "Global '{}' must be a number, found {}",
                        name,
                        other.type_str()
                    ),
                };
                Ok((name, number))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_booleans_become_floats() {
        let values = GlobalsLoader::parse("GV_Tier = 2\nGV_Scale = 0.5\nGV_Hard = true\n")
            .expect("valid globals");
        assert_eq!(values["GV_Tier"], 2.0);
        assert_eq!(values["GV_Scale"], 0.5);
        assert_eq!(values["GV_Hard"], 1.0);
    }

    #[test]
    fn strings_are_rejected() {
        let error = GlobalsLoader::parse("GV_Tier = \"high\"").unwrap_err();
        assert!(error.to_string().contains("GV_Tier"));
    }
}
