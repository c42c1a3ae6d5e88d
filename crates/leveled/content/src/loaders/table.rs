//! Leveled list table loader.

use std::path::Path;

use leveled_core::{LeveledTable, RecordTable};

use crate::loaders::{LoadResult, read_file};

/// On-disk encoding of a list table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableFormat {
    Json,
    Ron,
}

impl TableFormat {
    /// Picks the format from a file extension (`json` or `ron`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if extension.eq_ignore_ascii_case("ron") {
            Some(Self::Ron)
        } else {
            None
        }
    }
}

/// Loader for leveled list tables.
pub struct TableLoader;

impl TableLoader {
    /// Load and bind a table, choosing the parser by file extension.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a `.json` or `.ron` file mapping list ids to records
    pub fn load(path: &Path) -> LoadResult<LeveledTable> {
        let records = Self::load_records(path)?;
        Ok(LeveledTable::from_records(records))
    }

    /// Load the raw records without binding them.
    pub fn load_records(path: &Path) -> LoadResult<RecordTable> {
        let format = TableFormat::from_path(path).ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported leveled list file {} (expected .json or .ron)",
                path.display()
            )
        })?;
        let content = read_file(path)?;
        let records = Self::parse(&content, format)?;

        tracing::debug!(
            path = %path.display(),
            lists = records.len(),
            "loaded leveled list records"
        );
        Ok(records)
    }

    /// Parse a table from an in-memory string.
    pub fn parse(content: &str, format: TableFormat) -> LoadResult<RecordTable> {
        match format {
            TableFormat::Json => serde_json::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse leveled list JSON: {}", e)),
            TableFormat::Ron => ron::from_str(content)
                .map_err(|e| anyhow::anyhow!("Failed to parse leveled list RON: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leveled_core::{ComparisonRecord, EntryTarget, RunOn};

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            TableFormat::from_path(Path::new("data/lists.JSON")),
            Some(TableFormat::Json)
        );
        assert_eq!(
            TableFormat::from_path(Path::new("lists.ron")),
            Some(TableFormat::Ron)
        );
        assert_eq!(TableFormat::from_path(Path::new("lists.toml")), None);
        assert_eq!(TableFormat::from_path(Path::new("lists")), None);
    }

    #[test]
    fn parses_ron_records() {
        let content = r#"{
            "LL_Crate": (
                Flags: 4,
                Entries: [
                    (Target: "LL_Ammo", CountMultiplier: Some(2)),
                    (
                        Target: "Stimpak",
                        Conditions: [
                            (
                                Operator: 4,
                                Comparison: 50.0,
                                Function: "GetRandomPercent",
                                RunOn: Target,
                            ),
                        ],
                    ),
                ],
            ),
            "LL_Ammo": (
                Entries: [(Target: "Ammo_556", CountMultiplier: Some(20))],
            ),
        }"#;

        let records = TableLoader::parse(content, TableFormat::Ron).expect("valid RON");
        assert_eq!(records.len(), 2);
        let condition = &records["LL_Crate"].entries[1].conditions[0];
        assert_eq!(condition.comparison, ComparisonRecord::Literal(50.0));
        assert_eq!(condition.run_on, RunOn::Target);

        let table = LeveledTable::from_records(records);
        let crate_list = table
            .lookup("LL_Crate")
            .and_then(|index| table.list(index))
            .expect("crate list");
        assert!(matches!(crate_list.entries[0].target, EntryTarget::List(_)));
        assert!(matches!(crate_list.entries[1].target, EntryTarget::Object(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let error = TableLoader::parse("{ \"LL\": [", TableFormat::Json).unwrap_err();
        assert!(error.to_string().contains("Failed to parse leveled list JSON"));
    }
}
