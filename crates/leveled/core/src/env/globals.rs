//! Snapshot of global variables for one resolution call.

use std::collections::HashMap;

use crate::ident::FormId;
use crate::table::LeveledTable;

/// Read-only view of global variable values.
///
/// Keys are ids interned by the table the snapshot was built for. Globals the
/// table never mentions cannot influence resolution and are dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalSnapshot {
    values: HashMap<FormId, f32>,
}

impl GlobalSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from `(name, value)` pairs using the table's ids.
    pub fn from_named<'n>(
        table: &LeveledTable,
        values: impl IntoIterator<Item = (&'n str, f32)>,
    ) -> Self {
        let mut snapshot = Self::new();
        for (name, value) in values {
            snapshot.set_named(table, name, value);
        }
        snapshot
    }

    pub fn set(&mut self, id: FormId, value: f32) {
        self.values.insert(id, value);
    }

    /// Sets a global by name. Returns false when the table never references it.
    pub fn set_named(&mut self, table: &LeveledTable, name: &str, value: f32) -> bool {
        match table.form_id(name) {
            Some(id) => {
                self.values.insert(id, value);
                true
            }
            None => {
                tracing::debug!("global '{}' is not referenced by the table", name);
                false
            }
        }
    }

    pub fn with_named(mut self, table: &LeveledTable, name: &str, value: f32) -> Self {
        self.set_named(table, name, value);
        self
    }

    pub fn get(&self, id: FormId) -> Option<f32> {
        self.values.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
