//! Immutable, arena-backed table of leveled lists.
//!
//! [`LeveledTable::from_records`] interns every identifier in the raw records
//! and binds entry targets to either a list slot in the arena or a terminal
//! object. Building never fails: integrity problems (bad flags, unknown
//! operators, missing globals) are left in place and surface as contained
//! faults when the affected branch is resolved.

mod flags;

pub use flags::ListFlags;

use std::collections::{BTreeSet, HashMap};

use crate::condition::{ComparisonValue, Condition, Param};
use crate::error::Fault;
use crate::ident::{FormId, Interner, ListIndex};
use crate::record::{ComparisonRecord, ConditionRecord, EntryRecord, ListRecord, ParamRecord};

/// What an entry expands to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryTarget {
    /// Another list in the same table.
    List(ListIndex),
    /// A terminal object emitted as-is.
    Object(FormId),
}

/// Count override bound to a value of the list's count global.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdCount {
    pub threshold: f32,
    pub count: u32,
}

/// One candidate output of a list.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub target: EntryTarget,
    pub level: u16,
    pub weight: u32,
    pub count_multiplier: u32,
    pub value_multiplier: Option<f32>,
    /// Sorted by ascending threshold.
    pub thresholds: Vec<ThresholdCount>,
    pub template: Option<FormId>,
    pub conditions: Vec<Condition>,
}

impl Entry {
    /// Count bound to the greatest threshold `<= value`.
    ///
    /// `None` means no threshold is reached and the entry is inactive.
    pub fn threshold_count(&self, value: f32) -> Option<u32> {
        self.thresholds
            .iter()
            .rev()
            .find(|bound| bound.threshold <= value)
            .map(|bound| bound.count)
    }

    pub fn is_threshold_gated(&self) -> bool {
        !self.thresholds.is_empty()
    }
}

/// A compiled leveled list.
#[derive(Clone, Debug, PartialEq)]
pub struct LeveledList {
    pub id: FormId,
    /// Raw mode bits; decoded per resolution so bad bits only poison this list.
    pub raw_flags: u32,
    pub chance_none: u8,
    pub count_global: Option<FormId>,
    pub conditions: Vec<Condition>,
    pub entries: Vec<Entry>,
}

impl LeveledList {
    pub fn flags(&self) -> Result<ListFlags, Fault> {
        ListFlags::decode(self.raw_flags).ok_or(Fault::MalformedFlags {
            list: self.id,
            bits: self.raw_flags,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-only table shared by every resolution call.
#[derive(Clone, Debug, Default)]
pub struct LeveledTable {
    interner: Interner,
    lists: Vec<LeveledList>,
    by_id: HashMap<FormId, ListIndex>,
    functions: BTreeSet<FormId>,
}

impl LeveledTable {
    /// Builds a table from raw records.
    ///
    /// A list id that appears twice keeps the last record.
    pub fn from_records<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = (S, ListRecord)>,
        S: AsRef<str>,
    {
        let records: Vec<(S, ListRecord)> = records.into_iter().collect();
        let mut table = Self::default();

        // Pass 1: reserve an arena slot for every list so entries can bind to it.
        let mut slots = Vec::with_capacity(records.len());
        for (name, _) in &records {
            let id = table.interner.intern(name.as_ref());
            let index = match table.by_id.get(&id) {
                Some(&index) => {
                    tracing::warn!("duplicate leveled list '{}', keeping the last", name.as_ref());
                    index
                }
                None => {
                    let index = ListIndex(table.lists.len() as u32);
                    table.lists.push(LeveledList {
                        id,
                        raw_flags: 0,
                        chance_none: 0,
                        count_global: None,
                        conditions: Vec::new(),
                        entries: Vec::new(),
                    });
                    table.by_id.insert(id, index);
                    index
                }
            };
            slots.push(index);
        }

        // Pass 2: compile bodies.
        for ((_, record), index) in records.iter().zip(slots) {
            let id = table.lists[index.as_usize()].id;
            table.lists[index.as_usize()] = table.compile_list(id, record);
        }

        tracing::debug!(
            "built leveled table: {} lists, {} identifiers",
            table.lists.len(),
            table.interner.len()
        );
        table
    }

    fn compile_list(&mut self, id: FormId, record: &ListRecord) -> LeveledList {
        let count_global = record
            .output_count_global
            .as_deref()
            .map(|name| self.interner.intern(name));
        let conditions = self.compile_conditions(&record.conditions);
        let entries = record
            .entries
            .iter()
            .map(|entry| self.compile_entry(entry))
            .collect();

        LeveledList {
            id,
            raw_flags: record.flags,
            chance_none: record.chance_none,
            count_global,
            conditions,
            entries,
        }
    }

    fn compile_entry(&mut self, record: &EntryRecord) -> Entry {
        let target_id = self.interner.intern(&record.target);
        let target = match self.by_id.get(&target_id) {
            Some(&index) => EntryTarget::List(index),
            None => EntryTarget::Object(target_id),
        };

        let mut thresholds: Vec<ThresholdCount> = record
            .count_by_global_threshold
            .iter()
            .map(|bound| ThresholdCount {
                threshold: bound.threshold,
                count: bound.count,
            })
            .collect();
        thresholds.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));

        Entry {
            target,
            level: record.level,
            weight: record.weight.unwrap_or(1),
            count_multiplier: record.count_multiplier.unwrap_or(1),
            value_multiplier: record.value_multiplier,
            thresholds,
            template: record
                .template
                .as_deref()
                .map(|name| self.interner.intern(name)),
            conditions: self.compile_conditions(&record.conditions),
        }
    }

    fn compile_conditions(&mut self, records: &[ConditionRecord]) -> Vec<Condition> {
        records
            .iter()
            .map(|record| {
                let function = self.interner.intern(&record.function);
                self.functions.insert(function);
                Condition {
                    operator: record.operator,
                    comparison: match &record.comparison {
                        ComparisonRecord::Literal(value) => ComparisonValue::Literal(*value),
                        ComparisonRecord::Global(name) => {
                            ComparisonValue::Global(self.interner.intern(name))
                        }
                    },
                    function,
                    params: [
                        self.compile_param(&record.param1),
                        self.compile_param(&record.param2),
                    ],
                    run_on: record.run_on,
                }
            })
            .collect()
    }

    fn compile_param(&mut self, record: &ParamRecord) -> Param {
        Param {
            reference: record
                .reference
                .as_deref()
                .map(|name| self.interner.intern(name)),
            value: record.value,
        }
    }

    /// Arena slot of the list named `name`.
    pub fn lookup(&self, name: &str) -> Option<ListIndex> {
        self.interner
            .get(name)
            .and_then(|id| self.by_id.get(&id).copied())
    }

    pub fn list(&self, index: ListIndex) -> Option<&LeveledList> {
        self.lists.get(index.as_usize())
    }

    pub fn lists(&self) -> impl Iterator<Item = &LeveledList> {
        self.lists.iter()
    }

    /// Interned id of any identifier the table mentions.
    pub fn form_id(&self, name: &str) -> Option<FormId> {
        self.interner.get(name)
    }

    pub fn name(&self, id: FormId) -> Option<&str> {
        self.interner.resolve(id)
    }

    /// Every function name used by a condition in this table.
    pub fn function_ids(&self) -> impl Iterator<Item = FormId> + '_ {
        self.functions.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}
