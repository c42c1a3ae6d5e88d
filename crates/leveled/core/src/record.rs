//! Raw list records as they appear in exported content.
//!
//! These types mirror the input format one to one: string identifiers,
//! optional fields, PascalCase keys. [`crate::LeveledTable::from_records`]
//! interns and binds them into the arena representation used at runtime.

use std::collections::BTreeMap;

/// Whole input table keyed by list identifier.
pub type RecordTable = BTreeMap<String, ListRecord>;

/// One leveled list record.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct ListRecord {
    /// Resolution-mode bits, see [`crate::ListFlags`].
    pub flags: u32,
    /// Percent chance (0-100) that a draw yields nothing.
    pub chance_none: u8,
    /// Global whose current value selects threshold count overrides.
    pub output_count_global: Option<String>,
    /// List-level gate.
    pub conditions: Vec<ConditionRecord>,
    pub entries: Vec<EntryRecord>,
}

/// One candidate output of a list.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct EntryRecord {
    /// Terminal object id or another list id.
    pub target: String,
    /// Minimum subject level for this entry to be active.
    pub level: u16,
    /// Relative weight in a single draw; absent means 1.
    pub weight: Option<u32>,
    pub count_multiplier: Option<u32>,
    pub value_multiplier: Option<f32>,
    pub count_by_global_threshold: Vec<ThresholdRecord>,
    /// Owning container/template, carried through to the output.
    pub template: Option<String>,
    pub conditions: Vec<ConditionRecord>,
}

/// Count override bound to a value of the list's count global.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct ThresholdRecord {
    pub threshold: f32,
    pub count: u32,
}

/// One gating test.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct ConditionRecord {
    /// Signed operator code, see [`crate::Operator::from_code`].
    pub operator: i8,
    pub comparison: ComparisonRecord,
    /// Oracle function name, e.g. `GetRandomPercent`.
    pub function: String,
    pub param1: ParamRecord,
    pub param2: ParamRecord,
    pub run_on: crate::RunOn,
}

/// Right-hand side of a comparison: a literal or a global read at evaluation time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ComparisonRecord {
    Literal(f32),
    Global(String),
}

impl Default for ComparisonRecord {
    fn default() -> Self {
        Self::Literal(0.0)
    }
}

/// A parameter slot: an optional reference plus a literal fallback.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase", default))]
pub struct ParamRecord {
    #[cfg_attr(feature = "serde", serde(rename = "Ref"))]
    pub reference: Option<String>,
    pub value: f32,
}

impl ParamRecord {
    pub fn literal(value: f32) -> Self {
        Self {
            reference: None,
            value,
        }
    }

    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            value: 0.0,
        }
    }
}

// Builders used by hosts that assemble tables in code (and by tests).

impl ListRecord {
    pub fn new(flags: u32) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    pub fn with_entry(mut self, entry: EntryRecord) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_condition(mut self, condition: ConditionRecord) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_chance_none(mut self, percent: u8) -> Self {
        self.chance_none = percent;
        self
    }

    pub fn with_count_global(mut self, global: impl Into<String>) -> Self {
        self.output_count_global = Some(global.into());
        self
    }
}

impl EntryRecord {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_count(mut self, multiplier: u32) -> Self {
        self.count_multiplier = Some(multiplier);
        self
    }

    pub fn with_value(mut self, multiplier: f32) -> Self {
        self.value_multiplier = Some(multiplier);
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_level(mut self, level: u16) -> Self {
        self.level = level;
        self
    }

    pub fn with_threshold(mut self, threshold: f32, count: u32) -> Self {
        self.count_by_global_threshold
            .push(ThresholdRecord { threshold, count });
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_condition(mut self, condition: ConditionRecord) -> Self {
        self.conditions.push(condition);
        self
    }
}

impl ConditionRecord {
    pub fn new(function: impl Into<String>, operator: i8, comparison: ComparisonRecord) -> Self {
        Self {
            operator,
            comparison,
            function: function.into(),
            ..Self::default()
        }
    }

    pub fn with_param1(mut self, param: ParamRecord) -> Self {
        self.param1 = param;
        self
    }

    pub fn with_param2(mut self, param: ParamRecord) -> Self {
        self.param2 = param;
        self
    }

    pub fn on(mut self, run_on: crate::RunOn) -> Self {
        self.run_on = run_on;
        self
    }
}
