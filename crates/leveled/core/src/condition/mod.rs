//! Gating conditions attached to lists and entries.
//!
//! A [`Condition`] calls one oracle function and compares the numeric result
//! against a literal or a global. Sequences are AND-ed by
//! [`ConditionEvaluator`].

pub mod evaluate;
pub mod function;

pub use evaluate::{ConditionEvaluator, EvalScope};
pub use function::{BuiltinFunction, ConditionFunction, FunctionRegistry, FunctionTable};

use crate::error::Fault;
use crate::ident::FormId;

/// Which actor a condition function is evaluated against.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum RunOn {
    /// The actor the list is being resolved for.
    #[default]
    Subject,
    /// The actor the subject is interacting with.
    Target,
}

/// Ordering relation of an operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

/// Decoded comparison operator.
///
/// Codes `0..=5` map to `==`, `!=`, `>`, `>=`, `<`, `<=`. A negative code
/// `-(c + 1)` is the logical NOT of operator `c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Operator {
    pub comparison: Comparison,
    pub negated: bool,
}

impl Operator {
    pub const fn new(comparison: Comparison) -> Self {
        Self {
            comparison,
            negated: false,
        }
    }

    /// Decodes a signed operator code.
    pub fn from_code(code: i8) -> Result<Self, Fault> {
        let (base, negated) = if code < 0 {
            // -1 => !0, -2 => !1, ... ; i16 keeps -128 from overflowing
            ((-(code as i16) - 1) as u8, true)
        } else {
            (code as u8, false)
        };
        let comparison = match base {
            0 => Comparison::Equal,
            1 => Comparison::NotEqual,
            2 => Comparison::Greater,
            3 => Comparison::GreaterOrEqual,
            4 => Comparison::Less,
            5 => Comparison::LessOrEqual,
            _ => return Err(Fault::UnknownOperator(code)),
        };
        Ok(Self {
            comparison,
            negated,
        })
    }

    pub fn apply(self, lhs: f32, rhs: f32) -> bool {
        let verdict = match self.comparison {
            Comparison::Equal => lhs == rhs,
            Comparison::NotEqual => lhs != rhs,
            Comparison::Greater => lhs > rhs,
            Comparison::GreaterOrEqual => lhs >= rhs,
            Comparison::Less => lhs < rhs,
            Comparison::LessOrEqual => lhs <= rhs,
        };
        verdict != self.negated
    }
}

/// Right-hand side of a condition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComparisonValue {
    Literal(f32),
    Global(FormId),
}

/// Parameter slot: an optional reference and a literal fallback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Param {
    pub reference: Option<FormId>,
    pub value: f32,
}

/// A single compiled gating test.
///
/// The operator stays as its raw code; decoding happens at evaluation so a
/// malformed code only excludes the entry that carries it.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub operator: i8,
    pub comparison: ComparisonValue,
    /// Interned function name, bound through a [`FunctionTable`].
    pub function: FormId,
    pub params: [Param; 2],
    pub run_on: RunOn,
}
