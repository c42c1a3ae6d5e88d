//! Fault taxonomy for list resolution.
//!
//! Resolution never fails as a whole. Every problem it meets is contained in
//! the branch that hit it, logged, and recorded as a [`Fault`] in the
//! [`crate::Resolution`] so hosts and tests can inspect what was dropped.
//!
//! # Categories
//!
//! - **DataIntegrity**: the content itself is broken (unknown list, cycle,
//!   depth overflow, malformed flags or operator codes, missing globals)
//! - **Oracle**: a condition function is unknown or the host oracle failed
//! - **CallerContract**: the caller passed an unusable argument

use crate::ident::FormId;

/// Coarse classification of a fault, used for logging and host policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaultCategory {
    /// Broken or inconsistent content data.
    DataIntegrity,

    /// Unknown or failing condition function.
    Oracle,

    /// Unusable arguments supplied by the caller.
    CallerContract,
}

impl FaultCategory {
    /// Returns a human-readable name for this category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DataIntegrity => "data_integrity",
            Self::Oracle => "oracle",
            Self::CallerContract => "caller_contract",
        }
    }
}

/// A contained problem encountered while resolving a list.
///
/// Identifiers are the interned ids of the table the resolver was built on;
/// use [`crate::LeveledTable::name`] to turn them back into strings.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Fault {
    /// The requested root list does not exist in the table.
    #[error("leveled list '{0}' not found")]
    UnknownList(String),

    /// A list's flag value contains bits the engine does not understand.
    #[error("list {list} has malformed flags {bits:#x}")]
    MalformedFlags { list: FormId, bits: u32 },

    /// Expansion reached a list that is already on the current path.
    #[error("list {list} references itself through its own expansion")]
    CycleDetected { list: FormId },

    /// Expansion exceeded the configured nesting bound.
    #[error("list {list} exceeds the maximum nesting depth {max_depth}")]
    DepthExceeded { list: FormId, max_depth: u8 },

    /// A per-item list was asked for more draws than the configured cap.
    #[error("list {list} requested {requested} per-item draws, clamped to {max}")]
    DrawsClamped { list: FormId, requested: u32, max: u32 },

    /// A condition uses an operator code outside the known range.
    #[error("unknown comparison operator code {0}")]
    UnknownOperator(i8),

    /// A global referenced by a condition or list is not in the snapshot.
    #[error("global {0} is not present in the snapshot")]
    MissingGlobal(FormId),

    /// A threshold-gated entry sits in a list with no count global.
    #[error("list {list} has threshold overrides but no output-count global")]
    MissingCountGlobal { list: FormId },

    /// A condition names a function the host never registered.
    #[error("condition function {0} is not registered")]
    UnknownFunction(FormId),

    /// The host oracle reported an error for a registered function.
    #[error("condition function {function} failed: {reason}")]
    OracleFailure { function: FormId, reason: String },

    /// The requested count was negative or beyond the configured cap.
    #[error("requested count {0} is outside the accepted range")]
    RequestedCountOutOfRange(i64),
}

impl Fault {
    /// Returns the taxonomy bucket for this fault.
    pub const fn category(&self) -> FaultCategory {
        use Fault::*;
        match self {
            UnknownList(_)
            | MalformedFlags { .. }
            | CycleDetected { .. }
            | DepthExceeded { .. }
            | DrawsClamped { .. }
            | UnknownOperator(_)
            | MissingGlobal(_)
            | MissingCountGlobal { .. } => FaultCategory::DataIntegrity,

            UnknownFunction(_) | OracleFailure { .. } => FaultCategory::Oracle,

            RequestedCountOutOfRange(_) => FaultCategory::CallerContract,
        }
    }

    /// Identifier the fault is about, when there is one.
    pub const fn form_id(&self) -> Option<FormId> {
        use Fault::*;
        match self {
            MalformedFlags { list, .. }
            | CycleDetected { list }
            | DepthExceeded { list, .. }
            | DrawsClamped { list, .. }
            | MissingCountGlobal { list } => Some(*list),
            MissingGlobal(id) | UnknownFunction(id) => Some(*id),
            OracleFailure { function, .. } => Some(*function),
            UnknownList(_) | UnknownOperator(_) | RequestedCountOutOfRange(_) => None,
        }
    }

    /// Returns a stable identifier for this fault variant.
    pub const fn error_code(&self) -> &'static str {
        use Fault::*;
        match self {
            UnknownList(_) => "LIST_UNKNOWN",
            MalformedFlags { .. } => "LIST_MALFORMED_FLAGS",
            CycleDetected { .. } => "LIST_CYCLE",
            DepthExceeded { .. } => "LIST_DEPTH_EXCEEDED",
            DrawsClamped { .. } => "LIST_DRAWS_CLAMPED",
            UnknownOperator(_) => "CONDITION_UNKNOWN_OPERATOR",
            MissingGlobal(_) => "GLOBAL_MISSING",
            MissingCountGlobal { .. } => "LIST_MISSING_COUNT_GLOBAL",
            UnknownFunction(_) => "ORACLE_UNKNOWN_FUNCTION",
            OracleFailure { .. } => "ORACLE_FAILURE",
            RequestedCountOutOfRange(_) => "CALLER_REQUESTED_COUNT",
        }
    }
}

/// Error a host oracle returns when it cannot answer a query.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OracleFault {
    /// The host does not implement this function code.
    #[error("function code {0} is not supported by the host")]
    Unsupported(u16),

    /// The run-on actor is not available (despawned, not loaded, ...).
    #[error("actor {0} is not available")]
    ActorUnavailable(crate::ident::ActorRef),

    /// Any other host-side failure.
    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(
            Fault::CycleDetected { list: FormId(3) }.category(),
            FaultCategory::DataIntegrity
        );
        assert_eq!(
            Fault::UnknownFunction(FormId(1)).category(),
            FaultCategory::Oracle
        );
        assert_eq!(
            Fault::RequestedCountOutOfRange(-4).category(),
            FaultCategory::CallerContract
        );
        assert_eq!(Fault::UnknownOperator(9).error_code(), "CONDITION_UNKNOWN_OPERATOR");

        let clamped = Fault::DrawsClamped {
            list: FormId(5),
            requested: 500,
            max: 100,
        };
        assert_eq!(clamped.category(), FaultCategory::DataIntegrity);
        assert_eq!(clamped.form_id(), Some(FormId(5)));
    }
}
