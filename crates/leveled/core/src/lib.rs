//! Leveled list resolution engine.
//!
//! `leveled-core` turns an immutable table of leveled lists into concrete
//! objects and quantities. A host loads a [`LeveledTable`] once, registers
//! its condition functions in a [`FunctionRegistry`], and then calls
//! [`Resolver::resolve`] from any number of threads with a per-call
//! [`ResolveContext`] (subject, target, globals, seed).
//!
//! Resolution never panics on bad content: unknown lists, cycles, malformed
//! flags, and failing oracle calls are contained in the branch that hit them
//! and reported as [`Fault`]s.
pub mod aggregate;
pub mod condition;
pub mod config;
pub mod env;
pub mod error;
pub mod ident;
pub mod record;
pub mod resolve;
pub mod table;

pub use aggregate::{ItemCount, aggregate};
pub use condition::{
    BuiltinFunction, Comparison, ComparisonValue, Condition, ConditionEvaluator, ConditionFunction,
    EvalScope, FunctionRegistry, FunctionTable, Operator, Param, RunOn,
};
pub use config::ResolverConfig;
pub use env::{
    ConditionOracle, GlobalSnapshot, NullOracle, OracleQuery, PcgRng, QueryParam, RngOracle,
    RollStream, compute_seed,
};
pub use error::{Fault, FaultCategory, OracleFault};
pub use ident::{ActorRef, FormId, Interner, ListIndex};
pub use record::{
    ComparisonRecord, ConditionRecord, EntryRecord, ListRecord, ParamRecord, RecordTable,
    ThresholdRecord,
};
pub use resolve::{EntrySelector, OutputRecord, Pick, Resolution, ResolveContext, Resolver};
pub use table::{Entry, EntryTarget, LeveledList, LeveledTable, ListFlags, ThresholdCount};
