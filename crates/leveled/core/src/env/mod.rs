//! Read-only host state consumed during resolution.
//!
//! The host engine supplies three things per call: a [`ConditionOracle`] that
//! answers game-state queries, a [`GlobalSnapshot`] of global variables, and
//! a seed for the call's [`RollStream`]. None of them is mutated by the
//! resolver.
mod globals;
mod rng;

pub use globals::GlobalSnapshot;
pub use rng::{PcgRng, RngOracle, RollStream, compute_seed};

use crate::condition::RunOn;
use crate::error::OracleFault;
use crate::ident::{ActorRef, FormId};

/// Parameter handed to the host, with its reference resolved back to a name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryParam<'t> {
    pub reference: Option<&'t str>,
    pub value: f32,
}

/// A single host function call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OracleQuery<'t> {
    /// Host code the function was registered with.
    pub code: u16,
    /// Interned function name, for host-side diagnostics.
    pub function: FormId,
    pub params: [QueryParam<'t>; 2],
    pub run_on: RunOn,
    /// Actor selected by `run_on`.
    pub actor: ActorRef,
}

/// Game-state query interface implemented by the host engine.
///
/// Queries must be pure with respect to game state: the same query at the
/// same tick yields the same value. Randomized functions are answered by the
/// resolver from the call's roll stream and never reach the host.
pub trait ConditionOracle: Send + Sync {
    fn query(&self, query: &OracleQuery<'_>) -> Result<f32, OracleFault>;
}

/// Oracle for hosts with no game-state functions; every host query fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOracle;

impl ConditionOracle for NullOracle {
    fn query(&self, query: &OracleQuery<'_>) -> Result<f32, OracleFault> {
        Err(OracleFault::Unsupported(query.code))
    }
}
