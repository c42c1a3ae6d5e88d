//! Condition sequence evaluation.
//!
//! A sequence passes when every condition passes. Evaluation stops at the
//! first failure, so a randomized condition placed after a failing one does
//! not consume a roll. Every problem fails the condition closed and is
//! recorded in the scope; nothing here panics or returns an error.

use crate::condition::{BuiltinFunction, Condition, ConditionFunction, Operator, RunOn};
use crate::env::{ConditionOracle, GlobalSnapshot, OracleQuery, QueryParam, RollStream};
use crate::error::Fault;
use crate::ident::ActorRef;
use crate::table::LeveledTable;

use super::FunctionTable;

/// Call-local state shared by every evaluation in one resolution call.
pub struct EvalScope<'c> {
    pub subject: ActorRef,
    pub target: ActorRef,
    pub globals: &'c GlobalSnapshot,
    pub rolls: RollStream<'c>,
    pub faults: Vec<Fault>,
}

impl<'c> EvalScope<'c> {
    pub fn new(
        subject: ActorRef,
        target: ActorRef,
        globals: &'c GlobalSnapshot,
        rolls: RollStream<'c>,
    ) -> Self {
        Self {
            subject,
            target,
            globals,
            rolls,
            faults: Vec::new(),
        }
    }

    /// Logs a contained fault and keeps it for the caller.
    pub fn record(&mut self, table: &LeveledTable, fault: Fault) {
        let id = fault
            .form_id()
            .and_then(|id| table.name(id))
            .unwrap_or("-");
        tracing::warn!(
            code = fault.error_code(),
            category = fault.category().as_str(),
            id,
            "{}",
            fault
        );
        self.faults.push(fault);
    }

    fn actor(&self, run_on: RunOn) -> ActorRef {
        match run_on {
            RunOn::Subject => self.subject,
            RunOn::Target => self.target,
        }
    }
}

/// Evaluates condition sequences against one table and host.
#[derive(Clone, Copy)]
pub struct ConditionEvaluator<'a> {
    table: &'a LeveledTable,
    functions: &'a FunctionTable,
    oracle: &'a dyn ConditionOracle,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(
        table: &'a LeveledTable,
        functions: &'a FunctionTable,
        oracle: &'a dyn ConditionOracle,
    ) -> Self {
        Self {
            table,
            functions,
            oracle,
        }
    }

    /// AND of every condition; an empty sequence passes.
    pub fn evaluate(&self, conditions: &[Condition], scope: &mut EvalScope<'_>) -> bool {
        conditions.iter().all(|condition| self.check(condition, scope))
    }

    fn check(&self, condition: &Condition, scope: &mut EvalScope<'_>) -> bool {
        let operator = match Operator::from_code(condition.operator) {
            Ok(operator) => operator,
            Err(fault) => {
                scope.record(self.table, fault);
                return false;
            }
        };

        let Some(function) = self.functions.get(condition.function) else {
            scope.record(self.table, Fault::UnknownFunction(condition.function));
            return false;
        };

        let rhs = match condition.comparison {
            super::ComparisonValue::Literal(value) => value,
            super::ComparisonValue::Global(id) => match scope.globals.get(id) {
                Some(value) => value,
                None => {
                    scope.record(self.table, Fault::MissingGlobal(id));
                    return false;
                }
            },
        };

        let Some(lhs) = self.call(function, condition, scope) else {
            return false;
        };

        let verdict = operator.apply(lhs, rhs);
        tracing::trace!(
            function = self.table.name(condition.function).unwrap_or("-"),
            randomized = function.is_randomized(),
            lhs,
            rhs,
            verdict,
            "condition evaluated"
        );
        verdict
    }

    fn call(
        &self,
        function: ConditionFunction,
        condition: &Condition,
        scope: &mut EvalScope<'_>,
    ) -> Option<f32> {
        match function {
            ConditionFunction::Builtin(BuiltinFunction::GetRandomPercent) => {
                Some(scope.rolls.percent() as f32)
            }
            ConditionFunction::Builtin(BuiltinFunction::GetGlobalValue) => {
                let param = condition.params[0];
                match param.reference {
                    None => Some(param.value),
                    Some(id) => match scope.globals.get(id) {
                        Some(value) => Some(value),
                        None => {
                            scope.record(self.table, Fault::MissingGlobal(id));
                            None
                        }
                    },
                }
            }
            ConditionFunction::Host(code) => {
                let [first, second] = condition.params;
                let query = OracleQuery {
                    code,
                    function: condition.function,
                    params: [
                        QueryParam {
                            reference: first.reference.and_then(|id| self.table.name(id)),
                            value: first.value,
                        },
                        QueryParam {
                            reference: second.reference.and_then(|id| self.table.name(id)),
                            value: second.value,
                        },
                    ],
                    run_on: condition.run_on,
                    actor: scope.actor(condition.run_on),
                };
                match self.oracle.query(&query) {
                    Ok(value) => Some(value),
                    Err(error) => {
                        scope.record(
                            self.table,
                            Fault::OracleFailure {
                                function: condition.function,
                                reason: error.to_string(),
                            },
                        );
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::FunctionRegistry;
    use crate::env::PcgRng;
    use crate::error::OracleFault;
    use crate::record::{ComparisonRecord, ConditionRecord, EntryRecord, ListRecord, ParamRecord};

    /// Answers `GetLevel` with 10 for the subject and 3 for the target.
    struct LevelOracle;

    impl ConditionOracle for LevelOracle {
        fn query(&self, query: &OracleQuery<'_>) -> Result<f32, OracleFault> {
            match (query.code, query.actor) {
                (80, ActorRef(1)) => Ok(10.0),
                (80, ActorRef(2)) => Ok(3.0),
                (80, actor) => Err(OracleFault::ActorUnavailable(actor)),
                (code, _) => Err(OracleFault::Unsupported(code)),
            }
        }
    }

    fn table_with(conditions: Vec<ConditionRecord>) -> LeveledTable {
        let mut entry = EntryRecord::new("Obj");
        entry.conditions = conditions;
        LeveledTable::from_records([("LL", ListRecord::new(0).with_entry(entry))])
    }

    fn conditions_of(table: &LeveledTable) -> Vec<Condition> {
        table.lists().next().expect("one list").entries[0]
            .conditions
            .clone()
    }

    fn run(table: &LeveledTable, globals: &GlobalSnapshot, subject: u64) -> (bool, Vec<Fault>) {
        let registry = FunctionRegistry::new()
            .with_host("GetLevel", 80)
            .with_host("IsBroken", 99);
        let functions = FunctionTable::bind(&registry, table);
        let evaluator = ConditionEvaluator::new(table, &functions, &LevelOracle);
        let rng = PcgRng;
        let mut scope = EvalScope::new(
            ActorRef(subject),
            ActorRef(2),
            globals,
            RollStream::new(&rng, 11),
        );
        let verdict = evaluator.evaluate(&conditions_of(table), &mut scope);
        (verdict, scope.faults)
    }

    #[test]
    fn empty_sequence_is_true() {
        let table = table_with(vec![]);
        let (verdict, faults) = run(&table, &GlobalSnapshot::new(), 1);
        assert!(verdict);
        assert!(faults.is_empty());
    }

    #[test]
    fn host_functions_respect_run_on() {
        let table = table_with(vec![
            ConditionRecord::new("GetLevel", 3, ComparisonRecord::Literal(5.0)),
            ConditionRecord::new("GetLevel", 4, ComparisonRecord::Literal(5.0)).on(RunOn::Target),
        ]);
        let (verdict, faults) = run(&table, &GlobalSnapshot::new(), 1);
        assert!(verdict);
        assert!(faults.is_empty());
    }

    #[test]
    fn all_conditions_must_pass() {
        let table = table_with(vec![
            ConditionRecord::new("GetLevel", 3, ComparisonRecord::Literal(5.0)),
            ConditionRecord::new("GetLevel", 2, ComparisonRecord::Literal(50.0)),
        ]);
        let (verdict, _) = run(&table, &GlobalSnapshot::new(), 1);
        assert!(!verdict);
    }

    #[test]
    fn unknown_function_fails_closed() {
        let table = table_with(vec![ConditionRecord::new(
            "GetFutureThing",
            0,
            ComparisonRecord::Literal(0.0),
        )]);
        let (verdict, faults) = run(&table, &GlobalSnapshot::new(), 1);
        assert!(!verdict);
        assert_eq!(
            faults,
            vec![Fault::UnknownFunction(
                table.form_id("GetFutureThing").expect("interned")
            )]
        );
    }

    #[test]
    fn oracle_errors_fail_closed() {
        let table = table_with(vec![ConditionRecord::new(
            "IsBroken",
            0,
            ComparisonRecord::Literal(0.0),
        )]);
        let (verdict, faults) = run(&table, &GlobalSnapshot::new(), 1);
        assert!(!verdict);
        assert!(matches!(faults.as_slice(), [Fault::OracleFailure { .. }]));

        // Unknown actor for a known function also fails closed.
        let table = table_with(vec![ConditionRecord::new(
            "GetLevel",
            3,
            ComparisonRecord::Literal(0.0),
        )]);
        let (verdict, faults) = run(&table, &GlobalSnapshot::new(), 77);
        assert!(!verdict);
        assert_eq!(faults.len(), 1);
    }

    #[test]
    fn malformed_operator_fails_closed() {
        let table = table_with(vec![ConditionRecord::new(
            "GetLevel",
            42,
            ComparisonRecord::Literal(0.0),
        )]);
        let (verdict, faults) = run(&table, &GlobalSnapshot::new(), 1);
        assert!(!verdict);
        assert_eq!(faults, vec![Fault::UnknownOperator(42)]);
    }

    #[test]
    fn globals_as_comparison_and_function() {
        let table = table_with(vec![
            ConditionRecord::new("GetLevel", 3, ComparisonRecord::Global("GV_MinLevel".into())),
            ConditionRecord::new("GetGlobalValue", 0, ComparisonRecord::Literal(1.0))
                .with_param1(ParamRecord::reference("GV_Enabled")),
        ]);
        let globals = GlobalSnapshot::new()
            .with_named(&table, "GV_MinLevel", 8.0)
            .with_named(&table, "GV_Enabled", 1.0);
        let (verdict, faults) = run(&table, &globals, 1);
        assert!(verdict);
        assert!(faults.is_empty());

        let (verdict, faults) = run(&table, &GlobalSnapshot::new(), 1);
        assert!(!verdict);
        assert_eq!(
            faults,
            vec![Fault::MissingGlobal(table.form_id("GV_MinLevel").expect("interned"))]
        );
    }

    #[test]
    fn global_value_without_reference_uses_literal() {
        let table = table_with(vec![
            ConditionRecord::new("GetGlobalValue", 0, ComparisonRecord::Literal(2.5))
                .with_param1(ParamRecord::literal(2.5)),
        ]);
        let (verdict, _) = run(&table, &GlobalSnapshot::new(), 1);
        assert!(verdict);
    }

    #[test]
    fn short_circuit_skips_later_rolls() {
        let table = table_with(vec![
            ConditionRecord::new("GetLevel", 2, ComparisonRecord::Literal(100.0)),
            ConditionRecord::new("GetRandomPercent", 4, ComparisonRecord::Literal(100.0)),
        ]);
        let registry = FunctionRegistry::new().with_host("GetLevel", 80);
        let functions = FunctionTable::bind(&registry, &table);
        let evaluator = ConditionEvaluator::new(&table, &functions, &LevelOracle);
        let rng = PcgRng;
        let globals = GlobalSnapshot::new();
        let mut scope = EvalScope::new(ActorRef(1), ActorRef(2), &globals, RollStream::new(&rng, 0));

        assert!(!evaluator.evaluate(&conditions_of(&table), &mut scope));
        assert_eq!(scope.rolls.consumed(), 0);
    }
}
