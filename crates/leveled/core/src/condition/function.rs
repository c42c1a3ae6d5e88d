//! Condition function dispatch.
//!
//! Content names functions by string. The host builds a [`FunctionRegistry`]
//! once at start-up, and [`FunctionTable::bind`] turns it into a dispatch
//! table keyed by the interned names a given table actually uses. Names the
//! registry does not know stay unbound, and conditions using them fail closed.

use std::collections::HashMap;

use crate::ident::FormId;
use crate::table::LeveledTable;

/// Functions the resolver answers itself, without asking the host.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum BuiltinFunction {
    /// Integer roll in `0..=99` from the call's roll stream.
    GetRandomPercent,
    /// Current value of the global named by parameter 1.
    GetGlobalValue,
}

/// A bound condition function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConditionFunction {
    Builtin(BuiltinFunction),
    /// Forwarded to [`crate::ConditionOracle`] with this host code.
    Host(u16),
}

impl ConditionFunction {
    /// True for functions whose result depends on the roll stream.
    pub const fn is_randomized(&self) -> bool {
        matches!(self, Self::Builtin(BuiltinFunction::GetRandomPercent))
    }
}

/// Host-level catalogue of known function names.
#[derive(Clone, Debug)]
pub struct FunctionRegistry {
    // lowercase name -> function
    functions: HashMap<String, ConditionFunction>,
}

impl FunctionRegistry {
    /// Creates a registry containing only the built-in functions.
    pub fn new() -> Self {
        use strum::IntoEnumIterator;

        let functions = BuiltinFunction::iter()
            .map(|builtin| {
                (
                    builtin.as_ref().to_ascii_lowercase(),
                    ConditionFunction::Builtin(builtin),
                )
            })
            .collect();
        Self { functions }
    }

    /// Registers a host function under `name`. Re-registering replaces it.
    pub fn register_host(&mut self, name: &str, code: u16) -> &mut Self {
        self.functions
            .insert(name.to_ascii_lowercase(), ConditionFunction::Host(code));
        self
    }

    pub fn with_host(mut self, name: &str, code: u16) -> Self {
        self.register_host(name, code);
        self
    }

    pub fn get(&self, name: &str) -> Option<ConditionFunction> {
        self.functions.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatch table for one [`LeveledTable`].
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    bound: HashMap<FormId, ConditionFunction>,
}

impl FunctionTable {
    /// Binds every function name used by `table` against `registry`.
    pub fn bind(registry: &FunctionRegistry, table: &LeveledTable) -> Self {
        let mut bound = HashMap::new();
        for id in table.function_ids() {
            let Some(name) = table.name(id) else { continue };
            match registry.get(name) {
                Some(function) => {
                    bound.insert(id, function);
                }
                None => {
                    tracing::debug!("condition function '{}' has no handler", name);
                }
            }
        }
        Self { bound }
    }

    pub fn get(&self, id: FormId) -> Option<ConditionFunction> {
        self.bound.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered_case_insensitively() {
        let registry = FunctionRegistry::new();
        assert_eq!(
            registry.get("getrandompercent"),
            Some(ConditionFunction::Builtin(BuiltinFunction::GetRandomPercent))
        );
        assert_eq!(
            registry.get("GetGlobalValue"),
            Some(ConditionFunction::Builtin(BuiltinFunction::GetGlobalValue))
        );
        assert_eq!(registry.get("GetIsID"), None);
    }

    #[test]
    fn host_functions_extend_registry() {
        let registry = FunctionRegistry::new()
            .with_host("GetIsID", 72)
            .with_host("GetLevel", 80);
        assert_eq!(registry.get("getisid"), Some(ConditionFunction::Host(72)));
        assert_eq!(registry.len(), 4);
        assert!(!ConditionFunction::Host(72).is_randomized());
        assert!(ConditionFunction::Builtin(BuiltinFunction::GetRandomPercent).is_randomized());
    }
}
