//! Entry selection for a single list.
//!
//! Activation (level tiers, threshold overrides) is computed once per list
//! resolution. Each draw then rolls chance-none, filters the active entries
//! by their conditions (each evaluated exactly once for that draw), and
//! either emits every eligible entry or draws one by weight.

use crate::condition::{ConditionEvaluator, EvalScope};
use crate::error::Fault;
use crate::table::{LeveledList, LeveledTable, ListFlags};

/// One selected entry and the quantity it produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pick {
    /// Index into [`LeveledList::entries`].
    pub entry: usize,
    /// Base count x count multiplier x repetition.
    pub count: u32,
}

/// Entry that survived activation, with its per-unit count.
#[derive(Clone, Copy, Debug)]
struct Active {
    entry: usize,
    unit_count: u32,
}

pub struct EntrySelector<'a> {
    table: &'a LeveledTable,
    evaluator: ConditionEvaluator<'a>,
}

impl<'a> EntrySelector<'a> {
    pub fn new(table: &'a LeveledTable, evaluator: ConditionEvaluator<'a>) -> Self {
        Self { table, evaluator }
    }

    /// Selects entries of `list` for `requested` units.
    ///
    /// Picks of the same entry across draws are merged; order follows first
    /// selection.
    pub fn select(
        &self,
        list: &LeveledList,
        flags: ListFlags,
        requested: u32,
        level: u16,
        scope: &mut EvalScope<'_>,
    ) -> Vec<Pick> {
        let active = self.activate(list, flags, level, scope);
        if active.is_empty() || requested == 0 {
            return Vec::new();
        }

        let (draws, repetition) = if flags.contains(ListFlags::CALCULATE_FOR_EACH_ITEM) {
            (requested, 1)
        } else {
            (1, requested)
        };

        let mut picks: Vec<Pick> = Vec::new();
        let mut eligible: Vec<Active> = Vec::with_capacity(active.len());
        for _ in 0..draws {
            if list.chance_none > 0 && scope.rolls.percent() < u32::from(list.chance_none) {
                continue;
            }

            eligible.clear();
            for candidate in &active {
                let entry = &list.entries[candidate.entry];
                if self.evaluator.evaluate(&entry.conditions, scope) {
                    eligible.push(*candidate);
                }
            }

            if flags.contains(ListFlags::USE_ALL) {
                for chosen in &eligible {
                    merge(&mut picks, chosen, repetition);
                }
            } else if let Some(chosen) = draw_weighted(list, &eligible, scope) {
                merge(&mut picks, &chosen, repetition);
            }
        }

        tracing::debug!(
            list = self.table.name(list.id).unwrap_or("-"),
            draws,
            picked = picks.len(),
            "entries selected"
        );
        picks
    }

    /// Applies level tiers and threshold overrides.
    fn activate(
        &self,
        list: &LeveledList,
        flags: ListFlags,
        level: u16,
        scope: &mut EvalScope<'_>,
    ) -> Vec<Active> {
        let tier = if flags.contains(ListFlags::CALCULATE_FROM_ALL_LEVELS) {
            None
        } else {
            list.entries
                .iter()
                .map(|entry| entry.level)
                .filter(|&entry_level| entry_level <= level)
                .max()
        };

        // The count global is read once per list, and only if someone needs it.
        let needs_global = list.entries.iter().any(|entry| entry.is_threshold_gated());
        let global_value = if needs_global {
            self.count_global_value(list, scope)
        } else {
            None
        };

        list.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.level <= level)
            .filter(|(_, entry)| tier.is_none_or(|tier| entry.level == tier))
            .filter_map(|(index, entry)| {
                let base = if entry.is_threshold_gated() {
                    entry.threshold_count(global_value?)?
                } else {
                    1
                };
                let unit_count = base.saturating_mul(entry.count_multiplier);
                (unit_count > 0).then_some(Active {
                    entry: index,
                    unit_count,
                })
            })
            .collect()
    }

    fn count_global_value(&self, list: &LeveledList, scope: &mut EvalScope<'_>) -> Option<f32> {
        let Some(global) = list.count_global else {
            scope.record(self.table, Fault::MissingCountGlobal { list: list.id });
            return None;
        };
        match scope.globals.get(global) {
            Some(value) => Some(value),
            None => {
                scope.record(self.table, Fault::MissingGlobal(global));
                None
            }
        }
    }
}

/// Single weighted draw. Zero total weight is the chance-of-nothing outcome.
fn draw_weighted(
    list: &LeveledList,
    eligible: &[Active],
    scope: &mut EvalScope<'_>,
) -> Option<Active> {
    let total: u64 = eligible
        .iter()
        .map(|active| u64::from(list.entries[active.entry].weight))
        .sum();
    if total == 0 {
        return None;
    }

    let mut roll = match u32::try_from(total) {
        Ok(bound) => u64::from(scope.rolls.below(bound)),
        Err(_) => scope.rolls.below_wide(total),
    };
    for active in eligible {
        let weight = u64::from(list.entries[active.entry].weight);
        if roll < weight {
            return Some(*active);
        }
        roll -= weight;
    }
    None
}

fn merge(picks: &mut Vec<Pick>, chosen: &Active, repetition: u32) {
    let count = chosen.unit_count.saturating_mul(repetition);
    match picks.iter_mut().find(|pick| pick.entry == chosen.entry) {
        Some(pick) => pick.count = pick.count.saturating_add(count),
        None => picks.push(Pick {
            entry: chosen.entry,
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{FunctionRegistry, FunctionTable};
    use crate::env::{GlobalSnapshot, NullOracle, PcgRng, RollStream};
    use crate::ident::ActorRef;
    use crate::record::{EntryRecord, ListRecord};

    fn select(table: &LeveledTable, requested: u32, level: u16, seed: u64) -> (Vec<Pick>, u64) {
        let functions = FunctionTable::bind(&FunctionRegistry::new(), table);
        let evaluator = ConditionEvaluator::new(table, &functions, &NullOracle);
        let selector = EntrySelector::new(table, evaluator);
        let rng = PcgRng;
        let globals = GlobalSnapshot::new();
        let mut scope = EvalScope::new(
            ActorRef(1),
            ActorRef::NONE,
            &globals,
            RollStream::new(&rng, seed),
        );
        let list = table.lists().next().expect("one list");
        let flags = list.flags().expect("valid flags");
        let picks = selector.select(list, flags, requested, level, &mut scope);
        (picks, scope.rolls.consumed())
    }

    #[test]
    fn use_all_emits_everything_without_rolling() {
        let table = LeveledTable::from_records([(
            "LL",
            ListRecord::new(ListFlags::USE_ALL.bits())
                .with_entry(EntryRecord::new("A"))
                .with_entry(EntryRecord::new("B").with_count(3)),
        )]);
        let (picks, rolls) = select(&table, 2, 0, 5);
        assert_eq!(
            picks,
            vec![Pick { entry: 0, count: 2 }, Pick { entry: 1, count: 6 }]
        );
        assert_eq!(rolls, 0);
    }

    #[test]
    fn single_draw_picks_one_entry() {
        let table = LeveledTable::from_records([(
            "LL",
            ListRecord::new(0)
                .with_entry(EntryRecord::new("A"))
                .with_entry(EntryRecord::new("B")),
        )]);
        let (picks, rolls) = select(&table, 4, 0, 9);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].count, 4);
        assert_eq!(rolls, 1);
    }

    #[test]
    fn zero_weights_are_never_drawn() {
        let table = LeveledTable::from_records([(
            "LL",
            ListRecord::new(0)
                .with_entry(EntryRecord::new("A").with_weight(0))
                .with_entry(EntryRecord::new("B")),
        )]);
        for seed in 0..64 {
            let (picks, _) = select(&table, 1, 0, seed);
            assert_eq!(picks, vec![Pick { entry: 1, count: 1 }]);
        }
    }

    #[test]
    fn each_item_draws_independently() {
        let table = LeveledTable::from_records([(
            "LL",
            ListRecord::new(ListFlags::CALCULATE_FOR_EACH_ITEM.bits())
                .with_entry(EntryRecord::new("A"))
                .with_entry(EntryRecord::new("B")),
        )]);
        let (picks, rolls) = select(&table, 50, 0, 3);
        let total: u32 = picks.iter().map(|pick| pick.count).sum();
        assert_eq!(total, 50);
        assert_eq!(rolls, 50);
        assert_eq!(picks.len(), 2, "50 fair draws should hit both entries");
    }

    #[test]
    fn oversized_weights_keep_every_entry_reachable() {
        let table = LeveledTable::from_records([(
            "LL",
            ListRecord::new(0)
                .with_entry(EntryRecord::new("A").with_weight(u32::MAX))
                .with_entry(EntryRecord::new("B").with_weight(u32::MAX)),
        )]);
        let mut drawn = [0u32; 2];
        for seed in 0..64 {
            let (picks, rolls) = select(&table, 1, 0, seed);
            assert_eq!(rolls, 1);
            drawn[picks[0].entry] += 1;
        }
        assert!(drawn[0] > 0 && drawn[1] > 0, "draws {drawn:?}");
    }

    #[test]
    fn level_tiers_keep_highest_qualifying_level() {
        let records = |flags: ListFlags| {
            LeveledTable::from_records([(
                "LL",
                ListRecord::new(flags.bits())
                    .with_entry(EntryRecord::new("Pistol").with_level(1))
                    .with_entry(EntryRecord::new("Rifle").with_level(10))
                    .with_entry(EntryRecord::new("Cannon").with_level(40)),
            )])
        };

        let table = records(ListFlags::USE_ALL);
        let (picks, _) = select(&table, 1, 15, 0);
        assert_eq!(picks, vec![Pick { entry: 1, count: 1 }]);

        let table = records(ListFlags::USE_ALL | ListFlags::CALCULATE_FROM_ALL_LEVELS);
        let (picks, _) = select(&table, 1, 15, 0);
        assert_eq!(
            picks,
            vec![Pick { entry: 0, count: 1 }, Pick { entry: 1, count: 1 }]
        );

        let (picks, _) = select(&table, 1, 0, 0);
        assert!(picks.is_empty());
    }

    #[test]
    fn chance_none_of_hundred_yields_nothing() {
        let table = LeveledTable::from_records([(
            "LL",
            ListRecord::new(ListFlags::USE_ALL.bits())
                .with_chance_none(100)
                .with_entry(EntryRecord::new("A")),
        )]);
        let (picks, rolls) = select(&table, 1, 0, 1);
        assert!(picks.is_empty());
        assert_eq!(rolls, 1);
    }
}
