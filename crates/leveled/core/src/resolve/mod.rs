//! Resolver core: list id in, terminal objects with quantities out.
//!
//! Expansion is iterative over an arena of frames. Each frame is one list
//! being resolved for some quantity; nested lists become child frames that
//! remember their parent, which gives both the depth counter and the
//! ancestor chain used to reject cycles. A rejected child only drops its own
//! branch; siblings keep resolving.
//!
//! ```text
//! Start -> SelectEntries -> { ExpandTerminal | ExpandNestedList } -> Aggregate -> Done
//! ```

mod select;

pub use select::{EntrySelector, Pick};

use std::collections::HashMap;

use crate::aggregate::{ItemCount, aggregate};
use crate::condition::{ConditionEvaluator, EvalScope, FunctionRegistry, FunctionTable};
use crate::config::ResolverConfig;
use crate::env::{ConditionOracle, GlobalSnapshot, PcgRng, RngOracle, RollStream};
use crate::error::Fault;
use crate::ident::{ActorRef, FormId, ListIndex};
use crate::table::{EntryTarget, LeveledTable, ListFlags};

static DEFAULT_RNG: PcgRng = PcgRng;

/// Per-call inputs supplied by the host.
#[derive(Clone, Copy, Debug)]
pub struct ResolveContext<'c> {
    pub subject: ActorRef,
    pub target: ActorRef,
    /// Subject level used for entry level tiers.
    pub level: u16,
    pub globals: &'c GlobalSnapshot,
    /// Seed of the call's roll stream.
    pub seed: u64,
}

impl<'c> ResolveContext<'c> {
    pub fn new(subject: ActorRef, globals: &'c GlobalSnapshot) -> Self {
        Self {
            subject,
            target: ActorRef::NONE,
            level: 0,
            globals,
            seed: 0,
        }
    }

    pub fn with_target(mut self, target: ActorRef) -> Self {
        self.target = target;
        self
    }

    pub fn with_level(mut self, level: u16) -> Self {
        self.level = level;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// One terminal output before final aggregation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputRecord {
    pub object: FormId,
    pub count: u32,
    /// Deepest value multiplier applied on the way to this object.
    pub value_multiplier: Option<f32>,
    /// Deepest owning template annotation.
    pub template: Option<FormId>,
}

/// Full result of one call: merged records plus every contained fault.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Resolution {
    pub records: Vec<OutputRecord>,
    pub faults: Vec<Fault>,
}

impl Resolution {
    /// Object totals, see [`aggregate`].
    pub fn totals(&self) -> Vec<ItemCount> {
        aggregate(&self.records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct Frame {
    list: ListIndex,
    requested: u32,
    depth: u8,
    parent: Option<usize>,
    value_multiplier: Option<f32>,
    template: Option<FormId>,
}

/// Merges records per object as they are emitted.
#[derive(Default)]
struct Accumulator {
    records: Vec<OutputRecord>,
    slots: HashMap<FormId, usize>,
}

impl Accumulator {
    fn push(&mut self, record: OutputRecord) {
        match self.slots.get(&record.object) {
            Some(&slot) => {
                let merged = &mut self.records[slot];
                merged.count = merged.count.saturating_add(record.count);
                // Multipliers describe one stack; the later one wins.
                if record.value_multiplier.is_some() {
                    merged.value_multiplier = record.value_multiplier;
                }
                if record.template.is_some() {
                    merged.template = record.template;
                }
            }
            None => {
                self.slots.insert(record.object, self.records.len());
                self.records.push(record);
            }
        }
    }
}

/// Resolves lists of one immutable table. Cheap to share across threads.
pub struct Resolver<'a> {
    table: &'a LeveledTable,
    functions: FunctionTable,
    oracle: &'a dyn ConditionOracle,
    rng: &'a dyn RngOracle,
    config: ResolverConfig,
}

impl<'a> Resolver<'a> {
    /// Binds `registry` against `table` and uses [`PcgRng`] for rolls.
    pub fn new(
        table: &'a LeveledTable,
        registry: &FunctionRegistry,
        oracle: &'a dyn ConditionOracle,
    ) -> Self {
        Self {
            table,
            functions: FunctionTable::bind(registry, table),
            oracle,
            rng: &DEFAULT_RNG,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_rng(mut self, rng: &'a dyn RngOracle) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn table(&self) -> &'a LeveledTable {
        self.table
    }

    /// Resolves `list` and returns aggregated object totals.
    pub fn resolve(&self, list: &str, ctx: &ResolveContext<'_>, requested: i64) -> Vec<ItemCount> {
        self.resolve_records(list, ctx, requested).totals()
    }

    /// Resolves `list` and returns records plus faults.
    pub fn resolve_records(
        &self,
        list: &str,
        ctx: &ResolveContext<'_>,
        requested: i64,
    ) -> Resolution {
        match self.table.lookup(list) {
            Some(index) => self.resolve_index(index, ctx, requested),
            None => {
                let fault = Fault::UnknownList(list.to_string());
                tracing::warn!(code = fault.error_code(), "{}", fault);
                Resolution {
                    records: Vec::new(),
                    faults: vec![fault],
                }
            }
        }
    }

    /// Resolves the list stored at `index`.
    pub fn resolve_index(
        &self,
        index: ListIndex,
        ctx: &ResolveContext<'_>,
        requested: i64,
    ) -> Resolution {
        let mut scope = EvalScope::new(
            ctx.subject,
            ctx.target,
            ctx.globals,
            RollStream::new(self.rng, ctx.seed),
        );

        let requested = match u32::try_from(requested) {
            Ok(0) => return Resolution::default(),
            Ok(count) if count <= self.config.max_requested_count => count,
            _ => {
                scope.record(self.table, Fault::RequestedCountOutOfRange(requested));
                return Resolution {
                    records: Vec::new(),
                    faults: scope.faults,
                };
            }
        };

        let records = self.expand(index, requested, ctx.level, &mut scope);
        Resolution {
            records,
            faults: scope.faults,
        }
    }

    fn expand(
        &self,
        root: ListIndex,
        requested: u32,
        level: u16,
        scope: &mut EvalScope<'_>,
    ) -> Vec<OutputRecord> {
        let evaluator = ConditionEvaluator::new(self.table, &self.functions, self.oracle);
        let selector = EntrySelector::new(self.table, evaluator);

        let mut frames = vec![Frame {
            list: root,
            requested,
            depth: 0,
            parent: None,
            value_multiplier: None,
            template: None,
        }];
        let mut pending = vec![0usize];
        let mut output = Accumulator::default();

        while let Some(at) = pending.pop() {
            let (list_index, requested, depth, value_multiplier, template) = {
                let frame = &frames[at];
                (
                    frame.list,
                    frame.requested,
                    frame.depth,
                    frame.value_multiplier,
                    frame.template,
                )
            };

            // Start
            let Some(list) = self.table.list(list_index) else {
                continue;
            };
            let flags = match list.flags() {
                Ok(flags) => flags,
                Err(fault) => {
                    scope.record(self.table, fault);
                    continue;
                }
            };
            if list.is_empty() {
                continue;
            }
            if !evaluator.evaluate(&list.conditions, scope) {
                tracing::debug!(
                    list = self.table.name(list.id).unwrap_or("-"),
                    "list gate failed"
                );
                continue;
            }
            // Per-item lists draw once per unit; nested counts can multiply past the cap.
            let max = self.config.max_requested_count;
            let requested = if flags.contains(ListFlags::CALCULATE_FOR_EACH_ITEM)
                && requested > max
            {
                scope.record(
                    self.table,
                    Fault::DrawsClamped {
                        list: list.id,
                        requested,
                        max,
                    },
                );
                max
            } else {
                requested
            };

            // SelectEntries
            let picks = selector.select(list, flags, requested, level, scope);

            let mut children = Vec::new();
            for pick in picks {
                let entry = &list.entries[pick.entry];
                let value_multiplier = entry.value_multiplier.or(value_multiplier);
                let template = entry.template.or(template);

                match entry.target {
                    // ExpandTerminal
                    EntryTarget::Object(object) => output.push(OutputRecord {
                        object,
                        count: pick.count,
                        value_multiplier,
                        template,
                    }),
                    // ExpandNestedList
                    EntryTarget::List(child) => {
                        let child_depth = depth.saturating_add(1);
                        if let Some(fault) = self.guard(&frames, at, child, child_depth) {
                            scope.record(self.table, fault);
                            continue;
                        }
                        frames.push(Frame {
                            list: child,
                            requested: pick.count,
                            depth: child_depth,
                            parent: Some(at),
                            value_multiplier,
                            template,
                        });
                        children.push(frames.len() - 1);
                    }
                }
            }
            // Reverse so children resolve in entry order.
            pending.extend(children.into_iter().rev());
        }

        // Aggregate
        output.records
    }

    /// Rejects a child that is already on the path to `at` or too deep.
    fn guard(&self, frames: &[Frame], at: usize, child: ListIndex, depth: u8) -> Option<Fault> {
        let child_id = self.table.list(child).map(|list| list.id)?;

        let mut cursor = Some(at);
        while let Some(index) = cursor {
            if frames[index].list == child {
                return Some(Fault::CycleDetected { list: child_id });
            }
            cursor = frames[index].parent;
        }

        if depth > self.config.max_depth {
            return Some(Fault::DepthExceeded {
                list: child_id,
                max_depth: self.config.max_depth,
            });
        }
        None
    }
}
