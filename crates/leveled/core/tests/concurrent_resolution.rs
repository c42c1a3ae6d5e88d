use std::thread;

use leveled_core::{
    ActorRef, ComparisonRecord, ConditionRecord, EntryRecord, FunctionRegistry, GlobalSnapshot,
    LeveledTable, ListFlags, ListRecord, NullOracle, ResolveContext, Resolver, compute_seed,
};

fn loot_table() -> LeveledTable {
    LeveledTable::from_records([
        (
            "LL_Raider",
            ListRecord::new(ListFlags::USE_ALL.bits())
                .with_entry(EntryRecord::new("LL_RaiderWeapon"))
                .with_entry(EntryRecord::new("Caps").with_count(15))
                .with_entry(
                    EntryRecord::new("Stimpak").with_condition(ConditionRecord::new(
                        "GetRandomPercent",
                        4,
                        ComparisonRecord::Literal(30.0),
                    )),
                ),
        ),
        (
            "LL_RaiderWeapon",
            ListRecord::new(0)
                .with_chance_none(10)
                .with_entry(EntryRecord::new("Pipe_Pistol").with_weight(4))
                .with_entry(EntryRecord::new("Pipe_Rifle").with_weight(2))
                .with_entry(EntryRecord::new("Combat_Shotgun")),
        ),
    ])
}

#[test]
fn resolutions_on_many_threads_match_sequential_results() {
    let table = loot_table();
    let registry = FunctionRegistry::new();
    let resolver = Resolver::new(&table, &registry, &NullOracle);
    let globals = GlobalSnapshot::new();

    let seeds: Vec<u64> = (0..256)
        .map(|nonce| compute_seed(0xC0FFEE, nonce, 7, 0))
        .collect();
    let sequential: Vec<_> = seeds
        .iter()
        .map(|&seed| {
            let ctx = ResolveContext::new(ActorRef(7), &globals).with_seed(seed);
            resolver.resolve_records("LL_Raider", &ctx, 1)
        })
        .collect();

    let parallel: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = seeds
            .chunks(32)
            .map(|chunk| {
                let resolver = &resolver;
                let globals = &globals;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|&seed| {
                            let ctx = ResolveContext::new(ActorRef(7), globals).with_seed(seed);
                            resolver.resolve_records("LL_Raider", &ctx, 1)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("worker panicked"))
            .collect()
    });

    assert_eq!(sequential, parallel);
    assert!(sequential.iter().all(|resolution| resolution.faults.is_empty()));
}
