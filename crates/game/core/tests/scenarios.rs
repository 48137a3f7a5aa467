//! End-to-end checks of generation, spawning, AI and direct combat.
use std::sync::Arc;

use game_core::combat::resolve_direct;
use game_core::map::{Terrain, TileGrid};
use game_core::npc::level_range;
use game_core::{
    AnimationState, DungeonInstance, GameRng, InstanceId, NpcEntity, NpcId, NpcSpawner, PlayerId,
    Ruleset, Target, Vec2, tick_npcs,
};

fn open_grid(size: usize) -> TileGrid {
    let rows: Vec<String> = (0..size).map(|_| ".".repeat(size)).collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    TileGrid::from_ascii(&rows)
}

#[test]
fn default_world_generates_a_playable_first_floor() {
    for seed in 0..50 {
        let (instance, report) = DungeonInstance::generate(
            InstanceId(seed),
            1,
            2000,
            2000,
            50,
            Arc::new(Ruleset::default()),
            seed,
        )
        .unwrap();

        assert_eq!((instance.grid().width(), instance.grid().height()), (40, 40));
        assert!(instance.rooms().len() <= 15);
        assert!(instance.is_walkable(instance.spawn().position));
        assert!(instance.is_walkable(instance.ladder().position));
        assert_ne!(instance.spawn().tile, instance.ladder().tile);
        assert!((8..=15).contains(&report.requested_rooms));

        // floor 1 spawns levels 1..=4, all below the evolution threshold
        for npc in instance.npcs() {
            assert!((1..=4).contains(&npc.level));
            assert_eq!(npc.species, "zubat");
        }
    }
}

#[test]
fn species_switches_at_level_twenty_two() {
    assert_eq!(level_range(10), (10, 22));

    let rules = Ruleset::default();
    let catalog = &rules.catalog;
    assert_eq!(catalog.species_for_level(21).unwrap().name, "zubat");
    assert_eq!(catalog.species_for_level(22).unwrap().name, "golbat");

    let spawner = NpcSpawner::new(&rules, 50);
    let mut rng = GameRng::new(10);
    let npc = spawner
        .spawn_at_level(NpcId(0), 25, Vec2::new(200.0, 200.0), &mut rng)
        .unwrap();
    assert_eq!(npc.species, "golbat");
    assert_eq!(npc.level, 25);

    let npc = spawner
        .spawn_at_level(NpcId(1), 21, Vec2::new(200.0, 200.0), &mut rng)
        .unwrap();
    assert_eq!(npc.species, "zubat");
}

#[test]
fn npc_in_range_closes_distance_along_the_y_axis() {
    let rules = Ruleset::default();
    let grid = open_grid(10);
    let player = PlayerId::new("alice");
    let combatant = rules.combatant("pikachu", 5);
    let targets = [Target {
        player: &player,
        position: Vec2::new(100.0, 100.0),
        hp_ratio: 1.0,
        combatant: &combatant,
    }];
    let mut npcs = vec![NpcEntity::new(NpcId(0), "zubat", 5, 40, Vec2::new(100.0, 140.0))];

    tick_npcs(&mut npcs, &targets, Terrain::new(&grid, 50), &rules, &mut GameRng::new(1));

    assert_eq!(npcs[0].position, Vec2::new(100.0, 138.0));
    assert_eq!(npcs[0].animation, AnimationState::Walk);
}

#[test]
fn lethal_direct_attack_removes_the_npc() {
    let mut npcs = vec![
        NpcEntity::new(NpcId(0), "zubat", 5, 30, Vec2::new(100.0, 140.0)),
        NpcEntity::new(NpcId(1), "zubat", 5, 30, Vec2::new(300.0, 300.0)),
    ];

    let affected = resolve_direct(&mut npcs, Vec2::new(100.0, 100.0), 50.0, 40);

    assert_eq!(affected.len(), 1);
    assert_eq!(affected[0].id, NpcId(0));
    assert_eq!(affected[0].damage, 40);
    assert_eq!(affected[0].current_hp, 0);
    assert_eq!(npcs.len(), 1);
    assert_eq!(npcs[0].id, NpcId(1));
}
