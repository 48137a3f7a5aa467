use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use game_core::combat::resolve_direct;
use game_core::map::{Terrain, TileGrid, place_rooms};
use game_core::{
    DungeonInstance, GameRng, GenerationParams, InstanceId, NpcEntity, NpcId, PlayerId,
    PlayerProfile, Ruleset, TilePos, Vec2,
};
use proptest::prelude::*;

fn reachable(grid: &TileGrid, start: TilePos) -> HashSet<TilePos> {
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(pos) = queue.pop_front() {
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let next = pos.offset(dx, dy);
            if grid.is_floor(next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

fn generate(seed: u64, floor: u32, width: u32, height: u32, tile_size: u32) -> DungeonInstance {
    DungeonInstance::generate(
        InstanceId(seed),
        floor,
        width,
        height,
        tile_size,
        Arc::new(Ruleset::default()),
        seed,
    )
    .map(|(instance, _)| instance)
    .expect("grids of at least 12x12 tiles always place a room")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn ladder_is_reachable_from_spawn(seed in any::<u64>(), floor in 1_u32..=20) {
        let instance = generate(seed, floor, 2000, 2000, 50);
        prop_assume!(instance.rooms().len() >= 2);
        let connected = reachable(instance.grid(), instance.spawn().tile);
        prop_assert!(
            connected.contains(&instance.ladder().tile),
            "seed={seed}: ladder {:?} unreachable from spawn {:?}",
            instance.ladder().tile,
            instance.spawn().tile
        );
    }

    #[test]
    fn exploration_never_forgets(
        seed in any::<u64>(),
        path in prop::collection::vec((0.0_f32..2000.0, 0.0_f32..2000.0), 1..40),
    ) {
        let mut instance = generate(seed, 1, 2000, 2000, 50);
        let player = PlayerId::new("explorer");
        instance.assign_player(player.clone(), PlayerProfile::default()).unwrap();

        let mut previous = instance.player(&player).unwrap().explored.clone();
        for (x, y) in path {
            instance.update_explored(&player, Vec2::new(x, y)).unwrap();
            let current = &instance.player(&player).unwrap().explored;
            prop_assert!(current.covers(&previous));
            prop_assert!(current.explored_count() >= previous.explored_count());
            previous = current.clone();
        }
    }

    #[test]
    fn padded_rooms_never_intersect(
        seed in any::<u64>(),
        columns in 0_u32..80,
        rows in 0_u32..80,
    ) {
        let mut rng = GameRng::new(seed);
        let (rooms, requested) = place_rooms(columns, rows, &GenerationParams::default(), &mut rng);
        prop_assert!(rooms.len() as u32 <= requested);
        for (idx, a) in rooms.iter().enumerate() {
            prop_assert!(a.x >= 1 && a.y >= 1);
            prop_assert!(a.x + a.width < columns as i32 && a.y + a.height < rows as i32);
            for b in &rooms[idx + 1..] {
                prop_assert!(!a.expanded(1).intersects(b), "{a:?} touches {b:?}");
            }
        }
    }

    #[test]
    fn fainted_npcs_leave_the_roster(
        hps in prop::collection::vec(1_u32..120, 1..8),
        hits in prop::collection::vec(0_u32..60, 1..12),
    ) {
        let mut npcs: Vec<NpcEntity> = hps
            .iter()
            .enumerate()
            .map(|(idx, hp)| {
                NpcEntity::new(NpcId(idx as u32), "zubat", 5, *hp, Vec2::new(100.0 + idx as f32, 100.0))
            })
            .collect();

        for damage in hits {
            let affected = resolve_direct(&mut npcs, Vec2::new(100.0, 100.0), 50.0, damage);
            for hit in &affected {
                prop_assert_eq!(hit.damage, damage);
                prop_assert!(hit.current_hp <= hit.max_hp);
                if hit.current_hp == 0 {
                    prop_assert!(npcs.iter().all(|npc| npc.id != hit.id));
                }
            }
            prop_assert!(npcs.iter().all(|npc| npc.hp > 0 && npc.hp <= npc.max_hp));
        }
    }

    #[test]
    fn move_validity_matches_corner_probe(
        cells in prop::collection::vec(any::<bool>(), 64),
        x in -60.0_f32..460.0,
        y in -60.0_f32..460.0,
        size in 1.0_f32..120.0,
    ) {
        let rows: Vec<String> = cells
            .chunks(8)
            .map(|row| row.iter().map(|open| if *open { '.' } else { '#' }).collect())
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let grid = TileGrid::from_ascii(&rows);
        let terrain = Terrain::new(&grid, 50);

        let floor_at = |px: f32, py: f32| {
            let (tx, ty) = ((px / 50.0).floor() as i32, (py / 50.0).floor() as i32);
            (0..8).contains(&tx) && (0..8).contains(&ty) && cells[(ty * 8 + tx) as usize]
        };
        let expected = floor_at(x, y)
            && floor_at(x + size, y)
            && floor_at(x, y + size)
            && floor_at(x + size, y + size);
        prop_assert_eq!(terrain.is_valid_move(Vec2::new(x, y), size, size), expected);
    }
}

#[test]
fn spawn_and_ladder_are_walkable_across_ten_thousand_layouts() {
    let mut dims = GameRng::new(0x5eed);
    let rules = Arc::new(Ruleset::default());
    let tile_sizes = [16_u32, 25, 32, 40, 50, 64];

    for trial in 0..10_000_u64 {
        let tile_size = *dims.choose(&tile_sizes).unwrap();
        let columns = dims.range_inclusive(12, 60) as u32;
        let rows = dims.range_inclusive(12, 60) as u32;
        let slack = dims.range_inclusive(0, tile_size as i32 - 1) as u32;
        let width = columns * tile_size + slack;
        let height = rows * tile_size + slack;
        let floor = dims.range_inclusive(1, 30) as u32;

        let (instance, report) = DungeonInstance::generate(
            InstanceId(trial),
            floor,
            width,
            height,
            tile_size,
            Arc::clone(&rules),
            trial,
        )
        .unwrap_or_else(|err| panic!("trial {trial} ({width}x{height}@{tile_size}): {err}"));

        let spawn = instance.spawn();
        let ladder = instance.ladder();
        assert!(instance.is_walkable(spawn.position), "trial {trial}: spawn {spawn:?}");
        assert!(instance.is_walkable(ladder.position), "trial {trial}: ladder {ladder:?}");
        assert_eq!(instance.grid().width(), columns);
        assert_eq!(instance.grid().height(), rows);
        if !report.degenerate {
            assert_ne!(spawn.tile, ladder.tile, "trial {trial}");
        }
    }
}
