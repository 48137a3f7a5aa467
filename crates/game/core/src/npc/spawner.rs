//! Populates rooms with levelled wild creatures.
use crate::geometry::{TilePos, WorldPos};
use crate::ids::NpcId;
use crate::map::Room;
use crate::rng::GameRng;
use crate::rules::Ruleset;

use super::entity::{MoveSet, NpcEntity};

/// Inclusive level range for `floor`: `[max(1, floor), min + 2 + floor]`.
pub fn level_range(floor: u32) -> (u32, u32) {
    let min = floor.max(1);
    (min, min.saturating_add(2).saturating_add(floor))
}

fn clamp_i32(level: u32) -> i32 {
    i32::try_from(level).unwrap_or(i32::MAX)
}

#[derive(Clone, Copy, Debug)]
pub struct NpcSpawner<'a> {
    rules: &'a Ruleset,
    tile_size: u32,
}

impl<'a> NpcSpawner<'a> {
    pub fn new(rules: &'a Ruleset, tile_size: u32) -> Self {
        Self { rules, tile_size }
    }

    /// Spawns `0..=max_per_room` NPCs in every room except the first.
    /// Ids are assigned sequentially from `first_id`.
    pub fn spawn_npcs(
        &self,
        rooms: &[Room],
        floor: u32,
        first_id: u32,
        rng: &mut GameRng,
    ) -> Vec<NpcEntity> {
        let (min_level, max_level) = level_range(floor);
        let per_room = self.rules.config.npc.max_per_room as i32;

        let mut next_id = first_id;
        let mut npcs = Vec::new();
        for room in rooms.iter().skip(1) {
            let count = rng.range_inclusive(0, per_room);
            for _ in 0..count {
                let level = rng.range_inclusive(clamp_i32(min_level), clamp_i32(max_level)) as u32;
                let position = self.interior_position(room, rng);
                if let Some(npc) = self.spawn_at_level(NpcId(next_id), level, position, rng) {
                    npcs.push(npc);
                    next_id += 1;
                }
            }
        }
        npcs
    }

    /// One creature of whichever species the encounter table picks for
    /// `level`. `None` only if the catalog has no encounters.
    pub fn spawn_at_level(
        &self,
        id: NpcId,
        level: u32,
        position: WorldPos,
        rng: &mut GameRng,
    ) -> Option<NpcEntity> {
        let catalog = &self.rules.catalog;
        let species = catalog.species_for_level(level)?;
        let stats = self.rules.stats().calculate_stats(species, level);

        let mut moves = MoveSet::new();
        let eligible = species.moves_at(level);
        for mv in rng.sample(&eligible, moves.capacity()) {
            moves.push(mv);
        }
        if moves.is_empty() {
            moves.push(catalog.default_move.clone());
        }

        let mut npc = NpcEntity::new(id, &species.name, level, stats.hp, position);
        npc.moves = moves;
        npc.types = species.types.clone();
        npc.stats = stats;
        Some(npc)
    }

    /// Random tile one step inside the room's edges, or its center when the
    /// room is too thin for a margin.
    fn interior_position(&self, room: &Room, rng: &mut GameRng) -> WorldPos {
        let tile = match room.interior(1) {
            Some(inner) => TilePos::new(
                rng.range_inclusive(inner.x, inner.x + inner.width - 1),
                rng.range_inclusive(inner.y, inner.y + inner.height - 1),
            ),
            None => room.center(),
        };
        tile.to_world(self.tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    #[test]
    fn level_range_scales_with_floor() {
        assert_eq!(level_range(0), (1, 3));
        assert_eq!(level_range(1), (1, 4));
        assert_eq!(level_range(10), (10, 22));
        assert_eq!(level_range(u32::MAX), (u32::MAX, u32::MAX));
    }

    #[test]
    fn spawn_room_stays_empty() {
        let rules = Ruleset::default();
        let spawner = NpcSpawner::new(&rules, 50);
        let rooms = [Room::new(1, 1, 5, 5), Room::new(10, 10, 5, 5)];
        for seed in 0..30 {
            let npcs = spawner.spawn_npcs(&rooms, 1, 0, &mut GameRng::new(seed));
            assert!(npcs.len() <= 2);
            for npc in &npcs {
                let tile = TilePos::from_world(npc.position, 50);
                assert!(Room::new(11, 11, 3, 3).contains(tile));
                assert!((1..=4).contains(&npc.level));
                assert_eq!(npc.hp, npc.max_hp);
                assert!(!npc.moves.is_empty());
            }
        }
    }

    #[test]
    fn ids_are_sequential_and_unique() {
        let rules = Ruleset::default();
        let spawner = NpcSpawner::new(&rules, 50);
        let rooms: Vec<Room> = (0..8).map(|i| Room::new(i * 6, 1, 4, 4)).collect();
        let npcs = spawner.spawn_npcs(&rooms, 3, 7, &mut GameRng::new(99));
        for (offset, npc) in npcs.iter().enumerate() {
            assert_eq!(npc.id, NpcId(7 + offset as u32));
        }
    }

    #[test]
    fn high_level_zubat_samples_four_of_five_moves() {
        let rules = Ruleset::default();
        let spawner = NpcSpawner::new(&rules, 50);
        let npc = spawner
            .spawn_at_level(NpcId(0), 18, Vec2::ZERO, &mut GameRng::new(1))
            .unwrap();
        assert_eq!(npc.species, "zubat");
        assert_eq!(npc.moves.len(), 4);
        assert_eq!(npc.max_hp, 40 + 2 * 18);
    }

    #[test]
    fn empty_learnset_falls_back_to_default_move() {
        let mut rules = Ruleset::default();
        if let Some(zubat) = rules.catalog.species.get_mut("zubat") {
            zubat.learnset.clear();
        }
        let spawner = NpcSpawner::new(&rules, 50);
        let npc = spawner
            .spawn_at_level(NpcId(0), 3, Vec2::ZERO, &mut GameRng::new(1))
            .unwrap();
        assert_eq!(npc.moves.as_slice(), ["tackle".to_owned()]);
    }
}
