//! Room-and-corridor level generation.
//!
//! Rooms are placed with bounded retries, carved, and chained in placement
//! order by L-shaped corridors: a horizontal run along the first room's
//! center row, then a vertical run along the second room's center column.
use crate::config::GenerationParams;
use crate::geometry::TilePos;
use crate::rng::GameRng;

use super::{Room, Tile, TileGrid};

/// Output of one generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedLayout {
    pub grid: TileGrid,
    /// Rooms in placement order; the first is the spawn room.
    pub rooms: Vec<Room>,
    /// How many room slots were attempted.
    pub requested_rooms: u32,
}

impl GeneratedLayout {
    /// Fewer than two rooms were placed. Spawn resolution still succeeds
    /// through its fallback chain as long as any floor exists.
    pub fn is_degenerate(&self) -> bool {
        self.rooms.len() < 2
    }
}

/// Generates a wall-filled grid of `width / tile_size × height / tile_size`
/// tiles with carved rooms and corridors. Leftover pixels are truncated.
pub fn generate(
    width: u32,
    height: u32,
    tile_size: u32,
    params: &GenerationParams,
    rng: &mut GameRng,
) -> GeneratedLayout {
    let tile_size = tile_size.max(1);
    let columns = width / tile_size;
    let rows = height / tile_size;

    let (rooms, requested_rooms) = place_rooms(columns, rows, params, rng);

    let mut grid = TileGrid::new(columns, rows);
    for room in &rooms {
        for pos in room.tiles() {
            grid.set(pos, Tile::Floor);
        }
    }
    for pair in rooms.windows(2) {
        carve_corridor(&mut grid, pair[0].center(), pair[1].center());
    }

    GeneratedLayout {
        grid,
        rooms,
        requested_rooms,
    }
}

/// Places rooms without touching any grid.
///
/// Each slot gets `placement_attempts` candidates; a candidate is rejected
/// when it, grown by one tile, overlaps an accepted room. Slots whose
/// attempts all fail are skipped. Returns the rooms and the slot count.
pub fn place_rooms(
    columns: u32,
    rows: u32,
    params: &GenerationParams,
    rng: &mut GameRng,
) -> (Vec<Room>, u32) {
    let slots = rng
        .range_inclusive(params.room_count.min, params.room_count.max)
        .max(0) as u32;
    let columns = columns as i32;
    let rows = rows as i32;

    let mut rooms: Vec<Room> = Vec::with_capacity(slots as usize);
    for _ in 0..slots {
        for _ in 0..params.placement_attempts {
            let width = rng.range_inclusive(params.room_size.min, params.room_size.max);
            let height = rng.range_inclusive(params.room_size.min, params.room_size.max);
            let max_x = columns - width - 2;
            let max_y = rows - height - 2;
            if width <= 0 || height <= 0 || max_x < 1 || max_y < 1 {
                continue;
            }

            let candidate = Room::new(
                rng.range_inclusive(1, max_x),
                rng.range_inclusive(1, max_y),
                width,
                height,
            );
            let padded = candidate.expanded(1);
            if rooms.iter().all(|room| !padded.intersects(room)) {
                rooms.push(candidate);
                break;
            }
        }
    }

    (rooms, slots)
}

fn carve_corridor(grid: &mut TileGrid, from: TilePos, to: TilePos) {
    for x in from.x.min(to.x)..=from.x.max(to.x) {
        grid.set(TilePos::new(x, from.y), Tile::Floor);
    }
    for y in from.y.min(to.y)..=from.y.max(to.y) {
        grid.set(TilePos::new(to.x, y), Tile::Floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashSet, VecDeque};

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

    #[test]
    fn default_world_produces_forty_by_forty_grid() {
        let mut rng = GameRng::new(3);
        let layout = generate(2000, 2000, 50, &GenerationParams::default(), &mut rng);
        assert_eq!((layout.grid.width(), layout.grid.height()), (40, 40));
        assert!(!layout.rooms.is_empty());
        assert!(layout.rooms.len() <= 15);
        assert!((8..=15).contains(&layout.requested_rooms));
    }

    #[test]
    fn every_room_is_reachable_from_the_first() {
        for seed in 0..50 {
            let mut rng = GameRng::new(seed);
            let layout = generate(2000, 2000, 50, &GenerationParams::default(), &mut rng);
            let start = layout.rooms[0].center();
            let region = reachable(&layout.grid, start);
            for room in &layout.rooms {
                assert!(room.tiles().all(|pos| region.contains(&pos)), "seed {seed}");
            }
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let params = GenerationParams::default();
        let a = generate(1200, 800, 40, &params, &mut GameRng::new(11));
        let b = generate(1200, 800, 40, &params, &mut GameRng::new(11));
        assert_eq!(a, b);
    }

    #[test]
    fn tiny_grid_places_no_rooms() {
        let mut rng = GameRng::new(9);
        let layout = generate(200, 200, 50, &GenerationParams::default(), &mut rng);
        assert!(layout.rooms.is_empty());
        assert!(layout.is_degenerate());
        assert_eq!(layout.grid.floor_count(), 0);
    }

    #[test]
    fn corridor_turns_at_destination_column() {
        let mut grid = TileGrid::new(10, 10);
        carve_corridor(&mut grid, TilePos::new(1, 1), TilePos::new(6, 7));
        assert!(grid.is_floor(TilePos::new(6, 1)));
        assert!(grid.is_floor(TilePos::new(6, 7)));
        assert!(!grid.is_floor(TilePos::new(1, 7)));
    }
}
