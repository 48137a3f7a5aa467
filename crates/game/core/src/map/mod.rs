//! Tile grid, rooms and world-space collision queries.
pub mod generator;
mod grid;
mod room;

pub use generator::{GeneratedLayout, generate, place_rooms};
pub use grid::{Tile, TileGrid};
pub use room::Room;

use crate::geometry::{Aabb, TilePos, WorldPos};

/// Read-only collision view over a grid in world coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Terrain<'a> {
    grid: &'a TileGrid,
    tile_size: u32,
}

impl<'a> Terrain<'a> {
    pub fn new(grid: &'a TileGrid, tile_size: u32) -> Self {
        Self { grid, tile_size }
    }

    pub fn grid(&self) -> &'a TileGrid {
        self.grid
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn tile_at(&self, position: WorldPos) -> TilePos {
        TilePos::from_world(position, self.tile_size)
    }

    /// The containing tile is in bounds and `Floor`.
    pub fn is_walkable(&self, position: WorldPos) -> bool {
        self.grid.is_floor(self.tile_at(position))
    }

    /// All four corners of the box at `position` are walkable.
    pub fn is_valid_move(&self, position: WorldPos, width: f32, height: f32) -> bool {
        Aabb::new(position, width, height)
            .corners()
            .iter()
            .all(|corner| self.is_walkable(*corner))
    }

    /// Bresenham walk between the tiles containing `from` and `to`; every
    /// visited tile, endpoints included, must be floor.
    pub fn line_of_sight(&self, from: WorldPos, to: WorldPos) -> bool {
        let start = self.tile_at(from);
        let end = self.tile_at(to);

        let dx = (end.x - start.x).abs();
        let dy = -(end.y - start.y).abs();
        let step_x = if start.x < end.x { 1 } else { -1 };
        let step_y = if start.y < end.y { 1 } else { -1 };
        let mut err = dx + dy;
        let mut current = start;

        loop {
            if !self.grid.is_floor(current) {
                return false;
            }
            if current == end {
                return true;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                current.x += step_x;
            }
            if doubled <= dx {
                err += dx;
                current.y += step_y;
            }
        }
    }
}
