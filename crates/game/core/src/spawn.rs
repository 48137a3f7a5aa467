//! Guaranteed-walkable spawn and ladder placement.
//!
//! Resolution walks an ordered fallback chain and reports which stage
//! produced the point, so callers can log anything past the first stage.
//! A result is always a `Floor` tile; when the grid has no floor at all the
//! resolver fails with [`SpawnError::NoWalkableTileFound`].
use crate::config::GameConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::geometry::{TilePos, WorldPos};
use crate::map::{Room, TileGrid};
use crate::rng::GameRng;

/// Fallback stage that produced a spawn or ladder point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpawnStrategy {
    RoomCenter,
    CenterNeighborhood,
    SpawnRoomScan,
    OtherRoomScan,
    Spiral,
    FullScan,
    /// Random interior tile of the ladder room.
    LadderRoom,
}

impl SpawnStrategy {
    /// Stages past the spawn room itself indicate a degenerate layout.
    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::OtherRoomScan | Self::Spiral | Self::FullScan)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnPoint {
    pub tile: TilePos,
    /// Top-left corner of `tile` in world coordinates.
    pub position: WorldPos,
    pub strategy: SpawnStrategy,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error("no walkable tile found in {width}x{height} grid")]
    NoWalkableTileFound { width: u32, height: u32 },
}

impl GameError for SpawnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoWalkableTileFound { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoWalkableTileFound { .. } => "SPAWN_NO_WALKABLE_TILE",
        }
    }
}

/// Fallback search over one grid and its rooms.
#[derive(Clone, Copy, Debug)]
pub struct SpawnResolver<'a> {
    grid: &'a TileGrid,
    rooms: &'a [Room],
    tile_size: u32,
    spiral_rings: i32,
}

impl<'a> SpawnResolver<'a> {
    pub fn new(grid: &'a TileGrid, rooms: &'a [Room], tile_size: u32) -> Self {
        Self {
            grid,
            rooms,
            tile_size,
            spiral_rings: crate::config::GenerationParams::DEFAULT_SPIRAL_RINGS,
        }
    }

    pub fn with_spiral_rings(mut self, rings: i32) -> Self {
        self.spiral_rings = rings.max(0);
        self
    }

    fn point(&self, tile: TilePos, strategy: SpawnStrategy) -> SpawnPoint {
        SpawnPoint {
            tile,
            position: tile.to_world(self.tile_size),
            strategy,
        }
    }

    fn no_walkable(&self) -> SpawnError {
        SpawnError::NoWalkableTileFound {
            width: self.grid.width(),
            height: self.grid.height(),
        }
    }

    /// Center used when there are no rooms to anchor the search.
    fn grid_center(&self) -> TilePos {
        TilePos::new(
            self.grid.width() as i32 / 2,
            self.grid.height() as i32 / 2,
        )
    }

    /// Player spawn point, anchored on the first room.
    pub fn resolve_spawn(&self) -> Result<SpawnPoint, SpawnError> {
        let Some((spawn_room, others)) = self.rooms.split_first() else {
            return self.nearest_walkable(self.grid_center());
        };
        let center = spawn_room.center();

        if self.grid.is_floor(center) {
            return Ok(self.point(center, SpawnStrategy::RoomCenter));
        }

        let reach = GameConfig::CENTER_NEIGHBORHOOD / 2;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let tile = center.offset(dx, dy);
                if self.grid.is_floor(tile) {
                    return Ok(self.point(tile, SpawnStrategy::CenterNeighborhood));
                }
            }
        }

        if let Some(tile) = spawn_room.tiles().find(|tile| self.grid.is_floor(*tile)) {
            return Ok(self.point(tile, SpawnStrategy::SpawnRoomScan));
        }

        if let Some(tile) = others
            .iter()
            .flat_map(Room::tiles)
            .find(|tile| self.grid.is_floor(*tile))
        {
            return Ok(self.point(tile, SpawnStrategy::OtherRoomScan));
        }

        self.nearest_walkable(center)
    }

    /// Ladder point: a random tile one step inside a non-spawn room when
    /// there are at least two rooms. Never returns `avoid` while any other
    /// walkable tile exists.
    pub fn resolve_ladder(
        &self,
        rng: &mut GameRng,
        avoid: Option<TilePos>,
    ) -> Result<SpawnPoint, SpawnError> {
        let usable = |tile: &TilePos| self.grid.is_floor(*tile) && Some(*tile) != avoid;

        let candidates = if self.rooms.len() >= 2 {
            &self.rooms[1..]
        } else {
            self.rooms
        };

        if let Some(room) = rng.choose(candidates).copied() {
            let interior: Vec<TilePos> = room
                .interior(1)
                .map(|inner| inner.tiles().filter(usable).collect())
                .unwrap_or_default();
            if let Some(tile) = rng.choose(&interior) {
                return Ok(self.point(*tile, SpawnStrategy::LadderRoom));
            }

            if let Some(tile) = room.tiles().find(usable) {
                return Ok(self.point(tile, SpawnStrategy::LadderRoom));
            }
            if let Some(tile) = self
                .rooms
                .iter()
                .filter(|other| **other != room)
                .flat_map(Room::tiles)
                .find(usable)
            {
                return Ok(self.point(tile, SpawnStrategy::OtherRoomScan));
            }
            if let Some(tile) = self.spiral(room.center(), usable) {
                return Ok(self.point(tile, SpawnStrategy::Spiral));
            }
        } else if let Some(tile) = self.spiral(self.grid_center(), usable) {
            return Ok(self.point(tile, SpawnStrategy::Spiral));
        }

        if let Some(tile) = self.grid.positions().find(usable) {
            return Ok(self.point(tile, SpawnStrategy::FullScan));
        }

        // The avoided tile is the only floor left.
        match avoid {
            Some(tile) if self.grid.is_floor(tile) => Ok(self.point(tile, SpawnStrategy::FullScan)),
            _ => Err(self.no_walkable()),
        }
    }

    /// Spiral search from `origin`, then a row-major scan of the whole grid.
    pub fn nearest_walkable(&self, origin: TilePos) -> Result<SpawnPoint, SpawnError> {
        if let Some(tile) = self.spiral(origin, |tile| self.grid.is_floor(*tile)) {
            return Ok(self.point(tile, SpawnStrategy::Spiral));
        }
        self.full_scan()
    }

    /// First floor tile in row-major order.
    pub fn full_scan(&self) -> Result<SpawnPoint, SpawnError> {
        self.grid
            .first_floor()
            .map(|tile| self.point(tile, SpawnStrategy::FullScan))
            .ok_or_else(|| self.no_walkable())
    }

    fn spiral(&self, origin: TilePos, accept: impl Fn(&TilePos) -> bool) -> Option<TilePos> {
        (0..=self.spiral_rings)
            .flat_map(|radius| spiral_ring(origin, radius))
            .find(|tile| accept(tile))
    }
}

/// Tiles of ring `radius` around `center`, clockwise from the top-left
/// corner. Ring zero is the center itself.
pub fn spiral_ring(center: TilePos, radius: i32) -> Vec<TilePos> {
    if radius <= 0 {
        return vec![center];
    }
    let (left, right) = (center.x - radius, center.x + radius);
    let (top, bottom) = (center.y - radius, center.y + radius);

    let mut tiles = Vec::with_capacity(8 * radius as usize);
    tiles.extend((left..=right).map(|x| TilePos::new(x, top)));
    tiles.extend((top + 1..=bottom).map(|y| TilePos::new(right, y)));
    tiles.extend((left..right).rev().map(|x| TilePos::new(x, bottom)));
    tiles.extend((top + 1..bottom).rev().map(|y| TilePos::new(left, y)));
    tiles
}
