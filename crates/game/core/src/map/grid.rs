use crate::geometry::TilePos;

/// A single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Tile {
    #[default]
    Wall,
    Floor,
}

impl Tile {
    pub const fn is_floor(self) -> bool {
        matches!(self, Tile::Floor)
    }
}

/// Row-major tile matrix. Immutable outside the generator once built.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// A grid filled entirely with walls.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Wall; width as usize * height as usize],
        }
    }

    /// Builds a grid from text rows where `.` is floor and anything else is wall.
    ///
    /// Rows shorter than the first are padded with walls.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.chars().count()) as u32;
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().take(width as usize).enumerate() {
                if ch == '.' {
                    grid.set(TilePos::new(x as i32, y as i32), Tile::Floor);
                }
            }
        }
        grid
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Tile at `pos`, or `None` outside the grid.
    pub fn get(&self, pos: TilePos) -> Option<Tile> {
        self.index(pos).map(|idx| self.tiles[idx])
    }

    /// In bounds and `Floor`.
    pub fn is_floor(&self, pos: TilePos) -> bool {
        self.get(pos).is_some_and(Tile::is_floor)
    }

    pub(crate) fn set(&mut self, pos: TilePos, tile: Tile) {
        if let Some(idx) = self.index(pos) {
            self.tiles[idx] = tile;
        }
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| TilePos::new(x, y)))
    }

    /// First floor tile in row-major order.
    pub fn first_floor(&self) -> Option<TilePos> {
        self.positions().find(|pos| self.is_floor(*pos))
    }

    pub fn floor_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_floor()).count()
    }

    /// Rows as slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width.max(1) as usize)
    }
}
