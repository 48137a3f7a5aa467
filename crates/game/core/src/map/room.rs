use crate::geometry::TilePos;

/// Rectangle in tile coordinates covering `[x, x + width) × [y, y + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn center(&self) -> TilePos {
        TilePos::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub const fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.x
            && pos.x < self.x + self.width
            && pos.y >= self.y
            && pos.y < self.y + self.height
    }

    /// Every tile of the room in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| TilePos::new(x, y)))
    }

    /// The room shrunk by `margin` on every side, if anything is left.
    pub fn interior(&self, margin: i32) -> Option<Room> {
        let width = self.width - 2 * margin;
        let height = self.height - 2 * margin;
        (width > 0 && height > 0).then(|| Room::new(self.x + margin, self.y + margin, width, height))
    }

    /// The room grown by `margin` on every side.
    pub const fn expanded(&self, margin: i32) -> Room {
        Room::new(
            self.x - margin,
            self.y - margin,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    pub const fn intersects(&self, other: &Room) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}
