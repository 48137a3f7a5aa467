//! World-space and tile-space coordinates.
//!
//! Entities live in continuous world coordinates; the grid is addressed in
//! tile coordinates. Conversion floors toward negative infinity so positions
//! left of or above the origin never alias tile `(0, 0)`.
use std::ops::{Add, Mul, Neg, Sub};

/// Continuous 2D vector used for world positions and headings.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// A point in world coordinates (pixels).
pub type WorldPos = Vec2;

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    pub fn normalized(self) -> Option<Self> {
        let length = self.length();
        (length > f32::EPSILON).then(|| Self::new(self.x / length, self.y / length))
    }

    /// Heading at `angle` radians, scaled to `length`.
    pub fn from_angle(angle: f32, length: f32) -> Self {
        Self::new(angle.cos() * length, angle.sin() * length)
    }

    /// The two perpendicular deflections `(y, -x)` and `(-y, x)`.
    pub fn perpendiculars(self) -> [Self; 2] {
        [Self::new(self.y, -self.x), Self::new(-self.y, self.x)]
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing the world point.
    pub fn from_world(position: WorldPos, tile_size: u32) -> Self {
        let size = tile_size.max(1) as f32;
        Self::new(
            (position.x / size).floor() as i32,
            (position.y / size).floor() as i32,
        )
    }

    /// Top-left corner of this tile in world coordinates.
    pub fn to_world(self, tile_size: u32) -> WorldPos {
        let size = tile_size as f32;
        Vec2::new(self.x as f32 * size, self.y as f32 * size)
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned box in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub origin: WorldPos,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub const fn new(origin: WorldPos, width: f32, height: f32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    pub fn square(origin: WorldPos, size: f32) -> Self {
        Self::new(origin, size, size)
    }

    pub fn center(&self) -> WorldPos {
        Vec2::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }

    /// The four corners probed by grid collision: top-left, top-right,
    /// bottom-left, bottom-right.
    pub fn corners(&self) -> [WorldPos; 4] {
        let Vec2 { x, y } = self.origin;
        [
            Vec2::new(x, y),
            Vec2::new(x + self.width, y),
            Vec2::new(x, y + self.height),
            Vec2::new(x + self.width, y + self.height),
        ]
    }

    /// Strict overlap; boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.origin.x < other.origin.x + other.width
            && self.origin.x + self.width > other.origin.x
            && self.origin.y < other.origin.y + other.height
            && self.origin.y + self.height > other.origin.y
    }
}
