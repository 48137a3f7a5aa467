use crate::geometry::TilePos;
use crate::map::Room;

/// Per-player fog of war. Tiles only ever flip from unseen to seen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorationMap {
    width: u32,
    height: u32,
    seen: Vec<bool>,
}

impl ExplorationMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            seen: vec![false; width as usize * height as usize],
        }
    }

    pub fn fully_revealed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            seen: vec![true; width as usize * height as usize],
        }
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        (pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn is_explored(&self, pos: TilePos) -> bool {
        self.index(pos).is_some_and(|idx| self.seen[idx])
    }

    /// Marks one tile. Returns true if it was previously unseen.
    pub fn reveal(&mut self, pos: TilePos) -> bool {
        match self.index(pos) {
            Some(idx) if !self.seen[idx] => {
                self.seen[idx] = true;
                true
            }
            _ => false,
        }
    }

    /// Marks every tile of `room`, pushing the newly seen ones into `delta`.
    pub fn reveal_room(&mut self, room: &Room, delta: &mut Vec<TilePos>) {
        for pos in room.tiles() {
            if self.reveal(pos) {
                delta.push(pos);
            }
        }
    }

    pub fn explored_count(&self) -> usize {
        self.seen.iter().filter(|seen| **seen).count()
    }

    pub fn rows(&self) -> Vec<Vec<bool>> {
        self.seen
            .chunks(self.width.max(1) as usize)
            .map(<[bool]>::to_vec)
            .collect()
    }

    /// True when every tile seen in `earlier` is still seen here.
    pub fn covers(&self, earlier: &ExplorationMap) -> bool {
        self.seen.len() == earlier.seen.len()
            && earlier
                .seen
                .iter()
                .zip(&self.seen)
                .all(|(before, now)| !*before || *now)
    }
}
