/// Entities: Player and Adversary, plus the per-tick input shape.
/// Positions are pixel rectangles snapped to the cell grid.

use super::geom::Rect;
use super::maze::{Maze, CELL_SIZE};

/// Unit movement direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Dir {
    Left,
    Right,
    Up,
    Down,
}

impl Dir {
    /// Player input evaluation order. Later directions see the position
    /// produced by earlier ones in the same tick.
    pub const INPUT_ORDER: [Dir; 4] = [Dir::Left, Dir::Right, Dir::Up, Dir::Down];

    /// Candidates for a random adversary step.
    pub const WANDER: [Dir; 4] = [Dir::Right, Dir::Left, Dir::Down, Dir::Up];

    /// One-cell displacement in display units.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Left => (-CELL_SIZE, 0),
            Dir::Right => (CELL_SIZE, 0),
            Dir::Up => (0, -CELL_SIZE),
            Dir::Down => (0, CELL_SIZE),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dir::Left => "LEFT",
            Dir::Right => "RIGHT",
            Dir::Up => "UP",
            Dir::Down => "DOWN",
        }
    }
}

/// Which directional controls are held this tick. Opposite directions may
/// both be held; each is tried in `Dir::INPUT_ORDER`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct HeldDirections {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl HeldDirections {
    pub const NONE: HeldDirections = HeldDirections { left: false, right: false, up: false, down: false };

    #[cfg(test)]
    pub fn only(dir: Dir) -> Self {
        let mut held = HeldDirections::NONE;
        held.set(dir, true);
        held
    }

    pub fn is_held(&self, dir: Dir) -> bool {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
            Dir::Up => self.up,
            Dir::Down => self.down,
        }
    }

    pub fn set(&mut self, dir: Dir, held: bool) {
        match dir {
            Dir::Left => self.left = held,
            Dir::Right => self.right = held,
            Dir::Up => self.up = held,
            Dir::Down => self.down = held,
        }
    }

    /// Held directions in evaluation order.
    pub fn in_order(self) -> impl Iterator<Item = Dir> {
        Dir::INPUT_ORDER.into_iter().filter(move |d| self.is_held(*d))
    }

    pub fn union(self, other: HeldDirections) -> Self {
        HeldDirections {
            left: self.left || other.left,
            right: self.right || other.right,
            up: self.up || other.up,
            down: self.down || other.down,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub rect: Rect,
}

impl Player {
    pub fn at_cell(cx: i32, cy: i32) -> Self {
        Player { rect: Maze::cell_rect(cx, cy) }
    }
}

/// How an adversary is drawn this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Mood {
    #[default]
    Active,
    Subdued,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Adversary {
    pub id: usize,
    pub rect: Rect,
    /// Start position; teleport target after being subdued.
    pub home: (i32, i32),
    /// Absolute ms timestamp. 0 or in the past = free to move.
    pub subdued_until: u64,
    pub mood: Mood,
}

impl Adversary {
    pub fn at_cell(id: usize, cx: i32, cy: i32) -> Self {
        let rect = Maze::cell_rect(cx, cy);
        Adversary {
            id,
            rect,
            home: rect.top_left(),
            subdued_until: 0,
            mood: Mood::Active,
        }
    }

    pub fn is_subdued(&self, now_ms: u64) -> bool {
        now_ms < self.subdued_until
    }

    /// Freeze until `until_ms` and return to the start position.
    pub fn subdue(&mut self, until_ms: u64) {
        self.subdued_until = until_ms;
        self.rect.x = self.home.0;
        self.rect.y = self.home.1;
        self.mood = Mood::Subdued;
    }
}
