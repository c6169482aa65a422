/// Pixel-space rectangles.
///
/// Coordinates are display units (one maze cell = `CELL_SIZE` units).
/// Overlap follows half-open semantics: the right and bottom
/// edges are outside the rectangle, so two grid-aligned cells that merely
/// share an edge never touch.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Same size, shifted by (dx, dy).
    pub fn moved(self, dx: i32, dy: i32) -> Self {
        Rect { x: self.x + dx, y: self.y + dy, ..self }
    }

    pub fn top_left(self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Strict area overlap. Zero-sized rectangles overlap nothing.
    pub fn overlaps(self, other: Rect) -> bool {
        if self.w <= 0 || self.h <= 0 || other.w <= 0 || other.h <= 0 {
            return false;
        }
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}
