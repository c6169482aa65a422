/// Maze cell kinds.
/// Properties are queried via methods so cell semantics stay in one place.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Open,
    Wall,
}

impl Tile {
    /// Parse one layout character. `#` is wall, anything else is open.
    pub fn from_char(ch: char) -> Tile {
        match ch {
            '#' => Tile::Wall,
            _ => Tile::Open,
        }
    }

    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Open cells are walkable and seed one pickup each.
    pub fn is_open(self) -> bool {
        !self.is_wall()
    }
}
