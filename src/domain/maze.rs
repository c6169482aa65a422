/// The fixed maze.
///
/// Geometry is compiled in and parsed once per session. After construction
/// the maze is never mutated; pickups and entities live in `SessionState`.
///
/// Layout legend: `#` = wall, ` ` = open.

use super::geom::Rect;
use super::tile::Tile;

pub const MAZE_WIDTH: usize = 20;
pub const MAZE_HEIGHT: usize = 20;
/// Side of one cell in display units.
pub const CELL_SIZE: i32 = 20;

pub const SCREEN_WIDTH: i32 = CELL_SIZE * MAZE_WIDTH as i32;
pub const SCREEN_HEIGHT: i32 = CELL_SIZE * MAZE_HEIGHT as i32;

static LAYOUT: [&str; MAZE_HEIGHT] = [
    "####################",
    "#  #       ###     #",
    "#  # ####  ###  ## #",
    "#  #    #  #       #",
    "#  #### #  # # # # #",
    "#       #    # #   #",
    "# #     #  ### #   #",
    "# # ### #  ###     #",
    "#       #       #  #",
    "# ###       #   #  #",
    "#    ## #       #  #",
    "#  #       ###  #  #",
    "#  # ####  ##      #",
    "#  #    #  ## #  # #",
    "#  #       #  #  # #",
    "#  # ####  # ##  # #",
    "#  #    #    ##  # #",
    "#  #### #  ###     #",
    "#       #  ###     #",
    "####################",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

impl Maze {
    /// The compiled-in layout.
    pub fn classic() -> Self {
        Maze::from_rows(&LAYOUT)
    }

    /// Parse a layout. Short rows are padded with walls; the outer ring is
    /// forced to wall so the playable area is always bounded.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut tiles = vec![vec![Tile::Wall; width]; height];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
                tiles[y][x] = if border { Tile::Wall } else { Tile::from_char(ch) };
            }
        }
        Maze { tiles, width, height }
    }

    /// Tile at a cell. Out of range (including negative) = wall.
    #[inline]
    pub fn tile_at(&self, cx: i32, cy: i32) -> Tile {
        if cx < 0 || cy < 0 {
            return Tile::Wall;
        }
        let (x, y) = (cx as usize, cy as usize);
        if x < self.width && y < self.height {
            self.tiles[y][x]
        } else {
            Tile::Wall
        }
    }

    #[inline]
    pub fn is_wall(&self, cx: i32, cy: i32) -> bool {
        self.tile_at(cx, cy).is_wall()
    }

    #[inline]
    pub fn is_open(&self, cx: i32, cy: i32) -> bool {
        !self.is_wall(cx, cy)
    }

    /// Which cell contains this display-space point?
    pub fn cell_of_point(px: i32, py: i32) -> (i32, i32) {
        (px.div_euclid(CELL_SIZE), py.div_euclid(CELL_SIZE))
    }

    /// Full-cell rectangle for a cell.
    pub fn cell_rect(cx: i32, cy: i32) -> Rect {
        Rect::new(cx * CELL_SIZE, cy * CELL_SIZE, CELL_SIZE, CELL_SIZE)
    }

    /// Half-size rectangle centred in a cell (pickup footprint).
    pub fn pickup_rect(cx: i32, cy: i32) -> Rect {
        Rect::new(
            cx * CELL_SIZE + CELL_SIZE / 4,
            cy * CELL_SIZE + CELL_SIZE / 4,
            CELL_SIZE / 2,
            CELL_SIZE / 2,
        )
    }

    /// All open cells, row-major.
    pub fn open_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width)
                .filter(move |&x| self.tiles[y][x].is_open())
                .map(move |x| (x as i32, y as i32))
        })
    }

    /// All wall cells, row-major.
    pub fn wall_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width)
                .filter(move |&x| self.tiles[y][x].is_wall())
                .map(move |x| (x as i32, y as i32))
        })
    }
}
