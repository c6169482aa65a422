/// Collision and movement resolution.
///
/// Two overlap policies are in play and are kept as separate named
/// functions:
///   - `corner_blocked`: entity vs wall. Only the moving rectangle's
///     top-left corner is sampled against the wall grid.
///   - `touching`: entity vs entity and entity vs pickup. Full rectangle
///     overlap.
///
/// All movement is validated before it is applied; a rejected move leaves
/// the rectangle untouched.

use super::entity::Dir;
use super::geom::Rect;
use super::maze::Maze;

/// Outcome of a proposed move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveResult {
    pub accepted: bool,
    pub rect: Rect,
}

/// Is the rectangle's top-left corner inside a wall cell?
pub fn corner_blocked(rect: Rect, maze: &Maze) -> bool {
    let (cx, cy) = Maze::cell_of_point(rect.x, rect.y);
    maze.is_wall(cx, cy)
}

/// Do two rectangles overlap by area?
pub fn touching(a: Rect, b: Rect) -> bool {
    a.overlaps(b)
}

/// Try to shift `rect` by (dx, dy). On rejection the original rectangle is
/// returned unchanged.
pub fn try_move(rect: Rect, dx: i32, dy: i32, maze: &Maze) -> MoveResult {
    let candidate = rect.moved(dx, dy);
    if corner_blocked(candidate, maze) {
        MoveResult { accepted: false, rect }
    } else {
        MoveResult { accepted: true, rect: candidate }
    }
}

/// `try_move` by one cell in `dir`.
pub fn try_step(rect: Rect, dir: Dir, maze: &Maze) -> MoveResult {
    let (dx, dy) = dir.delta();
    try_move(rect, dx, dy, maze)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::maze::CELL_SIZE;
    use proptest::prelude::*;

    fn mini() -> Maze {
        Maze::from_rows(&[
            "######",
            "#    #",
            "#  ###",
            "#  ###",
            "######",
        ])
    }

    #[test]
    fn open_move_accepted() {
        let maze = mini();
        let r = Maze::cell_rect(1, 1);
        let res = try_step(r, Dir::Right, &maze);
        assert!(res.accepted);
        assert_eq!(res.rect, Maze::cell_rect(2, 1));
    }

    #[test]
    fn move_into_wall_rejected_and_unchanged() {
        let maze = mini();
        let r = Maze::cell_rect(1, 1);
        let res = try_step(r, Dir::Up, &maze);
        assert!(!res.accepted);
        assert_eq!(res.rect, r);
        assert!(!try_step(r, Dir::Left, &maze).accepted);
    }

    #[test]
    fn wall_interior_rejected() {
        let maze = mini();
        // (3,2)..(4,3) is a 2x2 wall block; land in its interior
        let r = Maze::cell_rect(2, 2);
        assert!(!try_step(r, Dir::Right, &maze).accepted);
        let off_grid = Rect::new(2 * CELL_SIZE + 5, 2 * CELL_SIZE + 5, CELL_SIZE, CELL_SIZE);
        assert!(!try_move(off_grid, CELL_SIZE, 0, &maze).accepted);
    }

    #[test]
    fn only_the_corner_is_sampled() {
        let maze = mini();
        // Destination (2,1) is open, but its bottom-right neighbour (3,2) is
        // wall: the rectangle's far corner sits on that wall cell.
        let r = Maze::cell_rect(1, 1);
        let res = try_step(r, Dir::Right, &maze);
        assert!(res.accepted);
        let far = (res.rect.x + res.rect.w, res.rect.y + res.rect.h);
        let (fx, fy) = Maze::cell_of_point(far.0, far.1);
        assert!(maze.is_wall(fx, fy));

        // Off-grid rectangle whose corner is open while most of its area
        // covers the wall block to the right.
        let r = Rect::new(2 * CELL_SIZE + 15, 2 * CELL_SIZE, CELL_SIZE, CELL_SIZE);
        assert!(!corner_blocked(r, &maze));
        assert!(touching(r, Maze::cell_rect(3, 2)));
    }

    #[test]
    fn touching_is_full_overlap() {
        assert!(touching(Maze::cell_rect(2, 2), Maze::cell_rect(2, 2)));
        assert!(!touching(Maze::cell_rect(2, 2), Maze::cell_rect(3, 2)));
        assert!(touching(Maze::cell_rect(2, 2), Maze::pickup_rect(2, 2)));
    }

    proptest! {
        #[test]
        fn accepted_iff_corner_open(cx in 0i32..20, cy in 0i32..20, d in 0usize..4) {
            let maze = Maze::classic();
            let dir = Dir::INPUT_ORDER[d];
            let res = try_step(Maze::cell_rect(cx, cy), dir, &maze);
            let (dx, dy) = dir.delta();
            let target = (cx + dx / CELL_SIZE, cy + dy / CELL_SIZE);
            prop_assert_eq!(res.accepted, maze.is_open(target.0, target.1));
            if !res.accepted {
                prop_assert_eq!(res.rect, Maze::cell_rect(cx, cy));
            }
        }
    }
}
