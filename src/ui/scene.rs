/// Scene composition: turns a `SessionState` into draw calls.
///
/// Draw order is fixed: background, walls, pickups, power pickups,
/// player, adversaries, banner. Any `Surface` works; the terminal
/// renderer is one, the tests use a recorder.

use std::io;

use crate::domain::entity::Mood;
use crate::domain::geom::Rect;
use crate::domain::maze::{Maze, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::sim::world::SessionState;

/// The classic palette.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Paint {
    Black,
    White,
    Yellow,
    Red,
    Blue,
    Green,
}

/// A display the game can draw on. Coordinates are display units.
pub trait Surface {
    fn clear_screen(&mut self, color: Paint);
    fn draw_filled_rect(&mut self, rect: Rect, color: Paint);
    fn draw_ellipse(&mut self, rect: Rect, color: Paint);
    /// Draw `text` centred on `at`.
    fn draw_centered_text(&mut self, text: &str, color: Paint, at: (i32, i32));
    fn present(&mut self) -> io::Result<()>;
}

pub const GAME_OVER_TEXT: &str = "Game Over";
pub const WIN_TEXT: &str = "You Win!";
pub const PROMPT_TEXT: &str = "Press R to Restart or Q to Quit";

/// Offset of the prompt below the banner, display units.
const PROMPT_OFFSET: i32 = 50;

fn screen_center() -> (i32, i32) {
    (SCREEN_WIDTH / 2, SCREEN_HEIGHT / 2)
}

pub fn adversary_paint(mood: Mood) -> Paint {
    match mood {
        Mood::Active => Paint::Red,
        Mood::Subdued => Paint::Blue,
    }
}

/// Draw one full frame and present it.
pub fn draw_session(surface: &mut dyn Surface, state: &SessionState) -> io::Result<()> {
    compose_session(surface, state);
    surface.present()
}

/// Overlay the restart/quit prompt on the final frame. The whole frame is
/// composed again; a surface may not keep the last presented frame around.
pub fn draw_prompt(surface: &mut dyn Surface, state: &SessionState) -> io::Result<()> {
    compose_session(surface, state);
    let (cx, cy) = screen_center();
    surface.draw_centered_text(PROMPT_TEXT, Paint::White, (cx, cy + PROMPT_OFFSET));
    surface.present()
}

fn compose_session(surface: &mut dyn Surface, state: &SessionState) {
    surface.clear_screen(Paint::Black);
    for (x, y) in state.maze.wall_cells() {
        surface.draw_filled_rect(Maze::cell_rect(x, y), Paint::White);
    }
    for rect in state.pickup_rects() {
        surface.draw_ellipse(rect, Paint::Yellow);
    }
    for rect in state.power_pickup_rects() {
        surface.draw_ellipse(rect, Paint::Green);
    }
    surface.draw_filled_rect(state.player.rect, Paint::Yellow);
    for adversary in &state.adversaries {
        surface.draw_filled_rect(adversary.rect, adversary_paint(adversary.mood));
    }
    if state.game_over {
        surface.draw_centered_text(GAME_OVER_TEXT, Paint::Red, screen_center());
    }
    if state.win {
        surface.draw_centered_text(WIN_TEXT, Paint::Green, screen_center());
    }
}
