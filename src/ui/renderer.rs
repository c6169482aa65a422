/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Draw calls compose the next frame into `front` (array of Cell)
///   2. `present()` compares each cell with `back` (previous frame)
///   3. Only cells that changed emit terminal commands
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Display units map onto the terminal grid as one maze cell = two
/// columns by one row, so cells look roughly square. The board is centred
/// in the terminal.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::geom::Rect;
use crate::domain::maze::{CELL_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
use super::scene::{Paint, Surface};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer so every position is
    /// diff'd on the next present.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

#[derive(Debug)]
struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    fn get(&self, x: i32, y: i32) -> Cell {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y); each char takes one column and keeps the
    /// background already there.
    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            let cx = x + i as i32;
            let bg = self.get(cx, y).bg;
            self.set(cx, y, Cell { ch, fg, bg });
        }
    }
}

// ── Coordinate mapping ──

/// Terminal columns per maze cell.
const CELL_W: i32 = 2;
/// Display units per terminal column / row.
const COL_UNITS: i32 = CELL_SIZE / CELL_W;
const ROW_UNITS: i32 = CELL_SIZE;

const BOARD_COLS: i32 = SCREEN_WIDTH / COL_UNITS;
const BOARD_ROWS: i32 = SCREEN_HEIGHT / ROW_UNITS;

fn col_of(px: i32) -> i32 {
    px.div_euclid(COL_UNITS)
}

fn row_of(py: i32) -> i32 {
    py.div_euclid(ROW_UNITS)
}

/// Inclusive terminal span covered by a rectangle.
fn span(rect: Rect) -> Option<(i32, i32, i32, i32)> {
    if rect.w <= 0 || rect.h <= 0 {
        return None;
    }
    Some((
        col_of(rect.x),
        row_of(rect.y),
        col_of(rect.x + rect.w - 1),
        row_of(rect.y + rect.h - 1),
    ))
}

fn color_of(paint: Paint) -> Color {
    match paint {
        Paint::Black => Color::Rgb { r: 0, g: 0, b: 0 },
        Paint::White => Color::Rgb { r: 255, g: 255, b: 255 },
        Paint::Yellow => Color::Rgb { r: 255, g: 255, b: 0 },
        Paint::Red => Color::Rgb { r: 255, g: 0, b: 0 },
        Paint::Blue => Color::Rgb { r: 0, g: 0, b: 255 },
        Paint::Green => Color::Rgb { r: 0, g: 255, b: 0 },
    }
}

// ── Renderer ──

pub struct Renderer<W: Write = BufWriter<io::Stdout>> {
    writer: W,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    origin: (i32, i32),
    /// Terminal reports key Release events.
    enhanced: bool,
    /// Track terminal resizes; off until `init`.
    attached: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer::with_writer(BufWriter::with_capacity(16384, io::stdout()))
    }
}

impl<W: Write> Renderer<W> {
    pub fn with_writer(writer: W) -> Self {
        Renderer {
            writer,
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            origin: (0, 0),
            enhanced: false,
            attached: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced = true;
        }
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        self.attached = true;
        Ok(())
    }

    pub fn reports_release(&self) -> bool {
        self.enhanced
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.enhanced = false;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        self.attached = false;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.fill(Cell::INVALID);
        self.origin = (
            ((w as i32 - BOARD_COLS) / 2).max(0),
            ((h as i32 - BOARD_ROWS) / 2).max(0),
        );
    }

    /// Terminal position of a display-unit point.
    fn to_term(&self, px: i32, py: i32) -> (i32, i32) {
        (self.origin.0 + col_of(px), self.origin.1 + row_of(py))
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: i32 = -1;
        let mut last_y: i32 = -1;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height as i32 {
            for x in 0..self.front.width as i32 {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

impl<W: Write> Surface for Renderer<W> {
    fn clear_screen(&mut self, color: Paint) {
        self.front.fill(Cell { ch: ' ', fg: Color::White, bg: color_of(color) });
    }

    fn draw_filled_rect(&mut self, rect: Rect, color: Paint) {
        let Some((c0, r0, c1, r1)) = span(rect) else { return };
        let bg = color_of(color);
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.front.set(self.origin.0 + col, self.origin.1 + row, Cell { ch: ' ', fg: bg, bg });
            }
        }
    }

    /// Small shapes render as a pair of half blocks so they sit centred
    /// inside a two-column cell.
    fn draw_ellipse(&mut self, rect: Rect, color: Paint) {
        let Some((c0, r0, c1, r1)) = span(rect) else { return };
        let fg = color_of(color);
        for row in r0..=r1 {
            for col in c0..=c1 {
                let ch = match (col == c0, col == c1) {
                    (true, true) => '●',
                    (true, false) => '▐',
                    (false, true) => '▌',
                    (false, false) => '█',
                };
                let (tx, ty) = (self.origin.0 + col, self.origin.1 + row);
                let bg = self.front.get(tx, ty).bg;
                self.front.set(tx, ty, Cell { ch, fg, bg });
            }
        }
    }

    fn draw_centered_text(&mut self, text: &str, color: Paint, at: (i32, i32)) {
        let (cx, cy) = self.to_term(at.0, at.1);
        let len = text.chars().count() as i32;
        self.front.put_str(cx - len / 2, cy, text, color_of(color));
    }

    fn present(&mut self) -> io::Result<()> {
        let (tw, th) = if self.attached {
            terminal::size().unwrap_or((self.term_w as u16, self.term_h as u16))
        } else {
            (self.term_w as u16, self.term_h as u16)
        };
        if tw as usize != self.term_w || th as usize != self.term_h {
            // Frame was composed for the old size; repaint from scratch next
            // time rather than drawing a torn frame now.
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            return self.writer.flush();
        }
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::domain::ai::RngSource;
    use crate::sim::world::SessionState;
    use crate::ui::scene;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn offscreen() -> Renderer<Vec<u8>> {
        let mut r = Renderer::with_writer(Vec::new());
        r.resize(BOARD_COLS as usize, BOARD_ROWS as usize);
        r
    }

    #[test]
    fn board_fits_classic_terminal() {
        assert_eq!(BOARD_COLS, 40);
        assert_eq!(BOARD_ROWS, 20);
    }

    #[test]
    fn cell_rect_covers_two_columns() {
        let mut r = offscreen();
        r.clear_screen(Paint::Black);
        r.draw_filled_rect(Rect::new(40, 20, 20, 20), Paint::White);
        let white = color_of(Paint::White);
        assert_eq!(r.front.get(4, 1).bg, white);
        assert_eq!(r.front.get(5, 1).bg, white);
        assert_ne!(r.front.get(3, 1).bg, white);
        assert_ne!(r.front.get(6, 1).bg, white);
        assert_ne!(r.front.get(4, 2).bg, white);
    }

    #[test]
    fn pickup_is_centred_half_blocks() {
        let mut r = offscreen();
        r.clear_screen(Paint::Black);
        r.draw_ellipse(Rect::new(25, 25, 10, 10), Paint::Yellow);
        assert_eq!(r.front.get(2, 1).ch, '▐');
        assert_eq!(r.front.get(3, 1).ch, '▌');
        assert_eq!(r.front.get(2, 1).bg, color_of(Paint::Black));
    }

    #[test]
    fn text_is_centred_on_point() {
        let mut r = offscreen();
        r.clear_screen(Paint::Black);
        r.draw_centered_text("ABCD", Paint::Red, (200, 200));
        // (200, 200) → column 20, row 10
        assert_eq!(r.front.get(18, 10).ch, 'A');
        assert_eq!(r.front.get(21, 10).ch, 'D');
    }

    fn row_text(fb: &FrameBuffer, y: i32) -> String {
        (0..fb.width as i32).map(|x| fb.get(x, y).ch).collect()
    }

    fn ended_session() -> SessionState {
        let mut rng = RngSource(StdRng::seed_from_u64(5));
        let mut s = SessionState::new(&RulesConfig::default(), &mut rng);
        s.game_over = true;
        s
    }

    #[test]
    fn prompt_keeps_banner_on_first_frame() {
        let s = ended_session();
        let mut r = offscreen();
        scene::draw_session(&mut r, &s).unwrap();
        // shown frame now lives in `back`
        assert!(row_text(&r.back, 10).contains(scene::GAME_OVER_TEXT));

        scene::draw_prompt(&mut r, &s).unwrap();
        assert!(row_text(&r.back, 10).contains(scene::GAME_OVER_TEXT));
        assert!(row_text(&r.back, 12).contains(scene::PROMPT_TEXT));
        assert!(r.back.cells.iter().all(|c| *c != Cell::INVALID));
    }

    #[test]
    fn prompt_shows_final_positions() {
        let mut s = ended_session();
        s.game_over = false;
        let mut r = offscreen();
        scene::draw_session(&mut r, &s).unwrap();

        // last tick: player moves one cell, then the session ends
        let start = s.player.rect;
        s.player.rect = start.moved(CELL_SIZE, 0);
        s.game_over = true;
        scene::draw_session(&mut r, &s).unwrap();
        let final_frame = r.back.cells.clone();

        scene::draw_prompt(&mut r, &s).unwrap();
        let yellow = color_of(Paint::Yellow);
        let (px, py) = (s.player.rect.x / COL_UNITS, s.player.rect.y / ROW_UNITS);
        assert_eq!(r.back.get(px, py).bg, yellow);
        assert_ne!(r.back.get(start.x / COL_UNITS, start.y / ROW_UNITS).bg, yellow);
        // only the prompt row differs from the final frame
        let width = r.back.width;
        let changed: Vec<usize> = r.back.cells.iter().zip(&final_frame)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i / width)
            .collect();
        assert!(!changed.is_empty());
        assert!(changed.iter().all(|&row| row == 12));
    }

    #[test]
    fn offscreen_draws_are_clipped() {
        let mut r = offscreen();
        r.draw_filled_rect(Rect::new(-100, -100, 20, 20), Paint::White);
        r.draw_centered_text("far away", Paint::White, (10_000, 10_000));
        assert!(r.front.cells.iter().all(|c| c.bg != color_of(Paint::White)));
    }

    #[test]
    fn unchanged_frame_emits_nothing() {
        let mut r = offscreen();
        r.clear_screen(Paint::Black);
        r.flush_diff().unwrap();
        std::mem::swap(&mut r.front, &mut r.back);
        r.writer.clear();

        r.clear_screen(Paint::Black);
        r.flush_diff().unwrap();
        // Only the initial colour setup is queued; no cell is printed.
        assert!(!String::from_utf8_lossy(&r.writer).contains(' '));
    }

    #[test]
    fn changed_cell_is_printed() {
        let mut r = offscreen();
        r.clear_screen(Paint::Black);
        r.flush_diff().unwrap();
        std::mem::swap(&mut r.front, &mut r.back);
        r.writer.clear();

        r.clear_screen(Paint::Black);
        r.draw_centered_text("X", Paint::White, (200, 200));
        r.flush_diff().unwrap();
        assert!(String::from_utf8_lossy(&r.writer).contains('X'));
    }
}
