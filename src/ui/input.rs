/// Keyboard input and the combined `InputSource` adapter.
///
/// Tracks which keys are currently held down so movement continues while a
/// key is held. Uses Release events when the terminal reports them and
/// falls back to timeout-based release detection otherwise.
///
///   Arrows / WASD   →  Movement
///   Esc / Ctrl+C    →  Quit
///   R / Q           →  Restart / Quit (prompt only)

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::{Dir, HeldDirections};
use crate::sim::session::{InputSource, PromptChoice};
use super::gamepad::GamepadState;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Longest wait for a key while blocked on the restart prompt, so the
/// gamepad still gets polled.
const PROMPT_POLL: Duration = Duration::from_millis(20);

pub fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Dir::Right),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Dir::Down),
        _ => None,
    }
}

pub fn is_quit_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')))
}

pub fn prompt_choice_for_key(code: KeyCode) -> Option<PromptChoice> {
    match code {
        KeyCode::Char('r') | KeyCode::Char('R') => Some(PromptChoice::Restart),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(PromptChoice::Quit),
        _ => None,
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each direction.
    last_active: HashMap<Dir, Instant>,

    /// Raw key presses collected during the most recent drain.
    pressed: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(4),
            pressed: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    pub fn drain_events(&mut self) {
        self.pressed.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    fn apply(&mut self, key: KeyEvent, now: Instant) {
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                if let Some(dir) = dir_for_key(key.code) {
                    self.last_active.remove(&dir);
                }
            }
            KeyEventKind::Release => {}
            _ => {
                self.pressed.push(key);
                if let Some(dir) = dir_for_key(key.code) {
                    self.last_active.insert(dir, now);
                }
            }
        }
    }

    /// Expire directions that have timed out (fallback for terminals
    /// without Release).
    fn expire(&mut self, now: Instant) {
        if !self.honor_release {
            self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        }
    }

    pub fn held_directions(&self) -> HeldDirections {
        let mut held = HeldDirections::NONE;
        for dir in self.last_active.keys() {
            held.set(*dir, true);
        }
        held
    }

    /// Was Esc or Ctrl+C pressed during the last drain?
    pub fn quit_pressed(&self) -> bool {
        self.pressed.iter().any(is_quit_key)
    }

    /// First restart/quit key pressed during the last drain.
    pub fn prompt_choice(&self) -> Option<PromptChoice> {
        self.pressed.iter().find_map(|k| prompt_choice_for_key(k.code))
    }
}

/// Keyboard plus optional gamepad, as one `InputSource`.
pub struct Controls {
    pub keys: InputState,
    pub pad: GamepadState,
}

impl Controls {
    pub fn new(keys: InputState, pad: GamepadState) -> Self {
        Controls { keys, pad }
    }

    fn drain(&mut self) {
        self.keys.drain_events();
        self.pad.update();
    }

    /// Choice made during the last drain. A quit signal wins.
    fn pending_choice(&self) -> Option<PromptChoice> {
        if self.keys.quit_pressed() || self.pad.quit_pressed() {
            return Some(PromptChoice::Quit);
        }
        self.keys.prompt_choice()
            .or_else(|| self.pad.restart_pressed().then_some(PromptChoice::Restart))
    }
}

impl InputSource for Controls {
    /// Also drains pending events, so call it first each tick.
    fn poll_quit_requested(&mut self) -> bool {
        self.drain();
        self.keys.quit_pressed() || self.pad.quit_pressed()
    }

    fn held_directions(&mut self) -> HeldDirections {
        self.keys.held_directions().union(self.pad.held_directions())
    }

    /// Blocks on terminal events; the gamepad is polled between waits.
    fn wait_prompt_choice(&mut self) -> PromptChoice {
        loop {
            self.drain();
            if let Some(choice) = self.pending_choice() {
                return choice;
            }
            // Wakes as soon as a key arrives; the event is read by the
            // next drain.
            let _ = poll(PROMPT_POLL);
        }
    }
}
