/// Session controller: the fixed-rate game loop.
///
/// Each tick: check the quit signal, read held directions, step the
/// simulation, draw, wait out the tick. When the session ends the prompt
/// blocks until the player restarts (fresh `SessionState`) or quits.

use crate::config::RulesConfig;
use crate::domain::ai::RandomSource;
use crate::domain::entity::HeldDirections;
use crate::error::GameError;
use crate::ui::scene::{self, Surface};
use super::clock::Clock;
use super::event::GameEvent;
use super::register::MoveObserver;
use super::step;
use super::world::SessionState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromptChoice {
    Restart,
    Quit,
}

/// Where the loop gets its controls from.
pub trait InputSource {
    /// Has the player asked to leave? Checked at the top of every tick.
    fn poll_quit_requested(&mut self) -> bool;
    fn held_directions(&mut self) -> HeldDirections;
    /// Block until the player picks restart or quit.
    fn wait_prompt_choice(&mut self) -> PromptChoice;
}

pub struct Session<'a> {
    input: &'a mut dyn InputSource,
    surface: &'a mut dyn Surface,
    clock: &'a mut dyn Clock,
    rng: &'a mut dyn RandomSource,
    observer: &'a mut dyn MoveObserver,
    rules: RulesConfig,
    pub state: SessionState,
    pub sessions_played: u32,
}

impl<'a> Session<'a> {
    pub fn new(
        input: &'a mut dyn InputSource,
        surface: &'a mut dyn Surface,
        clock: &'a mut dyn Clock,
        rng: &'a mut dyn RandomSource,
        observer: &'a mut dyn MoveObserver,
        rules: RulesConfig,
    ) -> Self {
        let state = SessionState::new(&rules, rng);
        Session {
            input,
            surface,
            clock,
            rng,
            observer,
            rules,
            state,
            sessions_played: 1,
        }
    }

    /// Run until the player quits. Only terminal I/O can fail.
    pub fn run(&mut self) -> Result<(), GameError> {
        loop {
            if self.input.poll_quit_requested() {
                log::info!("quit requested on tick {}", self.state.tick);
                return Ok(());
            }

            let held = self.input.held_directions();
            let now = self.clock.now_millis();
            let events = step::step(&mut self.state, held, now, self.rng);
            self.dispatch(&events);

            scene::draw_session(self.surface, &self.state)?;
            self.clock.sleep_until_next_tick();

            if self.state.is_terminal() {
                log::info!(
                    "session {} over after {} ticks: {}",
                    self.sessions_played,
                    self.state.tick,
                    if self.state.win { "win" } else { "caught" }
                );
                scene::draw_prompt(self.surface, &self.state)?;
                match self.input.wait_prompt_choice() {
                    PromptChoice::Restart => self.restart(),
                    PromptChoice::Quit => return Ok(()),
                }
            }
        }
    }

    fn restart(&mut self) {
        self.state = SessionState::new(&self.rules, self.rng);
        self.sessions_played += 1;
        log::info!("restart: session {}", self.sessions_played);
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        let tick = self.state.tick;
        for event in events {
            match *event {
                GameEvent::PlayerMoved(dir) => self.observer.on_move(dir),
                GameEvent::PickupEaten { x, y } => log::trace!("tick {tick}: pickup ({x},{y})"),
                GameEvent::PowerUpTaken { x, y, ends_at } => {
                    log::debug!("tick {tick}: power pickup ({x},{y}), powered until {ends_at} ms");
                }
                GameEvent::PowerUpExpired => log::debug!("tick {tick}: power-up expired"),
                GameEvent::AdversarySubdued { id, until } => {
                    log::debug!("tick {tick}: adversary {id} subdued until {until} ms");
                }
                GameEvent::PlayerCaught { id } => log::info!("tick {tick}: caught by adversary {id}"),
                GameEvent::AllPickupsCleared => log::info!("tick {tick}: all pickups cleared"),
            }
        }
    }
}
