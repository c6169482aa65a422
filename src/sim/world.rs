/// SessionState: everything one playthrough owns.
///
/// Built wholesale by `SessionState::new` and replaced wholesale on
/// restart; nothing is reset field by field. The maze is immutable for the
/// lifetime of the session. Pickups are stored by cell and only ever
/// removed.

use std::collections::BTreeSet;

use crate::config::RulesConfig;
use crate::domain::ai::RandomSource;
use crate::domain::entity::{Adversary, Player};
use crate::domain::geom::Rect;
use crate::domain::maze::Maze;

pub const PLAYER_START: (i32, i32) = (1, 1);
pub const ADVERSARY_STARTS: [(i32, i32); 2] = [(18, 1), (18, 18)];

#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub maze: Maze,

    // ── Entities ──
    pub player: Player,
    pub adversaries: Vec<Adversary>,

    // ── Pickups (cell coordinates) ──
    pub pickups: BTreeSet<(i32, i32)>,
    pub power_pickups: BTreeSet<(i32, i32)>,

    // ── Session flags ──
    pub power_up_active: bool,
    pub power_up_ends_at: u64,
    pub game_over: bool,
    pub win: bool,

    pub rules: RulesConfig,
    pub tick: u64,
}

impl SessionState {
    /// Fresh session on the classic maze.
    pub fn new(rules: &RulesConfig, rng: &mut dyn RandomSource) -> Self {
        SessionState::with_maze(Maze::classic(), &ADVERSARY_STARTS, rules, rng)
    }

    /// Fresh session on an arbitrary maze. One pickup per open cell; each
    /// open cell independently also gets a power pickup.
    pub fn with_maze(
        maze: Maze,
        adversary_starts: &[(i32, i32)],
        rules: &RulesConfig,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let pickups: BTreeSet<(i32, i32)> = maze.open_cells().collect();
        let power_pickups: BTreeSet<(i32, i32)> = maze
            .open_cells()
            .filter(|_| rng.chance(rules.power_pickup_chance))
            .collect();

        let adversaries = adversary_starts
            .iter()
            .enumerate()
            .map(|(id, &(x, y))| Adversary::at_cell(id, x, y))
            .collect();

        log::info!(
            "session start: {} pickups, {} power pickups",
            pickups.len(),
            power_pickups.len()
        );

        SessionState {
            maze,
            player: Player::at_cell(PLAYER_START.0, PLAYER_START.1),
            adversaries,
            pickups,
            power_pickups,
            power_up_active: false,
            power_up_ends_at: 0,
            game_over: false,
            win: false,
            rules: rules.clone(),
            tick: 0,
        }
    }

    /// Game over or win: the loop hands control to the restart prompt.
    pub fn is_terminal(&self) -> bool {
        self.game_over || self.win
    }

    pub fn pickup_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.pickups.iter().map(|&(x, y)| Maze::pickup_rect(x, y))
    }

    pub fn power_pickup_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.power_pickups.iter().map(|&(x, y)| Maze::pickup_rect(x, y))
    }
}
