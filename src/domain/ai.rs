/// Adversary AI.
///
/// Each tick a free adversary flips a weighted coin:
///   1. **Chase**: greedy one-axis step toward the player. X is resolved
///      before Y, so the adversary lines up horizontally first.
///   2. **Wander**: one of the four unit directions, uniformly.
///
/// No pathfinding: a chase step into a wall is simply rejected by the
/// resolver and the adversary waits for a luckier roll.
///
/// Randomness is drawn through `RandomSource` so tests can script the
/// exact branch and direction taken.

use rand::Rng;

use super::entity::{Adversary, Dir, Mood};
use super::geom::Rect;
use super::maze::Maze;
use super::physics;

/// Source of the two random decisions the game makes.
pub trait RandomSource {
    /// Uniform sample in [0, 1).
    fn unit(&mut self) -> f64;
    /// Uniform index in [0, n). `n` is never 0.
    fn index(&mut self, n: usize) -> usize;

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }
}

/// Adapts any `rand` generator.
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn index(&mut self, n: usize) -> usize {
        self.0.gen_range(0..n)
    }
}

/// Which branch an adversary took this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    /// Subdued: no move attempted.
    Frozen,
    /// Chasing; `None` when already on the player's cell.
    Chase(Option<Dir>),
    Wander(Dir),
}

impl Intent {
    pub fn dir(self) -> Option<Dir> {
        match self {
            Intent::Frozen => None,
            Intent::Chase(d) => d,
            Intent::Wander(d) => Some(d),
        }
    }
}

/// Greedy chase step: +x, -x, +y, -y in that precedence.
pub fn chase_dir(from: Rect, target: Rect) -> Option<Dir> {
    if target.x > from.x {
        Some(Dir::Right)
    } else if target.x < from.x {
        Some(Dir::Left)
    } else if target.y > from.y {
        Some(Dir::Down)
    } else if target.y < from.y {
        Some(Dir::Up)
    } else {
        None
    }
}

/// Decide this tick's intent and update the adversary's mood.
pub fn choose_intent(
    adversary: &mut Adversary,
    player: Rect,
    now_ms: u64,
    chase_chance: f64,
    rng: &mut dyn RandomSource,
) -> Intent {
    if adversary.is_subdued(now_ms) {
        adversary.mood = Mood::Subdued;
        return Intent::Frozen;
    }
    adversary.mood = Mood::Active;

    if rng.chance(chase_chance) {
        Intent::Chase(chase_dir(adversary.rect, player))
    } else {
        let pick = rng.index(Dir::WANDER.len());
        Intent::Wander(Dir::WANDER[pick])
    }
}

/// Run the decision and apply the move if the maze allows it.
/// Returns the intent for logging/tests.
pub fn advance(
    adversary: &mut Adversary,
    player: Rect,
    maze: &Maze,
    now_ms: u64,
    chase_chance: f64,
    rng: &mut dyn RandomSource,
) -> Intent {
    let intent = choose_intent(adversary, player, now_ms, chase_chance, rng);
    if let Some(dir) = intent.dir() {
        let res = physics::try_step(adversary.rect, dir, maze);
        if res.accepted {
            adversary.rect = res.rect;
        }
    }
    intent
}
