/// The step function: advances a session by one tick.
///
/// Processing order:
///   1. Player movement (left, right, up, down; each held key applied
///      against the position left by the previous one)
///   2. Pickup consumption
///   3. Power pickup consumption → power-up starts
///   4. Power-up expiry
///   5. Adversaries, in index order: decide, move, then test contact
///   6. Win check
///
/// Entity-vs-wall uses corner sampling; entity-vs-entity and
/// entity-vs-pickup use full rectangle overlap (see `domain::physics`).

use crate::domain::ai::{self, RandomSource};
use crate::domain::entity::HeldDirections;
use crate::domain::maze::Maze;
use crate::domain::physics;
use super::event::GameEvent;
use super::world::SessionState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(
    state: &mut SessionState,
    held: HeldDirections,
    now_ms: u64,
    rng: &mut dyn RandomSource,
) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    if state.is_terminal() { return events; }
    state.tick += 1;

    resolve_player_movement(state, held, &mut events);
    resolve_pickups(state, &mut events);
    resolve_power_pickups(state, now_ms, &mut events);
    resolve_power_expiry(state, now_ms, &mut events);
    resolve_adversaries(state, now_ms, rng, &mut events);
    resolve_win(state, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(state: &mut SessionState, held: HeldDirections, events: &mut Vec<GameEvent>) {
    for dir in held.in_order() {
        let res = physics::try_step(state.player.rect, dir, &state.maze);
        if res.accepted {
            state.player.rect = res.rect;
            events.push(GameEvent::PlayerMoved(dir));
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Pickups
// ══════════════════════════════════════════════════════════════

fn resolve_pickups(state: &mut SessionState, events: &mut Vec<GameEvent>) {
    let player = state.player.rect;
    let eaten: Vec<(i32, i32)> = state.pickups.iter()
        .copied()
        .filter(|&(x, y)| physics::touching(player, Maze::pickup_rect(x, y)))
        .collect();
    for (x, y) in eaten {
        if state.pickups.remove(&(x, y)) {
            events.push(GameEvent::PickupEaten { x, y });
        }
    }
}

fn resolve_power_pickups(state: &mut SessionState, now_ms: u64, events: &mut Vec<GameEvent>) {
    let player = state.player.rect;
    let taken: Vec<(i32, i32)> = state.power_pickups.iter()
        .copied()
        .filter(|&(x, y)| physics::touching(player, Maze::pickup_rect(x, y)))
        .collect();
    for (x, y) in taken {
        if state.power_pickups.remove(&(x, y)) {
            state.power_up_active = true;
            state.power_up_ends_at = now_ms + state.rules.power_up_ms;
            events.push(GameEvent::PowerUpTaken { x, y, ends_at: state.power_up_ends_at });
        }
    }
}

fn resolve_power_expiry(state: &mut SessionState, now_ms: u64, events: &mut Vec<GameEvent>) {
    if state.power_up_active && now_ms > state.power_up_ends_at {
        state.power_up_active = false;
        events.push(GameEvent::PowerUpExpired);
    }
}

// ══════════════════════════════════════════════════════════════
// Adversaries
// ══════════════════════════════════════════════════════════════

fn resolve_adversaries(
    state: &mut SessionState,
    now_ms: u64,
    rng: &mut dyn RandomSource,
    events: &mut Vec<GameEvent>,
) {
    let player = state.player.rect;
    let chase = state.rules.chase_chance;
    let subdue_ms = state.rules.subdue_ms;

    for i in 0..state.adversaries.len() {
        let adversary = &mut state.adversaries[i];
        let intent = ai::advance(adversary, player, &state.maze, now_ms, chase, rng);
        log::trace!("tick {}: adversary {} {:?}", state.tick, adversary.id, intent);

        if !physics::touching(player, adversary.rect) { continue; }

        if state.power_up_active {
            adversary.subdue(now_ms + subdue_ms);
            events.push(GameEvent::AdversarySubdued { id: adversary.id, until: adversary.subdued_until });
        } else if !state.game_over {
            state.game_over = true;
            events.push(GameEvent::PlayerCaught { id: adversary.id });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Win check
// ══════════════════════════════════════════════════════════════

fn resolve_win(state: &mut SessionState, events: &mut Vec<GameEvent>) {
    if state.pickups.is_empty() && !state.win {
        state.win = true;
        events.push(GameEvent::AllPickupsCleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::domain::ai::tests::Scripted;
    use crate::domain::ai::RngSource;
    use crate::domain::entity::{Dir, Mood};
    use crate::domain::maze::CELL_SIZE;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Corridor session with scripted pickups:
    ///   row 1: `#      #`: player at (1,1)
    ///   row 2: `# #### #`
    ///   row 3: `#      #`
    fn corridor(adversaries: &[(i32, i32)], power: &[(i32, i32)]) -> SessionState {
        let maze = Maze::from_rows(&[
            "########",
            "#      #",
            "# #### #",
            "#      #",
            "########",
        ]);
        let rules = RulesConfig { power_pickup_chance: 0.0, ..RulesConfig::default() };
        let mut rng = Scripted::new(&[0.9; 14], &[]);
        let mut s = SessionState::with_maze(maze, adversaries, &rules, &mut rng);
        s.power_pickups = power.iter().copied().collect();
        s
    }

    fn idle() -> HeldDirections {
        HeldDirections::NONE
    }

    #[test]
    fn opposite_keys_apply_sequentially() {
        let mut s = corridor(&[], &[]);
        s.player.rect = Maze::cell_rect(3, 1);
        let held = HeldDirections { left: true, right: true, up: false, down: false };
        let mut rng = Scripted::new(&[], &[]);
        let events = step(&mut s, held, 0, &mut rng);
        // left to (2,1), then right back to (3,1)
        assert_eq!(s.player.rect, Maze::cell_rect(3, 1));
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::PlayerMoved(_))).count(),
            2
        );
    }

    #[test]
    fn left_then_down_round_a_corner() {
        let mut s = corridor(&[], &[]);
        s.player.rect = Maze::cell_rect(2, 1);
        let held = HeldDirections { left: true, right: false, up: false, down: true };
        let mut rng = Scripted::new(&[], &[]);
        step(&mut s, held, 0, &mut rng);
        // (2,1) → left (1,1) → down (1,2)
        assert_eq!(s.player.rect, Maze::cell_rect(1, 2));
    }

    #[test]
    fn blocked_key_does_not_move_or_notify() {
        let mut s = corridor(&[], &[]);
        let mut rng = Scripted::new(&[], &[]);
        let events = step(&mut s, HeldDirections::only(Dir::Up), 0, &mut rng);
        assert_eq!(s.player.rect, Maze::cell_rect(1, 1));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlayerMoved(_))));
    }

    #[test]
    fn pickups_under_player_are_eaten_once() {
        let mut s = corridor(&[], &[]);
        let total = s.pickups.len();
        let mut rng = Scripted::new(&[], &[]);
        let events = step(&mut s, idle(), 0, &mut rng);
        assert!(events.contains(&GameEvent::PickupEaten { x: 1, y: 1 }));
        assert_eq!(s.pickups.len(), total - 1);

        let events = step(&mut s, idle(), 100, &mut rng);
        assert!(events.is_empty());
        assert_eq!(s.pickups.len(), total - 1);

        step(&mut s, HeldDirections::only(Dir::Right), 200, &mut rng);
        assert!(!s.pickups.contains(&(2, 1)));
        assert_eq!(s.pickups.len(), total - 2);
    }

    #[test]
    fn power_up_lasts_until_strictly_after_deadline() {
        let mut s = corridor(&[], &[(2, 1)]);
        let mut rng = Scripted::new(&[], &[]);
        let t = 1_000;
        step(&mut s, HeldDirections::only(Dir::Right), t, &mut rng);
        assert!(s.power_up_active);
        assert_eq!(s.power_up_ends_at, t + 5000);
        assert!(s.power_pickups.is_empty());

        step(&mut s, idle(), t + 4_900, &mut rng);
        assert!(s.power_up_active);
        let events = step(&mut s, idle(), t + 5_000, &mut rng);
        assert!(s.power_up_active);
        assert!(!events.contains(&GameEvent::PowerUpExpired));
        let events = step(&mut s, idle(), t + 5_001, &mut rng);
        assert!(!s.power_up_active);
        assert!(events.contains(&GameEvent::PowerUpExpired));
    }

    #[test]
    fn second_power_pickup_extends_deadline() {
        let mut s = corridor(&[], &[(2, 1), (3, 1)]);
        let mut rng = Scripted::new(&[], &[]);
        step(&mut s, HeldDirections::only(Dir::Right), 0, &mut rng);
        step(&mut s, HeldDirections::only(Dir::Right), 3_000, &mut rng);
        assert_eq!(s.power_up_ends_at, 8_000);
        step(&mut s, idle(), 6_000, &mut rng);
        assert!(s.power_up_active);
    }

    #[test]
    fn unpowered_contact_is_game_over_same_tick() {
        // adversary one cell to the right, always chases
        let mut s = corridor(&[(2, 1)], &[]);
        let mut rng = Scripted::always_chase();
        let events = step(&mut s, idle(), 0, &mut rng);
        assert!(s.game_over);
        assert!(!s.win);
        assert!(events.contains(&GameEvent::PlayerCaught { id: 0 }));
        assert!(s.is_terminal());
    }

    #[test]
    fn frozen_after_game_over() {
        let mut s = corridor(&[(2, 1)], &[]);
        let mut rng = Scripted::always_chase();
        step(&mut s, idle(), 0, &mut rng);
        let snapshot = s.clone();
        let events = step(&mut s, HeldDirections::only(Dir::Right), 100, &mut rng);
        assert!(events.is_empty());
        assert_eq!(s, snapshot);
    }

    #[test]
    fn walking_onto_an_adversary_is_caught() {
        // Player moves first; the adversary, now co-located, has no chase
        // step and the contact test fires.
        let mut s = corridor(&[(2, 1)], &[]);
        let mut rng = Scripted::always_chase();
        let events = step(&mut s, HeldDirections::only(Dir::Right), 0, &mut rng);
        assert_eq!(s.player.rect, Maze::cell_rect(2, 1));
        assert_eq!(s.adversaries[0].rect, Maze::cell_rect(2, 1));
        assert!(s.game_over);
        assert!(events.contains(&GameEvent::PlayerCaught { id: 0 }));
    }

    #[test]
    fn powered_contact_subdues_and_sends_home() {
        // Player takes a power pickup, then an adversary walks onto it
        // within the power-up window.
        let mut s = corridor(&[(6, 1)], &[(2, 1)]);
        let mut rng = Scripted::new(&[0.9; 2], &[1, 1]); // wander left twice
        step(&mut s, HeldDirections::only(Dir::Right), 0, &mut rng);
        assert!(s.power_up_active);
        assert_eq!(s.adversaries[0].rect, Maze::cell_rect(5, 1));

        s.player.rect = Maze::cell_rect(4, 1);
        step(&mut s, idle(), 1_000, &mut rng);

        let a = &s.adversaries[0];
        assert_eq!(a.rect.top_left(), a.home);
        assert_eq!(a.rect, Maze::cell_rect(6, 1));
        assert_eq!(a.mood, Mood::Subdued);
        assert_eq!(a.subdued_until, 6_000);
        assert!(!s.game_over);
    }

    #[test]
    fn subdued_adversary_stays_home_until_timer_elapses() {
        let mut s = corridor(&[(6, 1)], &[]);
        s.adversaries[0].subdued_until = 6_000;
        s.player.rect = Maze::cell_rect(1, 3);
        let mut rng = Scripted::new(&[], &[]);
        for now in (1_000..6_000).step_by(100) {
            step(&mut s, idle(), now, &mut rng);
            assert_eq!(s.adversaries[0].rect, Maze::cell_rect(6, 1));
            assert_eq!(s.adversaries[0].mood, Mood::Subdued);
        }
        let mut rng = Scripted::always_chase();
        step(&mut s, idle(), 6_000, &mut rng);
        assert_eq!(s.adversaries[0].mood, Mood::Active);
        assert_eq!(s.adversaries[0].rect, Maze::cell_rect(5, 1));
    }

    #[test]
    fn adversaries_run_in_index_order() {
        // Both adversaries land on the player; the first one ends the game
        // and the event names it.
        let mut s = corridor(&[(2, 1), (1, 2)], &[]);
        let mut rng = Scripted::always_chase();
        let events = step(&mut s, idle(), 0, &mut rng);
        let caught: Vec<_> = events.iter()
            .filter_map(|e| match e { GameEvent::PlayerCaught { id } => Some(*id), _ => None })
            .collect();
        assert_eq!(caught, vec![0]);
    }

    #[test]
    fn emptied_pickups_win_next_tick() {
        let mut s = corridor(&[(6, 3)], &[]);
        s.pickups.clear();
        let mut rng = Scripted::new(&[0.9], &[0]); // wander right into wall
        let events = step(&mut s, idle(), 0, &mut rng);
        assert!(s.win);
        assert!(!s.game_over);
        assert!(events.contains(&GameEvent::AllPickupsCleared));
        // terminal: further ticks change nothing
        step(&mut s, idle(), 100, &mut rng);
        assert!(s.win);
    }

    #[test]
    fn eating_the_last_pickup_wins() {
        let mut s = corridor(&[], &[]);
        s.pickups.retain(|&c| c == (2, 1));
        let mut rng = Scripted::new(&[], &[]);
        step(&mut s, idle(), 0, &mut rng);
        assert!(!s.win);
        step(&mut s, HeldDirections::only(Dir::Right), 100, &mut rng);
        assert!(s.win);
    }

    proptest! {
        #[test]
        fn pickups_only_shrink(seed in any::<u64>(), moves in proptest::collection::vec(0u8..16, 1..60)) {
            let rules = RulesConfig::default();
            let mut rng = RngSource(StdRng::seed_from_u64(seed));
            let mut s = SessionState::new(&rules, &mut rng);
            let mut prev = s.pickups.clone();
            for (i, bits) in moves.into_iter().enumerate() {
                let held = HeldDirections {
                    left: bits & 1 != 0,
                    right: bits & 2 != 0,
                    up: bits & 4 != 0,
                    down: bits & 8 != 0,
                };
                step(&mut s, held, i as u64 * 100, &mut rng);
                prop_assert!(s.pickups.is_subset(&prev));
                prop_assert!(s.maze.is_open(s.player.rect.x / CELL_SIZE, s.player.rect.y / CELL_SIZE));
                prev = s.pickups.clone();
            }
        }
    }
}
