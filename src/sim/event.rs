/// Events emitted during a simulation step.
/// The session loop logs them and forwards player moves to the observer.

use crate::domain::entity::Dir;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved(Dir),
    PickupEaten { x: i32, y: i32 },
    PowerUpTaken { x: i32, y: i32, ends_at: u64 },
    PowerUpExpired,
    AdversarySubdued { id: usize, until: u64 },
    PlayerCaught { id: usize },
    AllPickupsCleared,
}
