//! Matches: lifecycle, invariants, snapshots and storage.

mod game;
mod invariants;
mod snapshot;
mod store;

pub use game::{Match, MatchPhase, Outcome};
pub use invariants::{
    DecidedMeansEnded, DistinctMoves, Invariant, InvariantSet, InvariantViolation, MatchInvariants,
    MonotonicMoves, MoveTransition, SeatedStarter,
};
pub use snapshot::MatchSnapshot;
pub use store::MatchStore;

/// Unique identifier for a match.
///
/// Allocated sequentially inside the arena lock, so ids never collide.
pub type MatchId = u64;
