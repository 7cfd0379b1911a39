//! First-come first-served pairing.

use crate::error::MatchError;
use crate::matches::{MatchId, MatchStore};
use crate::player::PlayerId;
use rand::Rng;
use tracing::{info, instrument, warn};

/// What the matchmaker did for a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// No one was waiting; a new pending match was opened.
    Created(MatchId),
    /// The player took the second seat of the oldest pending match.
    Joined(MatchId),
}

impl Pairing {
    /// Match the player ended up in.
    pub fn match_id(self) -> MatchId {
        match self {
            Pairing::Created(id) | Pairing::Joined(id) => id,
        }
    }
}

/// Seats `player` in the oldest pending match, or opens a new one.
///
/// Callers must hold exclusive access to the store for the whole call so
/// the scan and the claim happen as one step.
#[instrument(skip(store, rng))]
pub fn find_or_create<R: Rng + ?Sized>(
    store: &mut MatchStore,
    player: PlayerId,
    rng: &mut R,
) -> Result<Pairing, MatchError> {
    let Some(id) = store.take_oldest_pending() else {
        let id = store.create(player);
        info!(match_id = id, "No pending match, opened a new one");
        return Ok(Pairing::Created(id));
    };

    let Some(pending) = store.get_mut(id) else {
        return Err(MatchError::MatchNotStarted(id));
    };
    if let Err(err) = pending.join(player, rng) {
        warn!(match_id = id, error = %err, "Could not join pending match");
        store.requeue_front(id);
        return Err(err);
    }

    info!(match_id = id, "Paired into pending match");
    Ok(Pairing::Joined(id))
}
