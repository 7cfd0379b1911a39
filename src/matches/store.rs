//! In-memory match storage.

use super::MatchId;
use super::game::{Match, MatchPhase};
use crate::player::PlayerId;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, instrument};

/// All matches ever created, in creation order.
///
/// Matches are never evicted. Pending matches are additionally queued so
/// the matchmaker can find the oldest one without scanning history.
#[derive(Debug, Default)]
pub struct MatchStore {
    matches: Vec<Match>,
    index: HashMap<MatchId, usize>,
    pending: VecDeque<MatchId>,
    next_id: MatchId,
}

impl MatchStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pending match for `player_one` and queues it.
    #[instrument(skip(self))]
    pub fn create(&mut self, player_one: PlayerId) -> MatchId {
        self.next_id += 1;
        let id = self.next_id;
        self.index.insert(id, self.matches.len());
        self.matches.push(Match::new(id, player_one));
        self.pending.push_back(id);
        id
    }

    /// Gets a match by id.
    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.index.get(&id).map(|&idx| &self.matches[idx])
    }

    /// Gets a mutable match by id.
    pub fn get_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        let idx = *self.index.get(&id)?;
        self.matches.get_mut(idx)
    }

    /// Removes and returns the oldest match still waiting for an opponent.
    ///
    /// Queue entries whose match has since started or been abandoned are
    /// discarded on the way.
    pub fn take_oldest_pending(&mut self) -> Option<MatchId> {
        while let Some(id) = self.pending.pop_front() {
            if self.get(id).map(Match::phase) == Some(MatchPhase::Pending) {
                return Some(id);
            }
            debug!(match_id = id, "Dropping stale pending entry");
        }
        None
    }

    /// Puts a pending match back at the head of the queue.
    pub fn requeue_front(&mut self, id: MatchId) {
        self.pending.push_front(id);
    }

    /// Number of matches still waiting for an opponent.
    pub fn pending_count(&self) -> usize {
        self.matches
            .iter()
            .filter(|m| m.phase() == MatchPhase::Pending)
            .count()
    }

    /// Number of matches ever created.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// True if no match was ever created.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Iterates matches in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter()
    }
}
