//! Registered players.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique player identifier.
///
/// Random v4 UUIDs, so concurrent registrations never collide.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PlayerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// A registered player. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Player's unique ID.
    id: PlayerId,
    /// Display name chosen at registration.
    user_name: String,
}

impl Player {
    /// Creates a player with a freshly generated id.
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            user_name: user_name.into(),
        }
    }
}
