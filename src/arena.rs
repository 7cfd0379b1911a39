//! The synchronized service that owns all mutable server state.
//!
//! Every operation takes the arena lock for its full duration and publishes
//! the events it produces before the lock is released. Two clients watching
//! the same match therefore see its snapshots in the order the mutations
//! happened.

use crate::error::ArenaError;
use crate::gateway::{
    ClientEvent, MakeMoveRequest, Outbox, RegisterPlayerRequest, ResignRequest, Room, ServerEvent,
    StartMatchRequest,
};
use crate::matches::{Match, MatchId, MatchPhase, MatchSnapshot, MatchStore};
use crate::matchmaker::{self, Pairing};
use crate::player::{Player, PlayerId};
use crate::session::{ConnectionId, SessionRegistry};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
struct ArenaState {
    store: MatchStore,
    sessions: SessionRegistry,
    rng: StdRng,
}

/// Matches, sessions and the matchmaking queue behind one lock.
#[derive(Debug)]
pub struct Arena<O: Outbox> {
    state: Mutex<ArenaState>,
    outbox: O,
}

impl<O: Outbox> Arena<O> {
    /// Creates an arena whose starting-turn draws come from OS entropy.
    pub fn new(outbox: O) -> Self {
        Self::with_rng(outbox, StdRng::from_os_rng())
    }

    /// Creates an arena with a reproducible starting-turn sequence.
    pub fn with_seed(outbox: O, seed: u64) -> Self {
        Self::with_rng(outbox, StdRng::seed_from_u64(seed))
    }

    fn with_rng(outbox: O, rng: StdRng) -> Self {
        Self {
            state: Mutex::new(ArenaState {
                store: MatchStore::new(),
                sessions: SessionRegistry::new(),
                rng,
            }),
            outbox,
        }
    }

    /// The outbox events are published to.
    pub fn outbox(&self) -> &O {
        &self.outbox
    }

    fn lock(&self) -> Result<MutexGuard<'_, ArenaState>, ArenaError> {
        self.state.lock().map_err(|_| {
            warn!("Arena lock poisoned");
            ArenaError::Poisoned
        })
    }

    /// Starts tracking a connection.
    #[instrument(skip(self))]
    pub fn connect(&self, conn: ConnectionId) -> Result<(), ArenaError> {
        self.lock()?.sessions.open(conn);
        Ok(())
    }

    /// Creates a player for the connection and confirms it to the player room.
    #[instrument(skip(self, request), fields(user_name = %request.user_name))]
    pub fn register(
        &self,
        conn: ConnectionId,
        request: RegisterPlayerRequest,
    ) -> Result<Player, ArenaError> {
        let mut state = self.lock()?;
        let player = state.sessions.register(conn, request.user_name)?;

        let room = Room::Player(*player.id());
        self.outbox.join(conn, room);
        self.outbox.publish(room, ServerEvent::Registered(player.clone()));
        Ok(player)
    }

    /// Pairs the connection's player into a match.
    #[instrument(skip(self, request), fields(player_id = %request.player_id))]
    pub fn start(
        &self,
        conn: ConnectionId,
        request: StartMatchRequest,
    ) -> Result<MatchSnapshot, ArenaError> {
        let mut guard = self.lock()?;
        let ArenaState {
            store,
            sessions,
            rng,
        } = &mut *guard;

        let player = sessions.authorize(conn, request.player_id)?;
        if let Some(current) = sessions.current_match(conn) {
            return Err(ArenaError::AlreadyInMatch(current));
        }

        let pairing = matchmaker::find_or_create(store, player, rng)?;
        let match_id = pairing.match_id();
        sessions.attach_match(player, match_id);
        self.outbox.join(conn, Room::Match(match_id));

        let snapshot = lookup(store, match_id)?.snapshot();
        match pairing {
            Pairing::Created(_) => info!(match_id, "Player waiting for an opponent"),
            Pairing::Joined(_) => info!(
                match_id,
                starting_turn = ?snapshot.starting_turn,
                "Match started"
            ),
        }
        self.publish_snapshot(&snapshot);
        Ok(snapshot)
    }

    /// Plays a move for the connection's player.
    #[instrument(skip(self, request), fields(match_id = request.match_id, position = request.position))]
    pub fn make_move(
        &self,
        conn: ConnectionId,
        request: MakeMoveRequest,
    ) -> Result<MatchSnapshot, ArenaError> {
        let mut guard = self.lock()?;
        let ArenaState {
            store, sessions, ..
        } = &mut *guard;

        let player = *sessions.player(conn)?.id();
        let game = lookup_mut(store, request.match_id)?;
        game.add_move(player, request.position)?;

        let snapshot = game.snapshot();
        if snapshot.has_ended {
            sessions.release_match(snapshot.id);
        }
        self.publish_snapshot(&snapshot);
        Ok(snapshot)
    }

    /// Resigns the connection's player from a match.
    #[instrument(skip(self, request), fields(match_id = request.match_id, player_id = %request.player_id))]
    pub fn resign(
        &self,
        conn: ConnectionId,
        request: ResignRequest,
    ) -> Result<MatchSnapshot, ArenaError> {
        let mut guard = self.lock()?;
        let ArenaState {
            store, sessions, ..
        } = &mut *guard;

        let player = sessions.authorize(conn, request.player_id)?;
        let game = lookup_mut(store, request.match_id)?;
        game.resign(player)?;

        let snapshot = game.snapshot();
        sessions.release_match(snapshot.id);
        self.publish_snapshot(&snapshot);
        Ok(snapshot)
    }

    /// Forgets the connection and ends any unfinished match it was seated in.
    ///
    /// An active match is resigned on the player's behalf; a pending match is
    /// abandoned. Returns the final snapshot when a match was ended.
    #[instrument(skip(self))]
    pub fn disconnect(&self, conn: ConnectionId) -> Result<Option<MatchSnapshot>, ArenaError> {
        let mut guard = self.lock()?;
        let ended = self.vacate_seat(&mut guard, conn);
        self.outbox.leave_all(conn);
        ended
    }

    fn vacate_seat(
        &self,
        state: &mut ArenaState,
        conn: ConnectionId,
    ) -> Result<Option<MatchSnapshot>, ArenaError> {
        let Some(session) = state.sessions.close(conn) else {
            debug!("Disconnect for unknown connection");
            return Ok(None);
        };
        let (Some(player), Some(match_id)) = (session.player, session.current_match) else {
            return Ok(None);
        };

        let game = lookup_mut(&mut state.store, match_id)?;
        game.forfeit(*player.id())?;
        let snapshot = game.snapshot();
        state.sessions.release_match(match_id);

        info!(match_id, player_id = %player.id(), "Match ended by disconnect");
        self.publish_snapshot(&snapshot);
        Ok(Some(snapshot))
    }

    /// Current snapshot of a match.
    pub fn snapshot(&self, match_id: MatchId) -> Result<MatchSnapshot, ArenaError> {
        let state = self.lock()?;
        Ok(lookup(&state.store, match_id)?.snapshot())
    }

    /// Number of matches ever created.
    pub fn match_count(&self) -> Result<usize, ArenaError> {
        Ok(self.lock()?.store.len())
    }

    /// Number of matches in each phase, as `(pending, active, ended)`.
    pub fn phase_counts(&self) -> Result<(usize, usize, usize), ArenaError> {
        let state = self.lock()?;
        Ok(state
            .store
            .iter()
            .fold((0, 0, 0), |(p, a, e), game| match game.phase() {
                MatchPhase::Pending => (p + 1, a, e),
                MatchPhase::Active => (p, a + 1, e),
                MatchPhase::Ended => (p, a, e + 1),
            }))
    }

    /// Runs one client event, reporting any failure to the requester only.
    #[instrument(skip(self, event))]
    pub fn dispatch(&self, conn: ConnectionId, event: ClientEvent) {
        let result = match event {
            ClientEvent::Register(request) => self.register(conn, request).map(drop),
            ClientEvent::Start(request) => self.start(conn, request).map(drop),
            ClientEvent::Move(request) => self.make_move(conn, request).map(drop),
            ClientEvent::Resign(request) => self.resign(conn, request).map(drop),
        };

        if let Err(err) = result {
            warn!(conn, kind = %err.kind(), error = %err, "Request rejected");
            self.outbox.send(conn, ServerEvent::Error((&err).into()));
        }
    }

    /// Player registered on a connection, if any.
    pub fn player_of(&self, conn: ConnectionId) -> Result<Option<PlayerId>, ArenaError> {
        let state = self.lock()?;
        Ok(state.sessions.player(conn).ok().map(|p| *p.id()))
    }

    fn publish_snapshot(&self, snapshot: &MatchSnapshot) {
        self.outbox
            .publish(Room::Match(snapshot.id), ServerEvent::Match(snapshot.clone()));
    }
}

fn lookup(store: &MatchStore, id: MatchId) -> Result<&Match, ArenaError> {
    store.get(id).ok_or(ArenaError::UnknownMatch(id))
}

fn lookup_mut(store: &mut MatchStore, id: MatchId) -> Result<&mut Match, ArenaError> {
    store.get_mut(id).ok_or(ArenaError::UnknownMatch(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, InvalidMove, MatchError};
    use crate::gateway::RoomHub;
    use crate::matches::Outcome;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Client {
        conn: ConnectionId,
        rx: UnboundedReceiver<ServerEvent>,
        id: PlayerId,
    }

    impl Client {
        fn drain(&mut self) -> Vec<ServerEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                events.push(event);
            }
            events
        }
    }

    fn arena() -> Arena<RoomHub> {
        Arena::with_seed(RoomHub::new(), 42)
    }

    fn join(arena: &Arena<RoomHub>, name: &str) -> Client {
        let (conn, rx) = arena.outbox().connect();
        arena.connect(conn).unwrap();
        let player = arena
            .register(
                conn,
                RegisterPlayerRequest {
                    user_name: name.into(),
                },
            )
            .unwrap();
        Client {
            conn,
            rx,
            id: *player.id(),
        }
    }

    fn start(arena: &Arena<RoomHub>, client: &Client) -> Result<MatchSnapshot, ArenaError> {
        arena.start(
            client.conn,
            StartMatchRequest {
                player_id: client.id,
            },
        )
    }

    fn play(
        arena: &Arena<RoomHub>,
        client: &Client,
        match_id: MatchId,
        position: u8,
    ) -> Result<MatchSnapshot, ArenaError> {
        arena.make_move(client.conn, MakeMoveRequest { match_id, position })
    }

    /// Returns the pair as (starter, other) along with the match id.
    fn paired(arena: &Arena<RoomHub>) -> (Client, Client, MatchId) {
        let a = join(arena, "a");
        let b = join(arena, "b");
        start(arena, &a).unwrap();
        let snapshot = start(arena, &b).unwrap();
        if snapshot.starting_turn == Some(a.id) {
            (a, b, snapshot.id)
        } else {
            (b, a, snapshot.id)
        }
    }

    #[test]
    fn test_register_confirms_to_requester() {
        let arena = arena();
        let mut a = join(&arena, "alice");
        let events = a.drain();
        assert_eq!(events.len(), 1);
        let ServerEvent::Registered(player) = &events[0] else {
            panic!("expected registered, got {:?}", events[0]);
        };
        assert_eq!(player.user_name(), "alice");
        assert_eq!(*player.id(), a.id);
    }

    #[test]
    fn test_start_pairs_two_players() {
        let arena = arena();
        let mut a = join(&arena, "a");
        let mut b = join(&arena, "b");
        a.drain();
        b.drain();

        let pending = start(&arena, &a).unwrap();
        assert!(!pending.has_started);
        let active = start(&arena, &b).unwrap();
        assert_eq!(active.id, pending.id);
        assert!(active.has_started);
        assert!(active.starting_turn == Some(a.id) || active.starting_turn == Some(b.id));

        assert_eq!(
            a.drain(),
            vec![
                ServerEvent::Match(pending.clone()),
                ServerEvent::Match(active.clone())
            ]
        );
        assert_eq!(b.drain(), vec![ServerEvent::Match(active)]);
        assert_eq!(arena.match_count().unwrap(), 1);
    }

    #[test]
    fn test_start_requires_registration_and_identity() {
        let arena = arena();
        let (conn, _rx) = arena.outbox().connect();
        arena.connect(conn).unwrap();
        let unregistered = arena.start(
            conn,
            StartMatchRequest {
                player_id: PlayerId::new(),
            },
        );
        assert_eq!(unregistered, Err(ArenaError::NotRegistered));

        let a = join(&arena, "a");
        let impostor = arena.start(
            a.conn,
            StartMatchRequest {
                player_id: PlayerId::new(),
            },
        );
        assert_eq!(impostor, Err(ArenaError::UnknownPlayer));
    }

    #[test]
    fn test_start_twice_rejected() {
        let arena = arena();
        let a = join(&arena, "a");
        let pending = start(&arena, &a).unwrap();
        assert_eq!(
            start(&arena, &a),
            Err(ArenaError::AlreadyInMatch(pending.id))
        );
        assert_eq!(arena.phase_counts().unwrap(), (1, 0, 0));
    }

    #[test]
    fn test_example_game_starter_wins_diagonal() {
        let arena = arena();
        let (starter, other, id) = paired(&arena);

        play(&arena, &starter, id, 1).unwrap();
        play(&arena, &other, id, 2).unwrap();
        play(&arena, &starter, id, 5).unwrap();
        play(&arena, &other, id, 3).unwrap();
        let last = play(&arena, &starter, id, 9).unwrap();

        assert!(last.has_ended);
        assert_eq!(last.winner, Some(starter.id));
        assert_eq!(last.outcome, Some(Outcome::Win { winner: starter.id }));

        // Seats are released, so both can queue again.
        assert!(!start(&arena, &starter).unwrap().has_started);
        assert!(start(&arena, &other).unwrap().has_started);
    }

    #[test]
    fn test_rejected_move_reports_to_requester_only() {
        let arena = arena();
        let (mut starter, mut other, id) = paired(&arena);
        starter.drain();
        other.drain();

        arena.dispatch(
            other.conn,
            ClientEvent::Move(MakeMoveRequest {
                match_id: id,
                position: 5,
            }),
        );

        let events = other.drain();
        assert_eq!(events.len(), 1);
        let ServerEvent::Error(notice) = &events[0] else {
            panic!("expected error, got {:?}", events[0]);
        };
        assert_eq!(notice.kind, ErrorKind::InvalidMove);
        assert!(starter.drain().is_empty());
        assert!(arena.snapshot(id).unwrap().moves.is_empty());
    }

    #[test]
    fn test_move_errors() {
        let arena = arena();
        let (starter, other, id) = paired(&arena);

        assert_eq!(
            play(&arena, &starter, id + 10, 1),
            Err(ArenaError::UnknownMatch(id + 10))
        );
        assert_eq!(
            play(&arena, &starter, id, 0),
            Err(InvalidMove::OutOfBounds(0).into())
        );
        play(&arena, &starter, id, 4).unwrap();
        assert_eq!(
            play(&arena, &other, id, 4).map(drop).unwrap_err().kind(),
            ErrorKind::InvalidMove
        );

        let outsider = join(&arena, "c");
        assert_eq!(
            play(&arena, &outsider, id, 7),
            Err(MatchError::NotParticipant.into())
        );
    }

    #[test]
    fn test_resign_awards_opponent() {
        let arena = arena();
        let (starter, other, id) = paired(&arena);

        let snapshot = arena
            .resign(
                other.conn,
                ResignRequest {
                    player_id: other.id,
                    match_id: id,
                },
            )
            .unwrap();
        assert_eq!(snapshot.winner, Some(starter.id));
        assert_eq!(
            play(&arena, &starter, id, 1),
            Err(MatchError::MatchAlreadyEnded(id).into())
        );
    }

    #[test]
    fn test_resign_pending_rejected() {
        let arena = arena();
        let a = join(&arena, "a");
        let pending = start(&arena, &a).unwrap();
        let result = arena.resign(
            a.conn,
            ResignRequest {
                player_id: a.id,
                match_id: pending.id,
            },
        );
        assert_eq!(result, Err(MatchError::MatchNotStarted(pending.id).into()));
    }

    #[test]
    fn test_disconnect_active_forfeits() {
        let arena = arena();
        let (starter, mut other, id) = paired(&arena);
        other.drain();

        let ended = arena.disconnect(starter.conn).unwrap().unwrap();
        assert_eq!(ended.winner, Some(other.id));
        assert_eq!(other.drain(), vec![ServerEvent::Match(ended)]);
        assert_eq!(
            play(&arena, &other, id, 1),
            Err(MatchError::MatchAlreadyEnded(id).into())
        );
        assert!(arena.outbox().members(Room::Player(starter.id)).is_empty());
    }

    #[test]
    fn test_disconnect_pending_abandons() {
        let arena = arena();
        let a = join(&arena, "a");
        let pending = start(&arena, &a).unwrap();

        let ended = arena.disconnect(a.conn).unwrap().unwrap();
        assert_eq!(ended.outcome, Some(Outcome::Abandoned));
        assert_eq!(ended.winner, None);

        // The next player gets a fresh match rather than the abandoned one.
        let b = join(&arena, "b");
        let fresh = start(&arena, &b).unwrap();
        assert_ne!(fresh.id, pending.id);
        assert!(!fresh.has_started);
    }

    #[test]
    fn test_disconnect_without_match() {
        let arena = arena();
        let a = join(&arena, "a");
        assert_eq!(arena.disconnect(a.conn), Ok(None));
        assert_eq!(arena.disconnect(a.conn), Ok(None));
    }

    #[test]
    fn test_same_seed_same_starter() {
        let starters: Vec<bool> = (0..2)
            .map(|_| {
                let arena = arena();
                let a = join(&arena, "a");
                let b = join(&arena, "b");
                start(&arena, &a).unwrap();
                start(&arena, &b).unwrap().starting_turn == Some(a.id)
            })
            .collect();
        assert_eq!(starters[0], starters[1]);
    }
}
