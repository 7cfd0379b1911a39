//! Matchmaking and match lifecycle through the arena, including
//! concurrent pairing.

use std::sync::{Arc, Barrier};
use std::thread;
use strictly_matchmaker::{
    Arena, ArenaError, ConnectionId, MakeMoveRequest, MatchError, MatchSnapshot,
    Outcome, PlayerId, RegisterPlayerRequest, ResignRequest, RoomHub, ServerEvent,
    StartMatchRequest, shared_arena,
};
use tokio::sync::mpsc::UnboundedReceiver;

struct Client {
    conn: ConnectionId,
    id: PlayerId,
    rx: UnboundedReceiver<ServerEvent>,
}

fn connect(arena: &Arena<Arc<RoomHub>>, name: &str) -> Client {
    let (conn, rx) = arena.outbox().connect();
    arena.connect(conn).unwrap();
    let player = arena
        .register(conn, RegisterPlayerRequest { user_name: name.to_string() })
        .unwrap();
    Client { conn, id: *player.id(), rx }
}

fn snapshots(client: &mut Client) -> Vec<MatchSnapshot> {
    let mut out = Vec::new();
    while let Ok(event) = client.rx.try_recv() {
        if let ServerEvent::Match(snapshot) = event {
            out.push(snapshot);
        }
    }
    out
}

#[test]
fn test_concurrent_start_pairs_exactly_once() {
    for round in 0..50 {
        let arena = shared_arena(Some(round));
        let a = connect(&arena, "a");
        let b = connect(&arena, "b");
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [(a.conn, a.id), (b.conn, b.id)]
            .into_iter()
            .map(|(conn, id)| {
                let arena = Arc::clone(&arena);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    arena.start(conn, StartMatchRequest { player_id: id })
                })
            })
            .collect();

        let results: Vec<MatchSnapshot> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        assert_eq!(arena.match_count().unwrap(), 1, "round {round}");
        assert_eq!(results[0].id, results[1].id);
        let game = arena.snapshot(results[0].id).unwrap();
        assert!(game.has_started);
        assert_ne!(game.player_one_id, game.player_two_id.unwrap());
        assert_eq!(arena.phase_counts().unwrap(), (0, 1, 0));
    }
}

#[test]
fn test_many_concurrent_starts_never_leave_two_pending() {
    let arena = shared_arena(Some(3));
    let clients: Vec<Client> = (0..16).map(|i| connect(&arena, &format!("p{i}"))).collect();
    let barrier = Arc::new(Barrier::new(clients.len()));

    let handles: Vec<_> = clients
        .iter()
        .map(|c| {
            let (conn, id) = (c.conn, c.id);
            let arena = Arc::clone(&arena);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                arena.start(conn, StartMatchRequest { player_id: id }).map(|s| s.id)
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert_eq!(arena.match_count().unwrap(), 8);
    assert_eq!(arena.phase_counts().unwrap(), (0, 8, 0));
}

#[test]
fn test_snapshots_arrive_in_mutation_order() {
    let arena = shared_arena(Some(11));
    let mut a = connect(&arena, "a");
    let mut b = connect(&arena, "b");
    arena.start(a.conn, StartMatchRequest { player_id: a.id }).unwrap();
    let started = arena.start(b.conn, StartMatchRequest { player_id: b.id }).unwrap();

    let (first, second) = if started.starting_turn == Some(a.id) { (&a, &b) } else { (&b, &a) };
    for (i, position) in [1u8, 2, 5, 3, 9].into_iter().enumerate() {
        let mover = if i % 2 == 0 { first } else { second };
        arena
            .make_move(mover.conn, MakeMoveRequest { match_id: started.id, position })
            .unwrap();
    }
    let (first_id, a_id) = (first.id, a.id);

    for client in [&mut a, &mut b] {
        let lengths: Vec<usize> = snapshots(client)
            .iter()
            .filter(|s| s.has_started)
            .map(|s| s.moves.len())
            .collect();
        assert_eq!(lengths, vec![0, 1, 2, 3, 4, 5]);
    }

    let last = arena.snapshot(started.id).unwrap();
    assert_eq!(last.winner, Some(first_id));
    assert_eq!(last.outcome, Some(Outcome::Win { winner: first_id }));
    assert_eq!(last.board().open_positions().len(), 4);
    assert!(!last.is_turn_of(a_id));
}

#[test]
fn test_disconnect_mid_match_then_move_rejected() {
    let arena = shared_arena(Some(5));
    let a = connect(&arena, "a");
    let mut b = connect(&arena, "b");
    arena.start(a.conn, StartMatchRequest { player_id: a.id }).unwrap();
    let started = arena.start(b.conn, StartMatchRequest { player_id: b.id }).unwrap();
    snapshots(&mut b);

    arena.disconnect(a.conn).unwrap();
    let seen = snapshots(&mut b);
    assert_eq!(seen.len(), 1);
    assert!(seen[0].has_ended);
    assert_eq!(seen[0].winner, Some(b.id));

    let result = arena.make_move(b.conn, MakeMoveRequest { match_id: started.id, position: 5 });
    assert_eq!(result, Err(ArenaError::Match(MatchError::MatchAlreadyEnded(started.id))));

    let resign = arena.resign(b.conn, ResignRequest { player_id: b.id, match_id: started.id });
    assert_eq!(resign, Err(ArenaError::Match(MatchError::MatchAlreadyEnded(started.id))));
}

#[test]
fn test_draw_game() {
    let arena = shared_arena(Some(8));
    let a = connect(&arena, "a");
    let b = connect(&arena, "b");
    arena.start(a.conn, StartMatchRequest { player_id: a.id }).unwrap();
    let started = arena.start(b.conn, StartMatchRequest { player_id: b.id }).unwrap();
    let (first, second) = if started.starting_turn == Some(a.id) { (&a, &b) } else { (&b, &a) };

    let mut last = None;
    for (i, position) in [1u8, 2, 3, 5, 4, 6, 8, 7, 9].into_iter().enumerate() {
        let mover = if i % 2 == 0 { first } else { second };
        last = Some(
            arena
                .make_move(mover.conn, MakeMoveRequest { match_id: started.id, position })
                .unwrap(),
        );
    }

    let last = last.unwrap();
    assert!(last.has_ended);
    assert_eq!(last.winner, None);
    assert_eq!(last.outcome, Some(Outcome::Draw));
    assert_eq!(arena.phase_counts().unwrap(), (0, 0, 1));
    assert!(matches!(
        arena.snapshot(started.id).map(|s| s.has_ended),
        Ok(true)
    ));
}
