//! Serializable projection of a match.

use super::MatchId;
use super::game::Outcome;
use crate::games::tictactoe::{Board, Position, player_to_move};
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Full match state as broadcast to both players.
///
/// Carries enough for a client to rebuild the board and work out whose
/// turn it is without asking the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    /// Match id.
    pub id: MatchId,
    /// Player who created the match.
    pub player_one_id: PlayerId,
    /// Player who joined, once paired.
    pub player_two_id: Option<PlayerId>,
    /// Both players seated.
    pub has_started: bool,
    /// Terminal.
    pub has_ended: bool,
    /// Player holding the first move.
    pub starting_turn: Option<PlayerId>,
    /// Moves in play order, as 1-9.
    pub moves: Vec<Position>,
    /// Winner; null for a draw, an abandoned match, or a match in play.
    pub winner: Option<PlayerId>,
    /// How the match ended.
    pub outcome: Option<Outcome>,
    /// Player due to move while the match is active.
    pub next_turn: Option<PlayerId>,
}

impl MatchSnapshot {
    /// Rebuilds the board from the move list.
    pub fn board(&self) -> Board {
        Board::from_moves(&self.moves)
    }

    /// Client-side turn check: whether `player` should be prompted for a move.
    ///
    /// Uses the same parity rule as the server.
    pub fn is_turn_of(&self, player: PlayerId) -> bool {
        if !self.has_started || self.has_ended {
            return false;
        }
        let (Some(starting), Some(two)) = (self.starting_turn, self.player_two_id) else {
            return false;
        };
        let other = if starting == self.player_one_id {
            two
        } else {
            self.player_one_id
        };
        player_to_move(starting, other, self.moves.len()) == player
    }
}

#[cfg(test)]
mod tests {
    use super::super::Match;
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_pending_snapshot() {
        let one = PlayerId::new();
        let snap = Match::new(5, one).snapshot();
        assert_eq!(snap.id, 5);
        assert_eq!(snap.player_one_id, one);
        assert!(!snap.has_started);
        assert!(!snap.has_ended);
        assert!(!snap.is_turn_of(one));
    }

    #[test]
    fn test_client_turn_rule_matches_server() {
        let mut game = Match::new(1, PlayerId::new());
        game.join(PlayerId::new(), &mut StdRng::seed_from_u64(11)).unwrap();
        let starter = game.starting_turn().unwrap();
        let other = game.opponent_of(starter).unwrap();

        for (k, n) in [5u8, 1, 9, 3].into_iter().enumerate() {
            let snap = game.snapshot();
            let mover = if k % 2 == 0 { starter } else { other };
            assert!(snap.is_turn_of(mover));
            assert!(!snap.is_turn_of(game.opponent_of(mover).unwrap()));
            assert_eq!(snap.next_turn, Some(mover));
            game.add_move(mover, n).unwrap();
        }
    }

    #[test]
    fn test_wire_field_names() {
        let mut game = Match::new(2, PlayerId::new());
        game.join(PlayerId::new(), &mut StdRng::seed_from_u64(1)).unwrap();
        let json = serde_json::to_value(game.snapshot()).unwrap();
        for field in [
            "id",
            "playerOneId",
            "playerTwoId",
            "hasStarted",
            "hasEnded",
            "startingTurn",
            "moves",
            "winner",
            "outcome",
            "nextTurn",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["hasStarted"], true);
        assert!(json["winner"].is_null());
    }

    #[test]
    fn test_board_from_snapshot() {
        let mut game = Match::new(2, PlayerId::new());
        game.join(PlayerId::new(), &mut StdRng::seed_from_u64(1)).unwrap();
        let starter = game.starting_turn().unwrap();
        game.add_move(starter, 5).unwrap();
        let board = game.snapshot().board();
        assert!(!board.is_empty(Position::Center));
        assert_eq!(board.open_positions().len(), 8);
    }
}
