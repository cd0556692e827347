use super::board::{Board, Mark, Position};
use super::error::SessionError;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Only `X` is bound
    AwaitingOpponent,
    InProgress,
    Won(Mark),
    Tied,
    /// One side disconnected; no further moves are accepted
    Abandoned,
}

/// Result of an accepted move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Continue,
    Won(Mark),
    Tied,
}

/// A game between two marks (pure logic, no I/O)
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    turn: Mark,
    state: SessionState,
}

impl GameSession {
    /// A fresh session with `X` bound and waiting for `O`.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Mark::X,
            state: SessionState::AwaitingOpponent,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Bind `O`. Returns false if the session is no longer waiting for an opponent.
    pub fn bind_opponent(&mut self) -> bool {
        if self.state != SessionState::AwaitingOpponent {
            return false;
        }
        self.state = SessionState::InProgress;
        self.turn = Mark::X;
        true
    }

    /// Try to place `mark` at `position`.
    ///
    /// Checks run in a fixed order: turn, opponent presence, finished game,
    /// then cell occupancy. A rejected move leaves the session untouched.
    pub fn attempt_move(
        &mut self,
        position: Position,
        mark: Mark,
    ) -> Result<MoveOutcome, SessionError> {
        if mark != self.turn {
            return Err(SessionError::NotYourTurn);
        }

        match self.state {
            SessionState::AwaitingOpponent | SessionState::Abandoned => {
                return Err(SessionError::NoOpponent);
            }
            SessionState::Won(_) | SessionState::Tied => return Err(SessionError::GameOver),
            SessionState::InProgress => {}
        }

        self.board.place(position, mark)?;

        if let Some(winner) = self.board.winner() {
            self.state = SessionState::Won(winner);
            return Ok(MoveOutcome::Won(winner));
        }

        if self.board.is_full() {
            self.state = SessionState::Tied;
            return Ok(MoveOutcome::Tied);
        }

        self.turn = mark.opponent();
        Ok(MoveOutcome::Continue)
    }

    /// Abandon the session. Returns true only for the call that abandoned it.
    pub fn disconnect(&mut self) -> bool {
        if self.state == SessionState::Abandoned {
            return false;
        }
        self.state = SessionState::Abandoned;
        true
    }

    /// Start a new game on the same pairing after a win or tie. `X` moves first.
    pub fn replay(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Won(_) | SessionState::Tied => {
                self.board.reset();
                self.turn = Mark::X;
                self.state = SessionState::InProgress;
                Ok(())
            }
            SessionState::InProgress => Err(SessionError::GameInProgress),
            SessionState::AwaitingOpponent | SessionState::Abandoned => {
                Err(SessionError::NoOpponent)
            }
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(index: u8) -> Position {
        Position::new(index).unwrap()
    }

    fn started() -> GameSession {
        let mut session = GameSession::new();
        assert!(session.bind_opponent());
        session
    }

    /// Play alternating moves starting with `X`, asserting each is accepted.
    fn play(session: &mut GameSession, moves: &[u8]) -> MoveOutcome {
        let mut outcome = MoveOutcome::Continue;
        for &index in moves {
            let mark = session.turn();
            outcome = session.attempt_move(pos(index), mark).unwrap();
        }
        outcome
    }

    #[test]
    fn new_session_waits_for_opponent() {
        let mut session = GameSession::new();

        assert_eq!(session.state(), SessionState::AwaitingOpponent);
        assert_eq!(session.attempt_move(pos(0), Mark::X), Err(SessionError::NoOpponent));
        assert_eq!(session.board().get(pos(0)), None);
    }

    #[test]
    fn binding_opponent_starts_game_with_x_to_move() {
        let mut session = GameSession::new();

        assert!(session.bind_opponent());
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.turn(), Mark::X);

        // A second bind is refused
        assert!(!session.bind_opponent());
    }

    #[test]
    fn turn_alternates_after_accepted_moves() {
        let mut session = started();

        session.attempt_move(pos(0), Mark::X).unwrap();
        assert_eq!(session.turn(), Mark::O);
        session.attempt_move(pos(1), Mark::O).unwrap();
        assert_eq!(session.turn(), Mark::X);
        session.attempt_move(pos(2), Mark::X).unwrap();
        assert_eq!(session.turn(), Mark::O);
    }

    #[test]
    fn retrying_own_cell_out_of_turn_is_rejected() {
        let mut session = started();

        assert_eq!(session.attempt_move(pos(4), Mark::X), Ok(MoveOutcome::Continue));
        assert_eq!(session.turn(), Mark::O);

        // Turn is checked before occupancy
        assert_eq!(session.attempt_move(pos(4), Mark::X), Err(SessionError::NotYourTurn));
        assert_eq!(session.turn(), Mark::O);

        assert_eq!(session.attempt_move(pos(4), Mark::O), Err(SessionError::OccupiedCell));
        assert_eq!(session.turn(), Mark::O);
        assert_eq!(session.board().get(pos(4)), Some(Mark::X));
    }

    #[test]
    fn completing_a_row_wins() {
        let mut session = started();

        let outcome = play(&mut session, &[0, 3, 1, 4, 2]);

        assert_eq!(outcome, MoveOutcome::Won(Mark::X));
        assert_eq!(session.state(), SessionState::Won(Mark::X));
    }

    #[test]
    fn second_player_can_win() {
        let mut session = started();

        let outcome = play(&mut session, &[0, 2, 1, 4, 8, 6]);

        assert_eq!(outcome, MoveOutcome::Won(Mark::O));
        assert_eq!(session.state(), SessionState::Won(Mark::O));
    }

    #[test]
    fn filling_board_without_line_ties() {
        let mut session = started();

        let outcome = play(&mut session, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);

        assert_eq!(outcome, MoveOutcome::Tied);
        assert_eq!(session.state(), SessionState::Tied);
        assert!(session.board().is_full());
        assert_eq!(session.board().winner(), None);
    }

    #[test]
    fn finished_game_rejects_moves() {
        let mut session = started();
        play(&mut session, &[0, 3, 1, 4, 2]);

        // Winner keeps the turn, so the loser hits the turn check first
        assert_eq!(session.attempt_move(pos(8), Mark::O), Err(SessionError::NotYourTurn));
        assert_eq!(session.attempt_move(pos(8), Mark::X), Err(SessionError::GameOver));
    }

    #[test]
    fn disconnect_abandons_once() {
        let mut session = started();
        session.attempt_move(pos(0), Mark::X).unwrap();

        assert!(session.disconnect());
        assert!(!session.disconnect());
        assert_eq!(session.state(), SessionState::Abandoned);
        assert_eq!(session.attempt_move(pos(1), Mark::O), Err(SessionError::NoOpponent));
        assert_eq!(session.board().get(pos(1)), None);
    }

    #[test]
    fn disconnect_while_waiting_abandons() {
        let mut session = GameSession::new();

        assert!(session.disconnect());
        assert!(!session.bind_opponent());
    }

    #[test]
    fn replay_resets_finished_game() {
        let mut session = started();
        play(&mut session, &[0, 3, 1, 4, 2]);

        session.replay().unwrap();

        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.turn(), Mark::X);
        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.attempt_move(pos(0), Mark::X), Ok(MoveOutcome::Continue));
    }

    #[test]
    fn replay_after_tie_hands_first_move_to_x() {
        let mut session = started();
        play(&mut session, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);

        session.replay().unwrap();

        assert_eq!(session.turn(), Mark::X);
        assert_eq!(session.attempt_move(pos(4), Mark::O), Err(SessionError::NotYourTurn));
    }

    #[test]
    fn replay_requires_finished_game() {
        let mut session = GameSession::new();
        assert_eq!(session.replay(), Err(SessionError::NoOpponent));

        session.bind_opponent();
        assert_eq!(session.replay(), Err(SessionError::GameInProgress));

        session.disconnect();
        assert_eq!(session.replay(), Err(SessionError::NoOpponent));
    }
}
