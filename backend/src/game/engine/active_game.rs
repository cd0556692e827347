use crate::game::core::messages::{NEW_GAME, ServerMessage, WAITING_FOR_OPPONENT, YOUR_MOVE};
use crate::game::core::{GameSession, Mark, MoveOutcome, Position, SessionError, SessionState};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Outbound queue of one connection
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

/// Session state plus the channels of whoever is seated
struct Table {
    session: GameSession,
    seats: [Option<Outbound>; 2],
}

impl Table {
    fn send(&self, mark: Mark, msg: ServerMessage) {
        if let Some(tx) = &self.seats[mark.index()] {
            // Receiver gone means that handler is already tearing down
            let _ = tx.send(msg);
        }
    }

    fn broadcast(&self, msg: ServerMessage) {
        self.send(Mark::X, msg.clone());
        self.send(Mark::O, msg);
    }
}

/// What happened when a seat left its game
#[derive(Debug, PartialEq, Eq)]
pub struct Departure {
    /// The opponent was told `OTHER_PLAYER_LEFT`
    pub notified_opponent: bool,
    /// No seats remain; the game can be dropped
    pub empty: bool,
}

/// An active game: the session shared by both handlers of a pair.
///
/// Every operation runs inside one critical section, and the notifications it
/// causes are queued before the lock is released. Two handlers can therefore
/// never interleave moves or observe each other's notifications out of order.
pub struct ActiveGame {
    id: String,
    table: Mutex<Table>,
}

impl ActiveGame {
    /// Open a game with `X` seated on `host_tx`.
    pub fn new(host_tx: Outbound) -> Self {
        let _ = host_tx.send(ServerMessage::Welcome(Mark::X));
        let _ = host_tx.send(ServerMessage::message(WAITING_FOR_OPPONENT));

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            table: Mutex::new(Table {
                session: GameSession::new(),
                seats: [Some(host_tx), None],
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.lock().session.state()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seat `O`. Returns false, seating nobody, if the game no longer waits for an opponent.
    pub fn join(&self, guest_tx: Outbound) -> bool {
        let mut table = self.lock();
        if !table.session.bind_opponent() {
            return false;
        }

        let _ = guest_tx.send(ServerMessage::Welcome(Mark::O));
        table.seats[Mark::O.index()] = Some(guest_tx);
        table.send(Mark::X, ServerMessage::message(YOUR_MOVE));

        info!(game_id = self.id, "Opponent bound, game starting");
        true
    }

    /// Attempt a move for `mark`. Rejections notify nobody; the caller reports them.
    pub fn play(&self, mark: Mark, position: Position) -> Result<MoveOutcome, SessionError> {
        let mut table = self.lock();
        let outcome = table.session.attempt_move(position, mark)?;

        table.send(mark, ServerMessage::ValidMove);
        table.send(mark.opponent(), ServerMessage::OpponentMoved(position));

        match outcome {
            MoveOutcome::Continue => {
                debug!(game_id = self.id, %mark, %position, "Move accepted");
            }
            MoveOutcome::Won(winner) => {
                info!(game_id = self.id, %winner, "Game won");
                table.send(winner, ServerMessage::Victory);
                table.send(winner.opponent(), ServerMessage::Defeat);
            }
            MoveOutcome::Tied => {
                info!(game_id = self.id, "Game tied");
                table.broadcast(ServerMessage::Tie);
            }
        }

        Ok(outcome)
    }

    /// Restart a finished game with the same pairing.
    pub fn replay(&self) -> Result<(), SessionError> {
        let mut table = self.lock();
        table.session.replay()?;

        info!(game_id = self.id, "Game restarted");
        table.broadcast(ServerMessage::message(NEW_GAME));
        table.send(Mark::X, ServerMessage::message(YOUR_MOVE));
        Ok(())
    }

    /// Vacate `mark`'s seat and abandon the game.
    ///
    /// Only the first departure tells the opponent; later ones are silent.
    pub fn leave(&self, mark: Mark) -> Departure {
        let mut table = self.lock();
        let abandoned_now = table.session.disconnect();
        table.seats[mark.index()] = None;

        let opponent = mark.opponent();
        let notified_opponent = abandoned_now && table.seats[opponent.index()].is_some();
        if notified_opponent {
            table.send(opponent, ServerMessage::OtherPlayerLeft);
        }

        info!(game_id = self.id, %mark, notified_opponent, "Player left game");

        Departure {
            notified_opponent,
            empty: table.seats.iter().all(Option::is_none),
        }
    }
}
