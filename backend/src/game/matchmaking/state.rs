use super::lobby::{Lobby, MatchOutcome};
use crate::game::core::Mark;
use crate::game::core::messages::{ClientCommand, ServerMessage};
use crate::game::engine::{ActiveGame, GameRegistry, GameStats, Outbound};
use serde::Serialize;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// A connection's place in a game
pub struct Seat {
    pub game: Arc<ActiveGame>,
    pub mark: Mark,
    tx: Outbound,
}

impl Seat {
    /// Queue a message for this seat's own client
    pub fn notify(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }
}

/// Server-wide numbers for the ops endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    #[serde(flatten)]
    pub games: GameStats,
    pub active_handlers: usize,
}

pub struct MatchmakingState {
    pub registry: Arc<GameRegistry>,
    pub lobby: Lobby,
    connections: AtomicUsize,
}

impl MatchmakingState {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(GameRegistry::new()),
            lobby: Lobby::new(),
            connections: AtomicUsize::new(0),
        }
    }

    /// Seat a freshly accepted connection whose outbound queue is `tx`.
    ///
    /// The welcome is queued before this returns, so it is always the first
    /// line the client sees.
    pub fn admit(&self, tx: Outbound) -> Seat {
        self.connections.fetch_add(1, Ordering::Relaxed);

        let (game, mark) = match self.lobby.try_match(tx.clone()) {
            MatchOutcome::Hosting(game) => {
                self.registry.insert(game.clone());
                info!(game_id = game.id(), "Player waiting for opponent");
                (game, Mark::X)
            }
            MatchOutcome::Joined(game) => {
                info!(game_id = game.id(), "Players matched");
                (game, Mark::O)
            }
        };

        Seat { game, mark, tx }
    }

    /// Apply one client command. `Break` means the client asked to quit.
    pub fn handle_command(&self, seat: &Seat, command: ClientCommand) -> ControlFlow<()> {
        let result = match command {
            ClientCommand::Move(position) => seat.game.play(seat.mark, position).map(|_| ()),
            ClientCommand::Replay => seat.game.replay(),
            ClientCommand::Quit => return ControlFlow::Break(()),
        };

        if let Err(reason) = result {
            debug!(game_id = seat.game.id(), mark = %seat.mark, %command, %reason, "Command rejected");
            seat.notify(ServerMessage::message(reason.to_string()));
        }

        ControlFlow::Continue(())
    }

    /// Release a seat after its connection ended for any reason.
    pub fn handle_disconnect(&self, seat: &Seat) {
        let game_id = seat.game.id();
        info!(game_id, mark = %seat.mark, "Player disconnected");

        let departure = seat.game.leave(seat.mark);
        self.lobby.remove_waiting(game_id);
        if departure.empty {
            self.registry.remove(game_id);
        }

        self.connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> ServerStats {
        ServerStats {
            games: self.registry.stats(),
            active_handlers: self.connections.load(Ordering::Relaxed),
        }
    }
}

impl Default for MatchmakingState {
    fn default() -> Self {
        Self::new()
    }
}
