use crate::game::engine::{ActiveGame, Outbound};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Result of entering the lobby
pub enum MatchOutcome {
    /// Opened a new game as `X`; waiting for an opponent
    Hosting(Arc<ActiveGame>),
    /// Took the `O` seat of the waiting game
    Joined(Arc<ActiveGame>),
}

/// Pairs arrivals two at a time (no transport concerns)
pub struct Lobby {
    waiting: Mutex<Option<Arc<ActiveGame>>>,
}

impl Lobby {
    pub fn new() -> Self {
        Self {
            waiting: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<ActiveGame>>> {
        self.waiting.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seat a new arrival. The first of a pair hosts, the second joins.
    pub fn try_match(&self, tx: Outbound) -> MatchOutcome {
        let mut waiting = self.lock();

        // A waiting game whose host already left refuses the join
        if let Some(game) = waiting.take()
            && game.join(tx.clone())
        {
            return MatchOutcome::Joined(game);
        }

        let game = Arc::new(ActiveGame::new(tx));
        *waiting = Some(game.clone());
        MatchOutcome::Hosting(game)
    }

    /// Forget the waiting game if it is `game_id` (its host left)
    pub fn remove_waiting(&self, game_id: &str) {
        let mut waiting = self.lock();
        if waiting.as_ref().is_some_and(|game| game.id() == game_id) {
            *waiting = None;
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.lock().is_some()
    }
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new()
    }
}
