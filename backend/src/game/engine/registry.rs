use super::active_game::ActiveGame;
use crate::game::core::SessionState;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Snapshot of the games the server is holding
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    pub games: usize,
    pub awaiting_opponent: usize,
    pub in_progress: usize,
    pub finished: usize,
}

/// Index of every game that still has a seated player
pub struct GameRegistry {
    games: DashMap<String, Arc<ActiveGame>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
        }
    }

    pub fn insert(&self, game: Arc<ActiveGame>) {
        debug!(game_id = game.id(), "Registering game");
        self.games.insert(game.id().to_string(), game);
    }

    pub fn remove(&self, game_id: &str) -> Option<Arc<ActiveGame>> {
        debug!(game_id, "Removing game");
        self.games.remove(game_id).map(|(_, game)| game)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn stats(&self) -> GameStats {
        // Collect first so no shard lock is held while taking game locks
        let games: Vec<Arc<ActiveGame>> = self.games.iter().map(|r| r.value().clone()).collect();

        games.iter().fold(
            GameStats {
                games: games.len(),
                ..GameStats::default()
            },
            |mut stats, game| {
                match game.state() {
                    SessionState::AwaitingOpponent => stats.awaiting_opponent += 1,
                    SessionState::InProgress => stats.in_progress += 1,
                    SessionState::Won(_) | SessionState::Tied => stats.finished += 1,
                    SessionState::Abandoned => {}
                }
                stats
            },
        )
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
