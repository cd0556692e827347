pub mod config;
mod game;
pub mod ops;

pub use config::Config;
pub use game::core::{Board, GameSession, Mark, MoveOutcome, Position, SessionError, SessionState};
pub use game::engine::{GameRegistry, GameStats};
pub use game::matchmaking::{MatchmakingState, Server, ServerError, ServerStats};
pub use game::messages;
