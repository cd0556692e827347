mod listener;
mod lobby;
mod state;

pub use listener::{Server, ServerError};
pub use state::{MatchmakingState, Seat, ServerStats};
