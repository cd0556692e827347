pub mod board;
pub mod error;
pub mod messages;
pub mod session;

pub use board::{Board, Mark, Position};
pub use error::SessionError;
pub use session::{GameSession, MoveOutcome, SessionState};
