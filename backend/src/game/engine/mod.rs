pub mod active_game;
pub mod registry;

pub use active_game::{ActiveGame, Outbound};
pub use registry::{GameRegistry, GameStats};
