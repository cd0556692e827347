pub mod connection;
pub mod core;
pub mod engine;
pub mod matchmaking;

pub use self::core::messages;
