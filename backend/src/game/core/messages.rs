//! Line protocol spoken with clients. One command or notification per line.

use super::board::{Mark, Position};
use std::fmt;
use std::str::FromStr;

pub const WAITING_FOR_OPPONENT: &str = "Waiting for opponent to connect";
pub const YOUR_MOVE: &str = "Your move";
pub const NEW_GAME: &str = "New game started";

/// Client → server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Move(Position),
    Quit,
    Replay,
}

impl ClientCommand {
    /// Lenient parse: anything that is not a well-formed command yields `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = match parts.next()? {
            "MOVE" => {
                let index = parts.next()?.parse::<u8>().ok()?;
                ClientCommand::Move(Position::new(index)?)
            }
            "QUIT" => ClientCommand::Quit,
            "REPLAY" => ClientCommand::Replay,
            _ => return None,
        };

        // Trailing garbage makes the line malformed
        parts.next().is_none().then_some(command)
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientCommand::Move(position) => write!(f, "MOVE {position}"),
            ClientCommand::Quit => f.write_str("QUIT"),
            ClientCommand::Replay => f.write_str("REPLAY"),
        }
    }
}

/// Server → client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Welcome(Mark),
    Message(String),
    ValidMove,
    OpponentMoved(Position),
    Victory,
    Defeat,
    Tie,
    OtherPlayerLeft,
}

impl ServerMessage {
    pub fn message(text: impl Into<String>) -> Self {
        ServerMessage::Message(text.into())
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Welcome(mark) => write!(f, "WELCOME {mark}"),
            ServerMessage::Message(text) => write!(f, "MESSAGE {text}"),
            ServerMessage::ValidMove => f.write_str("VALID_MOVE"),
            ServerMessage::OpponentMoved(position) => write!(f, "OPPONENT_MOVED {position}"),
            ServerMessage::Victory => f.write_str("VICTORY"),
            ServerMessage::Defeat => f.write_str("DEFEAT"),
            ServerMessage::Tie => f.write_str("TIE"),
            ServerMessage::OtherPlayerLeft => f.write_str("OTHER_PLAYER_LEFT"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized server message: {0:?}")]
pub struct ParseMessageError(String);

impl FromStr for ServerMessage {
    type Err = ParseMessageError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseMessageError(line.to_string());
        let (keyword, rest) = match line.split_once(' ') {
            Some((keyword, rest)) => (keyword, Some(rest)),
            None => (line, None),
        };

        let message = match (keyword, rest) {
            ("WELCOME", Some(symbol)) => {
                ServerMessage::Welcome(Mark::from_symbol(symbol).ok_or_else(invalid)?)
            }
            ("MESSAGE", Some(text)) => ServerMessage::Message(text.to_string()),
            ("VALID_MOVE", None) => ServerMessage::ValidMove,
            ("OPPONENT_MOVED", Some(index)) => {
                let position = index
                    .parse::<u8>()
                    .ok()
                    .and_then(Position::new)
                    .ok_or_else(invalid)?;
                ServerMessage::OpponentMoved(position)
            }
            ("VICTORY", None) => ServerMessage::Victory,
            ("DEFEAT", None) => ServerMessage::Defeat,
            ("TIE", None) => ServerMessage::Tie,
            ("OTHER_PLAYER_LEFT", None) => ServerMessage::OtherPlayerLeft,
            _ => return Err(invalid()),
        };
        Ok(message)
    }
}
