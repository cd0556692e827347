/// Reasons a session refuses a move or replay request.
///
/// The display text is sent verbatim to the offending client as `MESSAGE <text>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("You don't have an opponent yet")]
    NoOpponent,

    #[error("Cell already occupied")]
    OccupiedCell,

    #[error("Game is over")]
    GameOver,

    #[error("Game is still in progress")]
    GameInProgress,
}
