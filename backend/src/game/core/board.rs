use super::error::SessionError;
use std::fmt;

/// Symbol assigned to a participant. `X` is the first arrival of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Mark::X => 0,
            Mark::O => 1,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Mark> {
        match symbol {
            "X" => Some(Mark::X),
            "O" => Some(Mark::O),
            _ => None,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => f.write_str("X"),
            Mark::O => f.write_str("O"),
        }
    }
}

/// A cell index on the board, always in `0..9`.
///
/// ```text
/// 0 1 2
/// 3 4 5
/// 6 7 8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(u8);

impl Position {
    pub fn new(index: u8) -> Option<Position> {
        (usize::from(index) < CELLS).then_some(Position(index))
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const CELLS: usize = 9;

// Rows, columns, diagonals
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// The 3x3 grid of mark occupancy (pure value, no I/O)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Mark>; CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, position: Position) -> Option<Mark> {
        self.cells[position.index()]
    }

    /// Occupy a cell. Fails if the cell already holds a mark.
    pub fn place(&mut self, position: Position, mark: Mark) -> Result<(), SessionError> {
        let cell = &mut self.cells[position.index()];
        if cell.is_some() {
            return Err(SessionError::OccupiedCell);
        }
        *cell = Some(mark);
        Ok(())
    }

    /// The mark filling any complete line, checked in row, column, diagonal order.
    pub fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|&[a, b, c]| {
            let mark = self.cells[a]?;
            (self.cells[b] == Some(mark) && self.cells[c] == Some(mark)).then_some(mark)
        })
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn reset(&mut self) {
        self.cells = [None; CELLS];
    }
}
