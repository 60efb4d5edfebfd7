use serde::{Deserialize, Serialize};
use std::fmt;

/// Board size constants
pub const ROWS: usize = 8;
pub const COLUMNS: usize = 8;

/// Rows each side fills at setup
pub const PINK_HOME_ROWS: usize = 3;
pub const BLUE_FIRST_ROW: usize = 5;

pub const PAWN_VALUE: u8 = 1;
pub const KING_VALUE: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Blue, // bottom of the board, moves first
    Pink, // top of the board
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Blue => Side::Pink,
            Side::Pink => Side::Blue,
        }
    }

    /// Row delta of a forward step for this side's pawns.
    pub fn forward(&self) -> isize {
        match self {
            Side::Blue => -1,
            Side::Pink => 1,
        }
    }

    /// The row on which this side's pawns are promoted.
    pub fn promotion_row(&self) -> usize {
        match self {
            Side::Blue => 0,
            Side::Pink => ROWS - 1,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Side::Blue => "Blue",
            Side::Pink => "Pink",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rank {
    Pawn,
    King,
}

impl Rank {
    pub fn value(&self) -> u8 {
        match self {
            Rank::Pawn => PAWN_VALUE,
            Rank::King => KING_VALUE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    pub fn in_bounds(&self) -> bool {
        self.row < ROWS && self.col < COLUMNS
    }

    /// Step by a signed delta, `None` when the result leaves the board.
    pub fn offset(&self, dr: isize, dc: isize) -> Option<Position> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        let pos = Position::new(row, col);
        pos.in_bounds().then_some(pos)
    }

    /// Map a pointer location on a board drawn from the origin with square
    /// cells of `square_size` pixels.
    pub fn from_pixel(x: u32, y: u32, square_size: u32) -> Option<Position> {
        if square_size == 0 {
            return None;
        }
        let pos = Position::new((y / square_size) as usize, (x / square_size) as usize);
        pos.in_bounds().then_some(pos)
    }

    /// Squares pieces stand on: one coordinate even, the other odd.
    pub fn is_playable(&self) -> bool {
        (self.row + self.col) % 2 == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Stable identity of a piece for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    id: PieceId,
    side: Side,
    rank: Rank,
    row: usize,
    col: usize,
}

impl Piece {
    pub fn new(id: PieceId, side: Side, rank: Rank, pos: Position) -> Self {
        Piece {
            id,
            side,
            rank,
            row: pos.row,
            col: pos.col,
        }
    }

    pub fn pawn(id: PieceId, side: Side, pos: Position) -> Self {
        Self::new(id, side, Rank::Pawn, pos)
    }

    pub fn king(id: PieceId, side: Side, pos: Position) -> Self {
        Self::new(id, side, Rank::King, pos)
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn is_king(&self) -> bool {
        self.rank == Rank::King
    }

    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub(crate) fn relocate(&mut self, pos: Position) {
        self.row = pos.row;
        self.col = pos.col;
    }

    /// Returns true only on the pawn-to-king transition.
    pub(crate) fn promote(&mut self) -> bool {
        if self.is_king() {
            return false;
        }
        self.rank = Rank::King;
        true
    }

    /// Diagonal directions this piece may step or jump in.
    pub fn directions(&self) -> &'static [(isize, isize)] {
        directions_for(self.side, self.rank)
    }

    pub fn symbol(&self) -> char {
        match (self.side, self.rank) {
            (Side::Blue, Rank::Pawn) => 'b',
            (Side::Blue, Rank::King) => 'B',
            (Side::Pink, Rank::Pawn) => 'p',
            (Side::Pink, Rank::King) => 'P',
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self.rank {
            Rank::Pawn => "pawn",
            Rank::King => "king",
        };
        write!(f, "{} {} at {}", self.side, rank, self.position())
    }
}

const ALL_DIAGONALS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const UPWARD: [(isize, isize); 2] = [(-1, -1), (-1, 1)];
const DOWNWARD: [(isize, isize); 2] = [(1, -1), (1, 1)];

pub fn directions_for(side: Side, rank: Rank) -> &'static [(isize, isize)] {
    match (rank, side) {
        (Rank::King, _) => &ALL_DIAGONALS,
        (Rank::Pawn, Side::Blue) => &UPWARD,
        (Rank::Pawn, Side::Pink) => &DOWNWARD,
    }
}
