//! Core value types for the mailbox board representation.
//!
//! Squares are addressed as `(row, col)` with row 0 holding Dark's back rank
//! (rank 8) and row 7 holding Light's back rank (rank 1).

pub use crate::game_state::game_state::GameState;
pub use crate::game_state::undo_state::MoveRecord;

use crate::errors::{ChessError, ChessResult};

/// Side to move. `Light` plays first and is written uppercase in FEN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Light,
    Dark,
}

impl Color {
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Row delta of a single pawn advance.
    #[inline]
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::Light => -1,
            Color::Dark => 1,
        }
    }

    #[inline]
    pub const fn pawn_start_row(self) -> u8 {
        match self {
            Color::Light => 6,
            Color::Dark => 1,
        }
    }

    #[inline]
    pub const fn promotion_row(self) -> u8 {
        match self {
            Color::Light => 0,
            Color::Dark => 7,
        }
    }

    /// Row holding this color's king and rooks at the start of the game.
    #[inline]
    pub const fn back_row(self) -> u8 {
        match self {
            Color::Light => 7,
            Color::Dark => 0,
        }
    }

    #[inline]
    pub const fn fen_char(self) -> char {
        match self {
            Color::Light => 'w',
            Color::Dark => 'b',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase FEN/UCI letter.
    #[inline]
    pub const fn to_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    #[inline]
    pub fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_promotion_choice(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }
}

pub const PROMOTION_CHOICES: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    #[inline]
    pub fn fen_char(self) -> char {
        match self.color {
            Color::Light => self.kind.to_char().to_ascii_uppercase(),
            Color::Dark => self.kind.to_char(),
        }
    }

    #[inline]
    pub fn from_fen_char(ch: char) -> Option<Self> {
        let color = if ch.is_ascii_uppercase() {
            Color::Light
        } else if ch.is_ascii_lowercase() {
            Color::Dark
        } else {
            return None;
        };
        PieceKind::from_char(ch).map(|kind| Piece::new(kind, color))
    }
}

/// Board coordinate, both components in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub fn new(row: u8, col: u8) -> ChessResult<Self> {
        if row > 7 || col > 7 {
            return Err(ChessError::InvalidSquare(format!("({row}, {col})")));
        }
        Ok(Self { row, col })
    }

    /// Caller guarantees both coordinates are in range.
    #[inline]
    pub(crate) const fn at(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Step by a signed delta, `None` when the result leaves the board.
    #[inline]
    pub fn offset(self, row_delta: i8, col_delta: i8) -> Option<Self> {
        let row = self.row as i8 + row_delta;
        let col = self.col as i8 + col_delta;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Self::at(row as u8, col as u8))
        } else {
            None
        }
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square::at(row, col)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SideCastlingRights {
    pub king_side: bool,
    pub queen_side: bool,
}

/// Castling availability. Rights only ever go from `true` to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub light: SideCastlingRights,
    pub dark: SideCastlingRights,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        light: SideCastlingRights {
            king_side: true,
            queen_side: true,
        },
        dark: SideCastlingRights {
            king_side: true,
            queen_side: true,
        },
    };

    pub const NONE: CastlingRights = CastlingRights {
        light: SideCastlingRights {
            king_side: false,
            queen_side: false,
        },
        dark: SideCastlingRights {
            king_side: false,
            queen_side: false,
        },
    };

    #[inline]
    pub const fn for_color(&self, color: Color) -> SideCastlingRights {
        match color {
            Color::Light => self.light,
            Color::Dark => self.dark,
        }
    }

    #[inline]
    fn for_color_mut(&mut self, color: Color) -> &mut SideCastlingRights {
        match color {
            Color::Light => &mut self.light,
            Color::Dark => &mut self.dark,
        }
    }

    pub fn revoke_all(&mut self, color: Color) {
        let side = self.for_color_mut(color);
        side.king_side = false;
        side.queen_side = false;
    }

    pub fn revoke_king_side(&mut self, color: Color) {
        self.for_color_mut(color).king_side = false;
    }

    pub fn revoke_queen_side(&mut self, color: Color) {
        self.for_color_mut(color).queen_side = false;
    }

    /// True when every right present in `self` is also present in `earlier`.
    pub fn is_subset_of(&self, earlier: &CastlingRights) -> bool {
        let side_ok = |now: SideCastlingRights, then: SideCastlingRights| {
            (!now.king_side || then.king_side) && (!now.queen_side || then.queen_side)
        };
        side_ok(self.light, earlier.light) && side_ok(self.dark, earlier.dark)
    }
}

/// 8x8 mailbox indexed `[row][col]`; each square holds at most one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self {
            squares: [[None; 8]; 8],
        }
    }
}

impl Board {
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row as usize][square.col as usize]
    }

    #[inline]
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.row as usize][square.col as usize] = piece;
    }

    #[inline]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.row as usize][square.col as usize].take()
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Every occupied square of `color`, scanned row-major.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some(piece) if piece.color == color => Some((sq, piece)),
            _ => None,
        })
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    pub fn count(&self, piece: Piece) -> usize {
        Square::all()
            .filter(|sq| self.piece_at(*sq) == Some(piece))
            .count()
    }
}

/// Game-end classification for the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}
