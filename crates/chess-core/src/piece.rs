//! Piece and color encodings.
//!
//! A piece code packs the kind into bits 0..2 and the color into bit 3, so
//! white pieces occupy 0..=5 and black pieces 8..=13. The code doubles as the
//! first index of the Zobrist piece-square table.

use std::fmt;
use std::ops::Not;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn fen_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    /// Uppercase SAN letter -> kind. Pawns have no letter.
    pub fn from_letter(c: char) -> Option<PieceKind> {
        match c {
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    fn from_code(code: u8) -> PieceKind {
        match code {
            0 => PieceKind::Pawn,
            1 => PieceKind::Knight,
            2 => PieceKind::Bishop,
            3 => PieceKind::Rook,
            4 => PieceKind::Queen,
            _ => PieceKind::King,
        }
    }
}

/// A colored piece, stored as its 4-bit code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece(u8);

const COLOR_BIT: u8 = 8;

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Piece {
        let color_bits = match color {
            Color::White => 0,
            Color::Black => COLOR_BIT,
        };
        Piece(kind as u8 | color_bits)
    }

    pub fn kind(self) -> PieceKind {
        PieceKind::from_code(self.0 & 7)
    }

    pub fn color(self) -> Color {
        if self.0 & COLOR_BIT == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn is_white(self) -> bool {
        self.color() == Color::White
    }

    /// The raw 4-bit code (0..=5 white, 8..=13 black); Zobrist table index.
    pub fn code(self) -> usize {
        self.0 as usize
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = match c.to_ascii_uppercase() {
            'P' => PieceKind::Pawn,
            'N' => PieceKind::Knight,
            'B' => PieceKind::Bishop,
            'R' => PieceKind::Rook,
            'Q' => PieceKind::Queen,
            'K' => PieceKind::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(kind, color))
    }

    pub fn fen_char(self) -> char {
        let c = match self.kind() {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        };
        if self.is_white() {
            c
        } else {
            c.to_ascii_lowercase()
        }
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece({})", self.fen_char())
    }
}
