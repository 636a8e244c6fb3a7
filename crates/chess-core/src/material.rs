//! Material signatures: per-side piece counts with derived measures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::{Color, PieceKind};
use crate::position::Position;
use crate::square::Square;

/// Piece counts for both sides, kings excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialSignature {
    pub white_queens: u8,
    pub white_rooks: u8,
    pub white_bishops: u8,
    pub white_knights: u8,
    pub white_pawns: u8,
    pub black_queens: u8,
    pub black_rooks: u8,
    pub black_bishops: u8,
    pub black_knights: u8,
    pub black_pawns: u8,
}

impl MaterialSignature {
    pub fn from_position(position: &Position) -> MaterialSignature {
        let mut sig = MaterialSignature {
            white_queens: 0,
            white_rooks: 0,
            white_bishops: 0,
            white_knights: 0,
            white_pawns: 0,
            black_queens: 0,
            black_rooks: 0,
            black_bishops: 0,
            black_knights: 0,
            black_pawns: 0,
        };

        for sq in Square::all() {
            let Some(piece) = position.piece_at(sq) else {
                continue;
            };
            let white = piece.color() == Color::White;
            let slot = match (piece.kind(), white) {
                (PieceKind::Queen, true) => &mut sig.white_queens,
                (PieceKind::Rook, true) => &mut sig.white_rooks,
                (PieceKind::Bishop, true) => &mut sig.white_bishops,
                (PieceKind::Knight, true) => &mut sig.white_knights,
                (PieceKind::Pawn, true) => &mut sig.white_pawns,
                (PieceKind::Queen, false) => &mut sig.black_queens,
                (PieceKind::Rook, false) => &mut sig.black_rooks,
                (PieceKind::Bishop, false) => &mut sig.black_bishops,
                (PieceKind::Knight, false) => &mut sig.black_knights,
                (PieceKind::Pawn, false) => &mut sig.black_pawns,
                (PieceKind::King, _) => continue,
            };
            *slot += 1;
        }

        sig
    }

    /// Material balance in pawns, positive when White is ahead.
    /// Values: Q=9, R=5, B=3, N=3, P=1.
    pub fn imbalance(&self) -> i32 {
        let side = |q: u8, r: u8, b: u8, n: u8, p: u8| {
            q as i32 * 9 + r as i32 * 5 + b as i32 * 3 + n as i32 * 3 + p as i32
        };
        side(
            self.white_queens,
            self.white_rooks,
            self.white_bishops,
            self.white_knights,
            self.white_pawns,
        ) - side(
            self.black_queens,
            self.black_rooks,
            self.black_bishops,
            self.black_knights,
            self.black_pawns,
        )
    }

    pub fn total_pieces(&self) -> u32 {
        [
            self.white_queens,
            self.white_rooks,
            self.white_bishops,
            self.white_knights,
            self.white_pawns,
            self.black_queens,
            self.black_rooks,
            self.black_bishops,
            self.black_knights,
            self.black_pawns,
        ]
        .iter()
        .map(|&c| c as u32)
        .sum()
    }

    /// Ten or fewer non-king pieces on the board.
    pub fn is_endgame(&self) -> bool {
        self.total_pieces() <= 10
    }

    fn side_notation(&self, white: bool) -> String {
        let counts = if white {
            [
                (self.white_queens, 'Q'),
                (self.white_rooks, 'R'),
                (self.white_bishops, 'B'),
                (self.white_knights, 'N'),
                (self.white_pawns, 'P'),
            ]
        } else {
            [
                (self.black_queens, 'Q'),
                (self.black_rooks, 'R'),
                (self.black_bishops, 'B'),
                (self.black_knights, 'N'),
                (self.black_pawns, 'P'),
            ]
        };

        let parts: Vec<String> = counts
            .iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, letter)| {
                if *count > 1 {
                    format!("{count}{letter}")
                } else {
                    letter.to_string()
                }
            })
            .collect();

        if parts.is_empty() {
            "K".to_string()
        } else {
            parts.join("+")
        }
    }
}

/// Renders like `Q+R+3P vs R+B+2P`; a bare king is `K`.
impl fmt::Display for MaterialSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.side_notation(true), self.side_notation(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_signature() {
        let sig = MaterialSignature::from_position(&Position::starting());
        assert_eq!(sig.white_queens, 1);
        assert_eq!(sig.white_pawns, 8);
        assert_eq!(sig.black_rooks, 2);
        assert_eq!(sig.imbalance(), 0);
        assert_eq!(sig.total_pieces(), 30);
        assert!(!sig.is_endgame());
    }

    #[test]
    fn test_imbalance() {
        // White up a queen for a rook
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        let sig = MaterialSignature::from_position(&pos);
        assert_eq!(sig.imbalance(), 9);

        let pos = Position::from_fen("r3k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        assert_eq!(MaterialSignature::from_position(&pos).imbalance(), 4);
    }

    #[test]
    fn test_endgame_detection() {
        let pos = Position::from_fen("4k3/pp6/8/8/8/8/PP6/4K3 w - - 0 1").unwrap();
        let sig = MaterialSignature::from_position(&pos);
        assert_eq!(sig.total_pieces(), 4);
        assert!(sig.is_endgame());
    }

    #[test]
    fn test_display_notation() {
        let pos = Position::from_fen("1r2k3/1b6/2pp4/8/8/8/PPP5/Q3K3 w - - 0 1").unwrap();
        let sig = MaterialSignature::from_position(&pos);
        assert_eq!(sig.to_string(), "Q+3P vs R+B+2P");

        let bare = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(MaterialSignature::from_position(&bare).to_string(), "K vs K");
    }
}
