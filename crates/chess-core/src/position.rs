//! Immutable board state with a FEN codec.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::FenError;
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;
use crate::squareset::SquareSet;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Castling availability as a 4-bit mask.
///
/// The bit layout is load-bearing: Zobrist castling keys are indexed by the
/// raw mask value, so it must stay {0x1 K, 0x2 Q, 0x4 k, 0x8 q}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: CastlingRights = CastlingRights(0x1);
    pub const WHITE_QUEENSIDE: CastlingRights = CastlingRights(0x2);
    pub const BLACK_KINGSIDE: CastlingRights = CastlingRights(0x4);
    pub const BLACK_QUEENSIDE: CastlingRights = CastlingRights(0x8);
    pub const ALL: CastlingRights = CastlingRights(0xF);

    pub fn from_bits(bits: u8) -> CastlingRights {
        CastlingRights(bits & 0xF)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: CastlingRights) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn with(self, other: CastlingRights) -> CastlingRights {
        CastlingRights(self.0 | other.0)
    }

    pub fn without(self, other: CastlingRights) -> CastlingRights {
        CastlingRights(self.0 & !other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// A chess position. Equality and hashing compare the board, side to move,
/// castling rights and en passant square; the clocks are excluded so that
/// transpositions compare equal.
#[derive(Clone)]
pub struct Position {
    board: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Position {
    pub fn new(
        board: [Option<Piece>; 64],
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Position {
        Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        }
    }

    pub fn starting() -> Position {
        Position::from_fen(STARTING_FEN).expect("starting FEN is well-formed")
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()]
    }

    pub fn board(&self) -> &[Option<Piece>; 64] {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// All squares holding a piece of either color.
    pub fn occupied(&self) -> SquareSet {
        Square::all()
            .filter(|sq| self.board[sq.index()].is_some())
            .collect()
    }

    /// All squares holding a piece of the given color.
    pub fn pieces(&self, color: Color) -> SquareSet {
        Square::all()
            .filter(|sq| {
                self.board[sq.index()]
                    .map(|p| p.color() == color)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Pawn squares of the given color as a bitboard.
    pub fn pawns(&self, color: Color) -> SquareSet {
        Square::all()
            .filter(|sq| {
                self.board[sq.index()] == Some(Piece::new(PieceKind::Pawn, color))
            })
            .collect()
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.board[Square::from_coords(file, rank).index()] {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push(char::from_digit(empty, 10).unwrap());
                            empty = 0;
                        }
                        fen.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push(char::from_digit(empty, 10).unwrap());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(self.side_to_move.fen_char());

        fen.push(' ');
        if self.castling.is_empty() {
            fen.push('-');
        } else {
            if self.castling.contains(CastlingRights::WHITE_KINGSIDE) {
                fen.push('K');
            }
            if self.castling.contains(CastlingRights::WHITE_QUEENSIDE) {
                fen.push('Q');
            }
            if self.castling.contains(CastlingRights::BLACK_KINGSIDE) {
                fen.push('k');
            }
            if self.castling.contains(CastlingRights::BLACK_QUEENSIDE) {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }

    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::MissingFields(parts.len()));
        }

        let mut board = [None; 64];
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadRankCount(ranks.len()));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                } else {
                    let piece = Piece::from_fen_char(c).ok_or(FenError::BadPieceChar(c))?;
                    if file >= 8 {
                        return Err(FenError::RankOverflow(rank_str.to_string()));
                    }
                    board[Square::from_coords(file, rank).index()] = Some(piece);
                    file += 1;
                }
            }
            if file > 8 {
                return Err(FenError::RankOverflow(rank_str.to_string()));
            }
        }

        let side_to_move = if parts[1] == "w" { Color::White } else { Color::Black };

        let mut castling = CastlingRights::NONE;
        if parts[2] != "-" {
            if parts[2].contains('K') {
                castling = castling.with(CastlingRights::WHITE_KINGSIDE);
            }
            if parts[2].contains('Q') {
                castling = castling.with(CastlingRights::WHITE_QUEENSIDE);
            }
            if parts[2].contains('k') {
                castling = castling.with(CastlingRights::BLACK_KINGSIDE);
            }
            if parts[2].contains('q') {
                castling = castling.with(CastlingRights::BLACK_QUEENSIDE);
            }
        }

        let en_passant = if parts[3] == "-" {
            None
        } else {
            Some(
                Square::from_algebraic(parts[3])
                    .ok_or_else(|| FenError::BadEnPassant(parts[3].to_string()))?,
            )
        };

        let halfmove_clock = match parts.get(4) {
            Some(s) => s.parse().map_err(|_| FenError::BadClock(s.to_string()))?,
            None => 0,
        };
        let fullmove_number = match parts.get(5) {
            Some(s) => s.parse().map_err(|_| FenError::BadClock(s.to_string()))?,
            None => 1,
        };

        Ok(Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Position) -> bool {
        self.board == other.board
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.board.hash(state);
        self.side_to_move.hash(state);
        self.castling.hash(state);
        self.en_passant.hash(state);
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_fen_round_trip() {
        let pos = Position::starting();
        assert_eq!(pos.to_fen(), STARTING_FEN);
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling(), CastlingRights::ALL);
        assert_eq!(pos.en_passant(), None);
    }

    #[test]
    fn test_fen_round_trip_corpus() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2",
            "r1bqk2r/pppp1ppp/2n2n2/1Bb1p3/4P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 5 4",
            "8/4P3/8/8/8/8/8/K6k w - - 0 1",
            "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2",
            "4k3/8/8/8/8/8/8/4K2R w K - 12 40",
            "8/8/8/8/8/8/8/8 w - - 0 1",
        ];
        for fen in fens {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.to_fen(), fen, "round trip failed for {fen}");
            assert_eq!(Position::from_fen(&pos.to_fen()).unwrap(), pos);
        }
    }

    #[test]
    fn test_optional_clock_fields() {
        let pos = Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").unwrap();
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_number(), 1);
    }

    #[test]
    fn test_equality_ignores_clocks() {
        let a = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let b = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 33 70").unwrap();
        assert_eq!(a, b);

        let c = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_malformed_fens() {
        assert!(matches!(
            Position::from_fen("8/8/8/8 w - -"),
            Err(FenError::BadRankCount(4))
        ));
        assert!(matches!(
            Position::from_fen("only-board"),
            Err(FenError::MissingFields(1))
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/7xx w - - 0 1"),
            Err(FenError::BadPieceChar('x'))
        ));
        assert!(matches!(
            Position::from_fen("9p/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::RankOverflow(_))
        ));
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 w - e9 0 1"),
            Err(FenError::BadEnPassant(_))
        ));
    }

    #[test]
    fn test_pawn_bitboards() {
        let pos = Position::starting();
        let white = pos.pawns(Color::White);
        assert_eq!(white.count(), 8);
        assert!(white.contains(Square::from_algebraic("e2").unwrap()));
        let black = pos.pawns(Color::Black);
        assert!(black.contains(Square::from_algebraic("e7").unwrap()));
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.pieces(Color::White).count(), 16);
    }
}
