//! Game replay: applies SAN moves to a position and keeps the history.

use crate::error::MoveError;
use crate::piece::{Color, Piece, PieceKind};
use crate::position::{CastlingRights, Position};
use crate::san::{parse_san, CastleSide, SanMove};
use crate::square::Square;

/// A board that replays a game one SAN token at a time.
///
/// Each successful [`Board::apply_san`] produces a fresh [`Position`] and
/// appends it to the history; a failed move leaves the board untouched, so
/// callers can index the prefix of positions reached so far.
pub struct Board {
    current: Position,
    history: Vec<Position>,
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl Board {
    /// Board at the standard starting position.
    pub fn new() -> Board {
        Board::from_position(Position::starting())
    }

    pub fn from_position(start: Position) -> Board {
        Board {
            history: vec![start.clone()],
            current: start,
        }
    }

    pub fn position(&self) -> &Position {
        &self.current
    }

    /// Every position reached so far, starting position first.
    pub fn history(&self) -> &[Position] {
        &self.history
    }

    /// Number of half-moves applied.
    pub fn ply_count(&self) -> usize {
        self.history.len() - 1
    }

    pub fn reset(&mut self) {
        self.current = Position::starting();
        self.history.clear();
        self.history.push(self.current.clone());
    }

    /// Apply a move given in SAN. On failure the board is unchanged.
    pub fn apply_san(&mut self, san: &str) -> Result<(), MoveError> {
        let next = match parse_san(san)? {
            SanMove::Castle { side, .. } => self.apply_castling(side),
            SanMove::Normal {
                kind,
                to,
                from_file,
                from_rank,
                promotion,
                ..
            } => {
                let from = self.find_source(san, kind, to, from_file, from_rank)?;
                self.apply_normal(from, to, promotion)
            }
        };
        self.current = next;
        self.history.push(self.current.clone());
        Ok(())
    }

    /// Resolve the source square for a move. Exactly one candidate piece of
    /// the right kind must be able to reach the destination.
    fn find_source(
        &self,
        san: &str,
        kind: PieceKind,
        to: Square,
        from_file: Option<u8>,
        from_rank: Option<u8>,
    ) -> Result<Square, MoveError> {
        let wanted = Piece::new(kind, self.current.side_to_move());
        let mut candidates = Vec::new();

        for sq in Square::all() {
            if self.current.piece_at(sq) != Some(wanted) {
                continue;
            }
            if from_file.map_or(false, |f| sq.file() != f) {
                continue;
            }
            if from_rank.map_or(false, |r| sq.rank() != r) {
                continue;
            }
            if self.can_reach(sq, to, kind) {
                candidates.push(sq);
            }
        }

        match candidates.as_slice() {
            [only] => Ok(*only),
            [] => Err(MoveError::NoSource(san.to_string())),
            many => Err(MoveError::Ambiguous(san.to_string(), many.len())),
        }
    }

    /// Pseudo-legal reachability check, per piece geometry. Does not consider
    /// checks; SAN disambiguation resolves the rest.
    fn can_reach(&self, from: Square, to: Square, kind: PieceKind) -> bool {
        let file_diff = (to.file() as i8 - from.file() as i8).abs();
        let rank_diff = (to.rank() as i8 - from.rank() as i8).abs();

        match kind {
            PieceKind::Pawn => {
                let white = self.current.side_to_move() == Color::White;
                let dir: i8 = if white { 1 } else { -1 };
                let forward = to.rank() as i8 - from.rank() as i8;

                // Push onto an empty square
                if from.file() == to.file() && self.current.piece_at(to).is_none() {
                    if forward == dir {
                        return true;
                    }
                    let home_rank = if white { 1 } else { 6 };
                    if forward == 2 * dir && from.rank() == home_rank {
                        let middle = Square::from_coords(from.file(), (from.rank() as i8 + dir) as u8);
                        return self.current.piece_at(middle).is_none();
                    }
                    return false;
                }

                // Diagonal capture, including en passant
                if file_diff == 1 && forward == dir {
                    if let Some(target) = self.current.piece_at(to) {
                        return target.color() != self.current.side_to_move();
                    }
                    return self.current.en_passant() == Some(to);
                }
                false
            }
            PieceKind::Knight => {
                (file_diff == 2 && rank_diff == 1) || (file_diff == 1 && rank_diff == 2)
            }
            PieceKind::Bishop => file_diff == rank_diff && self.path_clear(from, to),
            PieceKind::Rook => {
                (from.file() == to.file() || from.rank() == to.rank()) && self.path_clear(from, to)
            }
            PieceKind::Queen => {
                (from.file() == to.file() || from.rank() == to.rank() || file_diff == rank_diff)
                    && self.path_clear(from, to)
            }
            PieceKind::King => file_diff <= 1 && rank_diff <= 1,
        }
    }

    fn path_clear(&self, from: Square, to: Square) -> bool {
        let df = (to.file() as i8 - from.file() as i8).signum();
        let dr = (to.rank() as i8 - from.rank() as i8).signum();

        let mut sq = from;
        loop {
            sq = match sq.offset(df, dr) {
                Some(next) => next,
                None => return false,
            };
            if sq == to {
                return true;
            }
            if self.current.piece_at(sq).is_some() {
                return false;
            }
        }
    }

    fn apply_normal(&self, from: Square, to: Square, promotion: Option<PieceKind>) -> Position {
        let pos = &self.current;
        let mut board = *pos.board();
        let piece = board[from.index()].expect("source square resolved to a piece");

        // Capture must be read off the destination before it is overwritten
        let captured = board[to.index()];

        board[from.index()] = None;
        board[to.index()] = Some(match promotion {
            Some(kind) => Piece::new(kind, piece.color()),
            None => piece,
        });

        // En passant removes the pawn behind the destination
        if piece.kind() == PieceKind::Pawn && pos.en_passant() == Some(to) {
            let behind = if piece.is_white() { -1 } else { 1 };
            if let Some(captured_sq) = to.offset(0, behind) {
                board[captured_sq.index()] = None;
            }
        }

        let en_passant = if piece.kind() == PieceKind::Pawn
            && (to.rank() as i8 - from.rank() as i8).abs() == 2
        {
            Some(Square::new(((from.index() + to.index()) / 2) as u8))
        } else {
            None
        };

        let halfmove_clock = if piece.kind() == PieceKind::Pawn || captured.is_some() {
            0
        } else {
            pos.halfmove_clock() + 1
        };
        let fullmove_number =
            pos.fullmove_number() + u32::from(pos.side_to_move() == Color::Black);

        Position::new(
            board,
            !pos.side_to_move(),
            self.updated_castling_rights(from, to),
            en_passant,
            halfmove_clock,
            fullmove_number,
        )
    }

    /// Fixed king/rook relocations; does not verify the path is unattacked.
    fn apply_castling(&self, side: CastleSide) -> Position {
        let pos = &self.current;
        let mut board = *pos.board();
        let white = pos.side_to_move() == Color::White;

        let (king_from, rook_from, king_to, rook_to) = match (side, white) {
            (CastleSide::Kingside, true) => (Square::E1, Square::H1, Square::G1, Square::F1),
            (CastleSide::Kingside, false) => (Square::E8, Square::H8, Square::G8, Square::F8),
            (CastleSide::Queenside, true) => (Square::E1, Square::A1, Square::C1, Square::D1),
            (CastleSide::Queenside, false) => (Square::E8, Square::A8, Square::C8, Square::D8),
        };

        let color = pos.side_to_move();
        board[king_from.index()] = None;
        board[rook_from.index()] = None;
        board[king_to.index()] = Some(Piece::new(PieceKind::King, color));
        board[rook_to.index()] = Some(Piece::new(PieceKind::Rook, color));

        let castling = if white {
            pos.castling()
                .without(CastlingRights::WHITE_KINGSIDE)
                .without(CastlingRights::WHITE_QUEENSIDE)
        } else {
            pos.castling()
                .without(CastlingRights::BLACK_KINGSIDE)
                .without(CastlingRights::BLACK_QUEENSIDE)
        };

        Position::new(
            board,
            !color,
            castling,
            None,
            pos.halfmove_clock() + 1,
            pos.fullmove_number() + u32::from(!white),
        )
    }

    /// King moves clear that color's rights; moves from or to a home-rook
    /// square clear the matching single right.
    fn updated_castling_rights(&self, from: Square, to: Square) -> CastlingRights {
        let mut rights = self.current.castling();

        if from == Square::E1 {
            rights = rights
                .without(CastlingRights::WHITE_KINGSIDE)
                .without(CastlingRights::WHITE_QUEENSIDE);
        }
        if from == Square::E8 {
            rights = rights
                .without(CastlingRights::BLACK_KINGSIDE)
                .without(CastlingRights::BLACK_QUEENSIDE);
        }

        if from == Square::H1 || to == Square::H1 {
            rights = rights.without(CastlingRights::WHITE_KINGSIDE);
        }
        if from == Square::A1 || to == Square::A1 {
            rights = rights.without(CastlingRights::WHITE_QUEENSIDE);
        }
        if from == Square::H8 || to == Square::H8 {
            rights = rights.without(CastlingRights::BLACK_KINGSIDE);
        }
        if from == Square::A8 || to == Square::A8 {
            rights = rights.without(CastlingRights::BLACK_QUEENSIDE);
        }

        rights
    }
}
