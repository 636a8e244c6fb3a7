/// Board utility functions for tactical analysis

use chess_core::attacks::{king_attacks, knight_attacks, pawn_attacks};
use chess_core::{Color, Piece, PieceKind, Position, Square, SquareSet};

// Piece values for material comparisons
pub const PAWN_VALUE: i32 = 1;
pub const KNIGHT_VALUE: i32 = 3;
pub const BISHOP_VALUE: i32 = 3;
pub const ROOK_VALUE: i32 = 5;
pub const QUEEN_VALUE: i32 = 9;
pub const KING_VALUE: i32 = 99;

pub const DIAGONAL_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const ORTHOGONAL_DIRS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
pub const ALL_DIRS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Piece value (no king)
pub fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => PAWN_VALUE,
        PieceKind::Knight => KNIGHT_VALUE,
        PieceKind::Bishop => BISHOP_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::King => 0,
    }
}

/// Piece value including king (for fork detection etc)
pub fn king_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::King => KING_VALUE,
        other => piece_value(other),
    }
}

/// Is this a ray (sliding) piece type?
pub fn is_ray_piece(kind: PieceKind) -> bool {
    matches!(kind, PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop)
}

/// Ray directions a sliding piece moves along; empty for non-sliders.
pub fn ray_directions(kind: PieceKind) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::Bishop => &DIAGONAL_DIRS,
        PieceKind::Rook => &ORTHOGONAL_DIRS,
        PieceKind::Queen => &ALL_DIRS,
        _ => &[],
    }
}

/// Squares attacked by the piece standing on `sq`. Pawns attack diagonally
/// forward only; sliders stop at the first occupied square, inclusive.
pub fn attacks_from(position: &Position, sq: Square) -> SquareSet {
    let Some(piece) = position.piece_at(sq) else {
        return SquareSet::EMPTY;
    };

    match piece.kind() {
        PieceKind::Pawn => pawn_attacks(sq, piece.color()),
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::King => king_attacks(sq),
        kind => sliding_attacks(position, sq, ray_directions(kind)),
    }
}

/// Sliding attack set along the given directions.
pub fn sliding_attacks(position: &Position, from: Square, dirs: &[(i8, i8)]) -> SquareSet {
    let mut result = SquareSet::EMPTY;
    for &(df, dr) in dirs {
        let mut sq = from;
        while let Some(next) = sq.offset(df, dr) {
            result.insert(next);
            if position.piece_at(next).is_some() {
                break;
            }
            sq = next;
        }
    }
    result
}

/// Occupied squares along a ray, nearest first, scanning to the board edge.
pub fn pieces_along_ray(position: &Position, from: Square, dir: (i8, i8)) -> Vec<Square> {
    let mut pieces = Vec::new();
    let mut sq = from;
    while let Some(next) = sq.offset(dir.0, dir.1) {
        if position.piece_at(next).is_some() {
            pieces.push(next);
        }
        sq = next;
    }
    pieces
}

/// All pieces of `color` that attack `sq`, found by reverse lookup: pawn
/// attacks from the target with the opposite color, leaper tables, and
/// sliding rays intersected with the right piece kinds.
pub fn attackers_of(position: &Position, color: Color, sq: Square) -> SquareSet {
    let mut result = SquareSet::EMPTY;

    let is_kind = |candidate: Square, kinds: &[PieceKind]| {
        position
            .piece_at(candidate)
            .map(|p| p.color() == color && kinds.contains(&p.kind()))
            .unwrap_or(false)
    };

    for candidate in pawn_attacks(sq, !color) {
        if is_kind(candidate, &[PieceKind::Pawn]) {
            result.insert(candidate);
        }
    }
    for candidate in knight_attacks(sq) {
        if is_kind(candidate, &[PieceKind::Knight]) {
            result.insert(candidate);
        }
    }
    for candidate in king_attacks(sq) {
        if is_kind(candidate, &[PieceKind::King]) {
            result.insert(candidate);
        }
    }
    for &dir in &DIAGONAL_DIRS {
        if let Some(first) = pieces_along_ray(position, sq, dir).first() {
            if is_kind(*first, &[PieceKind::Bishop, PieceKind::Queen]) {
                result.insert(*first);
            }
        }
    }
    for &dir in &ORTHOGONAL_DIRS {
        if let Some(first) = pieces_along_ray(position, sq, dir).first() {
            if is_kind(*first, &[PieceKind::Rook, PieceKind::Queen]) {
                result.insert(*first);
            }
        }
    }

    result
}

/// Enemy-occupied squares attacked from `sq`, with the piece found there.
pub fn attacked_enemy_squares(position: &Position, sq: Square) -> Vec<(Square, Piece)> {
    let Some(attacker) = position.piece_at(sq) else {
        return Vec::new();
    };
    attacks_from(position, sq)
        .iter()
        .filter_map(|target| {
            position
                .piece_at(target)
                .filter(|p| p.color() != attacker.color())
                .map(|p| (target, p))
        })
        .collect()
}
