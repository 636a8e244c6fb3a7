//! Precomputed attack tables for the leaper pieces, plus pawn attacks.
//!
//! Sliding attacks depend on occupancy and are generated where they are
//! needed; only the fixed geometry lives here.

use once_cell::sync::Lazy;

use crate::piece::Color;
use crate::square::Square;
use crate::squareset::SquareSet;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

static KNIGHT_ATTACKS: Lazy<[SquareSet; 64]> = Lazy::new(|| leaper_table(&KNIGHT_OFFSETS));
static KING_ATTACKS: Lazy<[SquareSet; 64]> = Lazy::new(|| leaper_table(&KING_OFFSETS));

fn leaper_table(offsets: &[(i8, i8)]) -> [SquareSet; 64] {
    let mut table = [SquareSet::EMPTY; 64];
    for sq in Square::all() {
        let mut set = SquareSet::EMPTY;
        for &(df, dr) in offsets {
            if let Some(target) = sq.offset(df, dr) {
                set.insert(target);
            }
        }
        table[sq.index()] = set;
    }
    table
}

pub fn knight_attacks(sq: Square) -> SquareSet {
    KNIGHT_ATTACKS[sq.index()]
}

pub fn king_attacks(sq: Square) -> SquareSet {
    KING_ATTACKS[sq.index()]
}

/// Diagonal-forward pawn attack squares (captures only, no pushes).
pub fn pawn_attacks(sq: Square, color: Color) -> SquareSet {
    let dr = match color {
        Color::White => 1,
        Color::Black => -1,
    };
    let mut set = SquareSet::EMPTY;
    for df in [-1, 1] {
        if let Some(target) = sq.offset(df, dr) {
            set.insert(target);
        }
    }
    set
}
