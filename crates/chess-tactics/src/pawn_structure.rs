/// Pawn-structure classification: IQP, Maroczy bind, doubled, passed,
/// hanging pawns. Detectors work on per-color pawn bitboards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use chess_core::{Color, Position, Square, SquareSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PawnStructure {
    Iqp,
    Carlsbad,
    MaroczyBind,
    HangingPawns,
    PawnChain,
    DoubledPawns,
    PassedPawn,
    BackwardPawn,
    None,
}

impl PawnStructure {
    pub const ALL: [PawnStructure; 9] = [
        PawnStructure::Iqp,
        PawnStructure::Carlsbad,
        PawnStructure::MaroczyBind,
        PawnStructure::HangingPawns,
        PawnStructure::PawnChain,
        PawnStructure::DoubledPawns,
        PawnStructure::PassedPawn,
        PawnStructure::BackwardPawn,
        PawnStructure::None,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PawnStructure::Iqp => "IQP",
            PawnStructure::Carlsbad => "CARLSBAD",
            PawnStructure::MaroczyBind => "MAROCZY_BIND",
            PawnStructure::HangingPawns => "HANGING_PAWNS",
            PawnStructure::PawnChain => "PAWN_CHAIN",
            PawnStructure::DoubledPawns => "DOUBLED_PAWNS",
            PawnStructure::PassedPawn => "PASSED_PAWN",
            PawnStructure::BackwardPawn => "BACKWARD_PAWN",
            PawnStructure::None => "NONE",
        }
    }
}

impl fmt::Display for PawnStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PawnStructure {
    type Err = ();

    fn from_str(s: &str) -> Result<PawnStructure, ()> {
        let upper = s.trim().to_ascii_uppercase();
        PawnStructure::ALL
            .into_iter()
            .find(|structure| structure.name() == upper)
            .ok_or(())
    }
}

/// Structures present in a position. Never empty: positions without any
/// recognized structure classify as `[NONE]`.
pub fn classify(position: &Position) -> Vec<PawnStructure> {
    let white = position.pawns(Color::White);
    let black = position.pawns(Color::Black);

    let mut structures = Vec::new();

    if has_isolated_queens_pawn(white, Color::White) || has_isolated_queens_pawn(black, Color::Black)
    {
        structures.push(PawnStructure::Iqp);
    }
    if has_maroczy_bind(white) || has_maroczy_bind(black) {
        structures.push(PawnStructure::MaroczyBind);
    }
    if has_doubled_pawns(white) || has_doubled_pawns(black) {
        structures.push(PawnStructure::DoubledPawns);
    }
    if has_passed_pawn(white, black, Color::White) || has_passed_pawn(black, white, Color::Black) {
        structures.push(PawnStructure::PassedPawn);
    }
    if has_hanging_pawns(white) || has_hanging_pawns(black) {
        structures.push(PawnStructure::HangingPawns);
    }

    if structures.is_empty() {
        structures.push(PawnStructure::None);
    }

    structures
}

/// A d-pawn on its 4th rank (d4 for White, d5 for Black) with the c- and
/// e-files bare of same-color pawns.
fn has_isolated_queens_pawn(pawns: SquareSet, color: Color) -> bool {
    let target_rank = match color {
        Color::White => 3,
        Color::Black => 4,
    };
    pawns.contains(Square::from_coords(3, target_rank))
        && (pawns & SquareSet::file_mask(2)).is_empty()
        && (pawns & SquareSet::file_mask(4)).is_empty()
}

/// Pawns on both c4 and e4.
fn has_maroczy_bind(pawns: SquareSet) -> bool {
    pawns.contains(Square::from_coords(2, 3)) && pawns.contains(Square::from_coords(4, 3))
}

/// Any file carrying two or more same-color pawns.
fn has_doubled_pawns(pawns: SquareSet) -> bool {
    (0..8).any(|file| (pawns & SquareSet::file_mask(file)).count() >= 2)
}

/// Some pawn with no enemy pawn ahead of it, toward promotion, on its own
/// or an adjacent file.
fn has_passed_pawn(ours: SquareSet, theirs: SquareSet, color: Color) -> bool {
    ours.iter()
        .any(|pawn| (theirs & front_span(pawn, color)).is_empty())
}

/// Squares in front of a pawn (toward promotion) on its file and both
/// adjacent files.
fn front_span(pawn: Square, color: Color) -> SquareSet {
    let mut span = SquareSet::EMPTY;
    let files = pawn.file().saturating_sub(1)..=(pawn.file() + 1).min(7);
    let ranks: Box<dyn Iterator<Item = u8>> = match color {
        Color::White => Box::new(pawn.rank() + 1..8),
        Color::Black => Box::new(0..pawn.rank()),
    };
    for rank in ranks {
        for file in files.clone() {
            span.insert(Square::from_coords(file, rank));
        }
    }
    span
}

/// Two adjacent pawns on the 4th rank with no supporting pawn behind on
/// either flank file.
fn has_hanging_pawns(pawns: SquareSet) -> bool {
    let behind = SquareSet::from_bits(
        SquareSet::rank_mask(0).bits() | SquareSet::rank_mask(1).bits() | SquareSet::rank_mask(2).bits(),
    );

    (0..7).any(|file| {
        if !pawns.contains(Square::from_coords(file, 3))
            || !pawns.contains(Square::from_coords(file + 1, 3))
        {
            return false;
        }
        let left_support = file > 0 && !(pawns & SquareSet::file_mask(file - 1) & behind).is_empty();
        let right_support =
            file + 2 <= 7 && !(pawns & SquareSet::file_mask(file + 2) & behind).is_empty();
        !left_support && !right_support
    })
}
