//! Position classifiers: pawn structures and tactical motifs.
//!
//! All detectors are pure functions over a [`chess_core::Position`]; the
//! database replays games and feeds every reached position through them.

pub use chess_core;

pub mod board_utils;
pub mod motifs;
pub mod pawn_structure;

pub use motifs::{detect_motifs, TacticalMotif};
pub use pawn_structure::{classify, PawnStructure};
