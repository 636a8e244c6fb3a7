//! Zobrist position index.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::GamePosition;

/// Maps 64-bit Zobrist hashes to every game position that reached them.
/// Distinct FENs sharing a hash are tolerated; `collision_count` reports
/// how many buckets that actually happened in.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PositionIndex {
    hash_to_positions: HashMap<u64, Vec<GamePosition>>,
    total_positions: u64,
}

impl PositionIndex {
    pub fn add_position(&mut self, hash: u64, position: GamePosition) {
        self.hash_to_positions.entry(hash).or_default().push(position);
        self.total_positions += 1;
    }

    pub fn find_by_hash(&self, hash: u64) -> Vec<GamePosition> {
        self.hash_to_positions.get(&hash).cloned().unwrap_or_default()
    }

    pub fn unique_count(&self) -> usize {
        self.hash_to_positions.len()
    }

    pub fn total_count(&self) -> u64 {
        self.total_positions
    }

    /// Buckets holding more than one distinct FEN. The comparison strips the
    /// clock fields, which do not participate in hashing.
    pub fn collision_count(&self) -> usize {
        self.hash_to_positions
            .values()
            .filter(|positions| {
                let distinct: HashSet<&str> = positions
                    .iter()
                    .map(|p| structural_fen(&p.fen))
                    .collect();
                distinct.len() > 1
            })
            .count()
    }
}

/// The first four FEN fields: board, side, castling, en passant.
fn structural_fen(fen: &str) -> &str {
    let mut end = fen.len();
    let mut seen = 0;
    for (i, c) in fen.char_indices() {
        if c == ' ' {
            seen += 1;
            if seen == 4 {
                end = i;
                break;
            }
        }
    }
    &fen[..end]
}
