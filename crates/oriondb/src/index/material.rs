//! Material index: exact signature lookup plus imbalance range scans.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use chess_core::MaterialSignature;

use crate::model::GamePosition;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MaterialIndex {
    #[serde(with = "super::serde_pairs")]
    signature_to_positions: HashMap<MaterialSignature, Vec<GamePosition>>,
    imbalance_to_positions: BTreeMap<i32, Vec<GamePosition>>,
}

impl MaterialIndex {
    pub fn add_position(&mut self, signature: MaterialSignature, position: GamePosition) {
        self.signature_to_positions
            .entry(signature)
            .or_default()
            .push(position.clone());
        self.imbalance_to_positions
            .entry(signature.imbalance())
            .or_default()
            .push(position);
    }

    pub fn find_by_signature(&self, signature: &MaterialSignature) -> Vec<GamePosition> {
        self.signature_to_positions
            .get(signature)
            .cloned()
            .unwrap_or_default()
    }

    /// Positions whose imbalance falls in `[min, max]` pawns.
    pub fn find_by_imbalance_range(&self, min: i32, max: i32) -> Vec<GamePosition> {
        self.imbalance_to_positions
            .range(min..=max)
            .flat_map(|(_, positions)| positions.iter().cloned())
            .collect()
    }

    /// Positions with ten or fewer non-king pieces.
    pub fn find_endgames(&self) -> Vec<GamePosition> {
        self.signature_to_positions
            .iter()
            .filter(|(signature, _)| signature.is_endgame())
            .flat_map(|(_, positions)| positions.iter().cloned())
            .collect()
    }

    pub fn unique_signatures(&self) -> usize {
        self.signature_to_positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Position;

    fn signature(fen: &str) -> MaterialSignature {
        MaterialSignature::from_position(&Position::from_fen(fen).unwrap())
    }

    #[test]
    fn test_signature_lookup() {
        let mut index = MaterialIndex::default();
        let start = signature(chess_core::STARTING_FEN);
        index.add_position(start, GamePosition::new(0, 0, "start"));
        index.add_position(start, GamePosition::new(1, 0, "start"));

        assert_eq!(index.find_by_signature(&start).len(), 2);
        assert_eq!(index.unique_signatures(), 1);
    }

    #[test]
    fn test_imbalance_range() {
        let mut index = MaterialIndex::default();
        // White up a full queen
        index.add_position(
            signature("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1"),
            GamePosition::new(0, 10, "q-up"),
        );
        // Level material
        index.add_position(
            signature(chess_core::STARTING_FEN),
            GamePosition::new(1, 0, "level"),
        );

        assert_eq!(index.find_by_imbalance_range(5, 10).len(), 1);
        assert_eq!(index.find_by_imbalance_range(0, 0).len(), 1);
        assert_eq!(index.find_by_imbalance_range(-3, 20).len(), 2);
        assert!(index.find_by_imbalance_range(-9, -1).is_empty());
    }

    #[test]
    fn test_endgame_filter() {
        let mut index = MaterialIndex::default();
        index.add_position(
            signature(chess_core::STARTING_FEN),
            GamePosition::new(0, 0, "middlegame"),
        );
        index.add_position(
            signature("4k3/pp6/8/8/8/8/PP6/4K3 w - - 0 1"),
            GamePosition::new(1, 60, "endgame"),
        );

        let endgames = index.find_endgames();
        assert_eq!(endgames.len(), 1);
        assert_eq!(endgames[0].game_id, 1);
    }
}
