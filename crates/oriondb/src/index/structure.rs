//! Pawn-structure index.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use chess_tactics::PawnStructure;

use crate::model::GamePosition;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StructureIndex {
    structure_to_positions: HashMap<PawnStructure, HashSet<GamePosition>>,
}

impl StructureIndex {
    /// A position can carry several structures; it lands in each bucket.
    pub fn add_position(&mut self, structures: &[PawnStructure], position: GamePosition) {
        for structure in structures {
            self.structure_to_positions
                .entry(*structure)
                .or_default()
                .insert(position.clone());
        }
    }

    pub fn find_by_structure(&self, structure: PawnStructure) -> Vec<GamePosition> {
        self.structure_to_positions
            .get(&structure)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, structure: PawnStructure) -> usize {
        self.structure_to_positions
            .get(&structure)
            .map_or(0, HashSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_structure_position() {
        let mut index = StructureIndex::default();
        index.add_position(
            &[PawnStructure::Iqp, PawnStructure::PassedPawn],
            GamePosition::new(0, 24, "fen"),
        );
        index.add_position(&[PawnStructure::None], GamePosition::new(1, 2, "fen"));

        assert_eq!(index.find_by_structure(PawnStructure::Iqp).len(), 1);
        assert_eq!(index.find_by_structure(PawnStructure::PassedPawn).len(), 1);
        assert_eq!(index.find_by_structure(PawnStructure::None).len(), 1);
        assert!(index.find_by_structure(PawnStructure::MaroczyBind).is_empty());
        assert_eq!(index.count(PawnStructure::Iqp), 1);
    }

    #[test]
    fn test_same_position_not_duplicated() {
        let mut index = StructureIndex::default();
        let pos = GamePosition::new(3, 8, "fen");
        index.add_position(&[PawnStructure::DoubledPawns], pos.clone());
        index.add_position(&[PawnStructure::DoubledPawns], pos);
        assert_eq!(index.count(PawnStructure::DoubledPawns), 1);
    }
}
