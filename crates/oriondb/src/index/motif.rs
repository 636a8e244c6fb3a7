//! Tactical-motif index.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use chess_tactics::TacticalMotif;

use crate::model::GamePosition;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MotifIndex {
    motif_to_positions: HashMap<TacticalMotif, HashSet<GamePosition>>,
    game_to_motifs: HashMap<u32, BTreeMap<u32, HashSet<TacticalMotif>>>,
    total_motifs: u64,
}

impl MotifIndex {
    pub fn add_motif(&mut self, motif: TacticalMotif, game_id: u32, ply: u32, fen: &str) {
        self.motif_to_positions
            .entry(motif)
            .or_default()
            .insert(GamePosition::new(game_id, ply, fen));
        self.game_to_motifs
            .entry(game_id)
            .or_default()
            .entry(ply)
            .or_default()
            .insert(motif);
        self.total_motifs += 1;
    }

    pub fn find_motif(&self, motif: TacticalMotif) -> Vec<GamePosition> {
        self.motif_to_positions
            .get(&motif)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn games_with_motif(&self, motif: TacticalMotif) -> HashSet<u32> {
        self.motif_to_positions
            .get(&motif)
            .map(|positions| positions.iter().map(|pos| pos.game_id).collect())
            .unwrap_or_default()
    }

    /// Games containing every motif in `motifs`.
    pub fn games_with_all_motifs(&self, motifs: &[TacticalMotif]) -> HashSet<u32> {
        let mut iter = motifs.iter();
        let Some(first) = iter.next() else {
            return HashSet::new();
        };
        let mut result = self.games_with_motif(*first);
        for motif in iter {
            let next = self.games_with_motif(*motif);
            result.retain(|id| next.contains(id));
        }
        result
    }

    /// Games containing at least one motif in `motifs`.
    pub fn games_with_any_motif(&self, motifs: &[TacticalMotif]) -> HashSet<u32> {
        let mut result = HashSet::new();
        for motif in motifs {
            result.extend(self.games_with_motif(*motif));
        }
        result
    }

    /// Ply -> motif set for one game, in ply order.
    pub fn game_motifs(&self, game_id: u32) -> BTreeMap<u32, HashSet<TacticalMotif>> {
        self.game_to_motifs.get(&game_id).cloned().unwrap_or_default()
    }

    pub fn motifs_at(&self, game_id: u32, ply: u32) -> HashSet<TacticalMotif> {
        self.game_to_motifs
            .get(&game_id)
            .and_then(|by_ply| by_ply.get(&ply))
            .cloned()
            .unwrap_or_default()
    }

    pub fn motif_count(&self, motif: TacticalMotif) -> usize {
        self.motif_to_positions.get(&motif).map_or(0, HashSet::len)
    }

    pub fn total_count(&self) -> u64 {
        self.total_motifs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> MotifIndex {
        let mut index = MotifIndex::default();
        index.add_motif(TacticalMotif::Fork, 0, 11, "fen");
        index.add_motif(TacticalMotif::Pin, 0, 11, "fen");
        index.add_motif(TacticalMotif::Fork, 1, 20, "fen");
        index.add_motif(TacticalMotif::Skewer, 2, 30, "fen");
        index
    }

    #[test]
    fn test_lookup() {
        let index = sample_index();
        assert_eq!(index.find_motif(TacticalMotif::Fork).len(), 2);
        assert_eq!(index.games_with_motif(TacticalMotif::Fork), HashSet::from([0, 1]));
        assert!(index.find_motif(TacticalMotif::Zugzwang).is_empty());
    }

    #[test]
    fn test_all_and_any() {
        let index = sample_index();
        assert_eq!(
            index.games_with_all_motifs(&[TacticalMotif::Fork, TacticalMotif::Pin]),
            HashSet::from([0])
        );
        assert_eq!(
            index.games_with_any_motif(&[TacticalMotif::Pin, TacticalMotif::Skewer]),
            HashSet::from([0, 2])
        );
        assert!(index.games_with_all_motifs(&[]).is_empty());
    }

    #[test]
    fn test_per_game_views() {
        let index = sample_index();
        let motifs = index.game_motifs(0);
        assert_eq!(motifs.len(), 1);
        assert_eq!(motifs[&11].len(), 2);
        assert_eq!(
            index.motifs_at(0, 11),
            HashSet::from([TacticalMotif::Fork, TacticalMotif::Pin])
        );
        assert!(index.motifs_at(0, 12).is_empty());
    }

    #[test]
    fn test_counts() {
        let index = sample_index();
        assert_eq!(index.motif_count(TacticalMotif::Fork), 2);
        assert_eq!(index.motif_count(TacticalMotif::Decoy), 0);
        assert_eq!(index.total_count(), 4);
    }
}
