//! Move index: SAN token postings plus per-game move lists for sequence
//! search.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::GamePosition;

/// One move inside a game, with the position it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEntry {
    pub san: String,
    pub ply: u32,
    pub fen: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MoveIndex {
    move_to_positions: HashMap<String, HashSet<GamePosition>>,
    game_to_moves: HashMap<u32, Vec<MoveEntry>>,
    total_moves: u64,
}

impl MoveIndex {
    pub fn add_move(&mut self, san: &str, game_id: u32, ply: u32, fen: &str) {
        self.move_to_positions
            .entry(san.to_string())
            .or_default()
            .insert(GamePosition::new(game_id, ply, fen));
        self.game_to_moves
            .entry(game_id)
            .or_default()
            .push(MoveEntry {
                san: san.to_string(),
                ply,
                fen: fen.to_string(),
            });
        self.total_moves += 1;
    }

    /// Every position reached by playing this exact SAN token.
    pub fn find_move(&self, san: &str) -> Vec<GamePosition> {
        self.move_to_positions
            .get(san)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Occurrences of `san` whose ply lies in `[min_ply, max_ply]`.
    pub fn find_move_in_range(&self, san: &str, min_ply: u32, max_ply: u32) -> Vec<GamePosition> {
        self.find_move(san)
            .into_iter()
            .filter(|pos| pos.ply >= min_ply && pos.ply <= max_ply)
            .collect()
    }

    /// Games whose move list contains `sequence` as consecutive moves.
    pub fn find_sequence<S: AsRef<str>>(&self, sequence: &[S]) -> HashSet<u32> {
        if sequence.is_empty() {
            return HashSet::new();
        }

        let mut games = HashSet::new();
        for (&game_id, moves) in &self.game_to_moves {
            if contains_sequence(moves, sequence) {
                games.insert(game_id);
            }
        }
        games
    }

    /// Games in which the given piece letter moved (`None` means a pawn).
    pub fn games_with_piece_move(&self, piece: Option<char>) -> HashSet<u32> {
        let mut games = HashSet::new();
        for (san, positions) in &self.move_to_positions {
            let first = san.chars().next().unwrap_or(' ');
            let matches = match piece {
                None => first.is_ascii_lowercase(),
                Some(letter) => first == letter,
            };
            if matches {
                games.extend(positions.iter().map(|pos| pos.game_id));
            }
        }
        games
    }

    pub fn game_moves(&self, game_id: u32) -> Vec<MoveEntry> {
        self.game_to_moves.get(&game_id).cloned().unwrap_or_default()
    }

    pub fn unique_move_count(&self) -> usize {
        self.move_to_positions.len()
    }

    pub fn total_move_count(&self) -> u64 {
        self.total_moves
    }
}

fn contains_sequence<S: AsRef<str>>(moves: &[MoveEntry], sequence: &[S]) -> bool {
    if sequence.len() > moves.len() {
        return false;
    }
    moves.windows(sequence.len()).any(|window| {
        window
            .iter()
            .zip(sequence)
            .all(|(entry, wanted)| entry.san == wanted.as_ref())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> MoveIndex {
        let mut index = MoveIndex::default();
        for (ply, san) in ["e4", "c5", "Nf3", "d6", "d4"].iter().enumerate() {
            index.add_move(san, 0, ply as u32 + 1, &format!("fen-{ply}"));
        }
        for (ply, san) in ["d4", "Nf6", "c4", "g6"].iter().enumerate() {
            index.add_move(san, 1, ply as u32 + 1, &format!("fen-{ply}"));
        }
        index
    }

    #[test]
    fn test_find_move() {
        let index = sample_index();
        let hits = index.find_move("d4");
        assert_eq!(hits.len(), 2);
        assert!(index.find_move("e5").is_empty());
    }

    #[test]
    fn test_find_move_in_range() {
        let index = sample_index();
        // d4 appears at ply 5 in game 0 and ply 1 in game 1
        let early = index.find_move_in_range("d4", 1, 2);
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].game_id, 1);
    }

    #[test]
    fn test_find_sequence() {
        let index = sample_index();
        assert_eq!(index.find_sequence(&["e4", "c5", "Nf3"]), HashSet::from([0]));
        assert_eq!(index.find_sequence(&["d4", "Nf6"]), HashSet::from([1]));
        assert!(index.find_sequence(&["e4", "e5"]).is_empty());
        assert!(index.find_sequence(&[] as &[&str]).is_empty());
        // Sequence longer than any game
        assert!(index
            .find_sequence(&["e4", "c5", "Nf3", "d6", "d4", "Nf6", "g3"])
            .is_empty());
    }

    #[test]
    fn test_games_with_piece_move() {
        let index = sample_index();
        assert_eq!(index.games_with_piece_move(Some('N')), HashSet::from([0, 1]));
        // Pawn moves occur in both games
        assert_eq!(index.games_with_piece_move(None), HashSet::from([0, 1]));
        assert!(index.games_with_piece_move(Some('Q')).is_empty());
    }

    #[test]
    fn test_game_moves_ordered() {
        let index = sample_index();
        let moves = index.game_moves(0);
        assert_eq!(moves.len(), 5);
        assert_eq!(moves[0].san, "e4");
        assert_eq!(moves[4].san, "d4");
        assert_eq!(moves[4].ply, 5);
        assert!(index.game_moves(9).is_empty());
    }

    #[test]
    fn test_counts() {
        let index = sample_index();
        assert_eq!(index.total_move_count(), 9);
        // d4 occurs twice but counts once as a unique token
        assert_eq!(index.unique_move_count(), 8);
    }
}
