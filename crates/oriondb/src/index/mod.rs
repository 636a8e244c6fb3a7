//! In-memory indexes, rebuilt at ingest and persisted to the sidecar file.

pub mod comment;
pub mod material;
pub mod metadata;
pub mod motif;
pub mod moves;
pub mod position;
pub mod structure;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use chess_core::{zobrist, Board, MaterialSignature};
use chess_tactics::{classify, detect_motifs};

use crate::error::DbError;
use crate::model::{Game, GamePosition};

pub use comment::CommentIndex;
pub use material::MaterialIndex;
pub use metadata::MetadataIndex;
pub use motif::MotifIndex;
pub use moves::MoveIndex;
pub use position::PositionIndex;
pub use structure::StructureIndex;

/// Which indexes to build at ingest. Metadata is always built; move and
/// motif indexing need the replayed position stream, so they are inert
/// without position indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    pub position_indexing: bool,
    pub comment_indexing: bool,
    pub move_indexing: bool,
    pub motif_indexing: bool,
}

impl Default for IndexOptions {
    fn default() -> IndexOptions {
        IndexOptions {
            position_indexing: true,
            comment_indexing: true,
            move_indexing: true,
            motif_indexing: true,
        }
    }
}

impl IndexOptions {
    /// Only the metadata index; ingest skips game replay entirely.
    pub fn metadata_only() -> IndexOptions {
        IndexOptions {
            position_indexing: false,
            comment_indexing: false,
            move_indexing: false,
            motif_indexing: false,
        }
    }
}

/// Every index for one database, behind one save/load surface.
#[derive(Serialize, Deserialize)]
pub struct IndexSet {
    pub options: IndexOptions,
    pub metadata: MetadataIndex,
    pub position: Option<PositionIndex>,
    pub material: Option<MaterialIndex>,
    pub structure: Option<StructureIndex>,
    pub moves: Option<MoveIndex>,
    pub motifs: Option<MotifIndex>,
    pub comments: Option<CommentIndex>,
}

impl IndexSet {
    pub fn new(options: IndexOptions) -> IndexSet {
        let with_positions = options.position_indexing;
        IndexSet {
            options,
            metadata: MetadataIndex::default(),
            position: with_positions.then(PositionIndex::default),
            material: with_positions.then(MaterialIndex::default),
            structure: with_positions.then(StructureIndex::default),
            moves: (with_positions && options.move_indexing).then(MoveIndex::default),
            motifs: (with_positions && options.motif_indexing).then(MotifIndex::default),
            comments: options.comment_indexing.then(CommentIndex::default),
        }
    }

    /// Index one game, written at `offset` in the archive.
    pub fn index_game(&mut self, game: &Game, offset: u64) {
        self.metadata.index_game(game, offset);

        if self.position.is_some() {
            self.index_positions(game);
        }

        if let Some(comments) = &mut self.comments {
            for (i, mv) in game.moves().iter().enumerate() {
                if let Some(comment) = &mv.comment {
                    comments.add_comment(comment, GamePosition::new(game.id(), i as u32 + 1, ""));
                }
            }
        }
    }

    /// Replay the game and feed every reached position to the positional
    /// indexes. A failed move halts the replay: the prefix stays indexed.
    fn index_positions(&mut self, game: &Game) {
        let game_id = game.id();
        let mut board = Board::new();

        self.index_one_position(board.position(), game_id, 0);

        for (i, mv) in game.moves().iter().enumerate() {
            let ply = i as u32 + 1;
            if let Err(error) = board.apply_san(&mv.san) {
                debug!(game_id, ply, san = %mv.san, %error, "replay halted");
                break;
            }

            let position = board.position().clone();
            let fen = position.to_fen();
            self.index_one_position(&position, game_id, ply);

            if let Some(moves) = &mut self.moves {
                moves.add_move(&mv.san, game_id, ply, &fen);
            }
            if let Some(motifs) = &mut self.motifs {
                for motif in detect_motifs(&position) {
                    motifs.add_motif(motif, game_id, ply, &fen);
                }
            }
        }
    }

    fn index_one_position(&mut self, position: &chess_core::Position, game_id: u32, ply: u32) {
        let fen = position.to_fen();
        let game_pos = GamePosition::new(game_id, ply, fen);

        if let Some(index) = &mut self.position {
            index.add_position(zobrist::hash(position), game_pos.clone());
        }
        if let Some(index) = &mut self.material {
            index.add_position(MaterialSignature::from_position(position), game_pos.clone());
        }
        if let Some(index) = &mut self.structure {
            index.add_position(&classify(position), game_pos);
        }
    }

    /// Serialize to `path` via a temporary file and rename, so readers never
    /// observe a half-written sidecar.
    pub fn save(&self, path: &Path) -> Result<(), DbError> {
        let tmp = path.with_extension("idx.tmp");
        let data = serde_json::to_vec(self)?;
        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<IndexSet, DbError> {
        let data = fs::read(path).map_err(|source| DbError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            games: self.metadata.game_count(),
            unique_players: self.metadata.unique_players(),
            unique_events: self.metadata.unique_events(),
            unique_ecos: self.metadata.unique_ecos(),
            indexed_positions: self.position.as_ref().map_or(0, |p| p.total_count()),
            unique_positions: self.position.as_ref().map_or(0, |p| p.unique_count()),
            hash_collisions: self.position.as_ref().map_or(0, |p| p.collision_count()),
            unique_moves: self.moves.as_ref().map_or(0, |m| m.unique_move_count()),
            total_motifs: self.motifs.as_ref().map_or(0, |m| m.total_count()),
            comment_tokens: self.comments.as_ref().map_or(0, |c| c.unique_token_count()),
        }
    }
}

/// A point-in-time summary of index sizes.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub games: usize,
    pub unique_players: usize,
    pub unique_events: usize,
    pub unique_ecos: usize,
    pub indexed_positions: u64,
    pub unique_positions: usize,
    pub hash_collisions: usize,
    pub unique_moves: usize,
    pub total_motifs: u64,
    pub comment_tokens: usize,
}

/// Serialize a map with non-string keys as a sequence of pairs, which JSON
/// can represent.
pub(crate) mod serde_pairs {
    use std::collections::HashMap;
    use std::hash::Hash;

    use serde::de::{Deserialize, Deserializer};
    use serde::ser::{Serialize, Serializer};

    pub fn serialize<K, V, S>(map: &HashMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<HashMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Eq + Hash,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let pairs: Vec<(K, V)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Move;
    use tempfile::TempDir;

    fn sample_game() -> Game {
        Game::new(
            0,
            vec![
                ("Event".into(), "Index Test".into()),
                ("White".into(), "Alpha".into()),
                ("Black".into(), "Beta".into()),
                ("Result".into(), "1-0".into()),
            ],
            vec![
                Move::new("e4"),
                Move::with_comment("c5", "the sicilian defence"),
                Move::new("Nf3"),
            ],
        )
    }

    #[test]
    fn test_index_game_populates_all_indexes() {
        let mut set = IndexSet::new(IndexOptions::default());
        set.index_game(&sample_game(), 12);

        let stats = set.stats();
        assert_eq!(stats.games, 1);
        // Start position plus three moves
        assert_eq!(stats.indexed_positions, 4);
        assert_eq!(stats.unique_moves, 3);
        assert!(stats.comment_tokens > 0);
        assert_eq!(set.metadata.game_offset(0), Some(12));
    }

    #[test]
    fn test_move_and_motif_indexing_require_positions() {
        let options = IndexOptions {
            position_indexing: false,
            comment_indexing: false,
            move_indexing: true,
            motif_indexing: true,
        };
        let set = IndexSet::new(options);
        assert!(set.moves.is_none());
        assert!(set.motifs.is_none());
    }

    #[test]
    fn test_replay_halts_on_bad_san_but_keeps_prefix() {
        let game = Game::new(
            0,
            vec![("Result".into(), "*".into())],
            vec![Move::new("e4"), Move::new("Qxh9"), Move::new("e5")],
        );
        let mut set = IndexSet::new(IndexOptions::default());
        set.index_game(&game, 12);

        // Start position and the position after e4; nothing past the failure
        assert_eq!(set.stats().indexed_positions, 2);
        let moves = set.moves.as_ref().unwrap();
        assert_eq!(moves.find_move("e4").len(), 1);
        assert!(moves.find_move("e5").is_empty());
    }

    #[test]
    fn test_sidecar_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("games.oriondb.idx");

        let mut set = IndexSet::new(IndexOptions::default());
        set.index_game(&sample_game(), 12);
        set.save(&path).unwrap();

        let loaded = IndexSet::load(&path).unwrap();
        assert_eq!(loaded.stats().games, 1);
        assert_eq!(loaded.stats().indexed_positions, 4);
        assert_eq!(loaded.metadata.game_offset(0), Some(12));
        assert_eq!(
            loaded.moves.as_ref().unwrap().find_move("Nf3").len(),
            1
        );
    }
}
