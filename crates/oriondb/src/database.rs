//! The database facade: ingest PGN into an archive + sidecar, open them,
//! and serve queries.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::info;

use chess_tactics::{PawnStructure, TacticalMotif};

use crate::archive::{ArchiveReader, ArchiveWriter};
use crate::error::DbError;
use crate::index::moves::MoveEntry;
use crate::index::{IndexOptions, IndexSet, IndexStats};
use crate::model::{Game, GamePosition};
use crate::pgn::PgnParser;
use crate::query::cql;
use crate::query::builder::{self, SearchBuilder};

/// What an ingest run did.
#[derive(Debug, Clone)]
pub struct ImportStats {
    pub games_imported: usize,
    pub parse_errors: usize,
    pub archive_bytes: u64,
    pub duration: Duration,
}

/// A read-only handle on an archive and its sidecar indexes.
pub struct OrionDatabase {
    reader: ArchiveReader,
    indexes: IndexSet,
}

/// `<archive>.idx`, next to the archive.
pub fn sidecar_path(archive_path: &Path) -> PathBuf {
    let mut path = OsString::from(archive_path.as_os_str());
    path.push(".idx");
    PathBuf::from(path)
}

impl OrionDatabase {
    /// Parse a PGN file, write the archive, build every enabled index, and
    /// save the sidecar. The archive is write-once: this replaces `archive_path`.
    pub fn create_from_pgn(
        pgn_path: &Path,
        archive_path: &Path,
        options: IndexOptions,
    ) -> Result<ImportStats, DbError> {
        let started = Instant::now();

        let mut parser = PgnParser::new();
        let pgn_file = File::open(pgn_path).map_err(|source| DbError::Open {
            path: pgn_path.display().to_string(),
            source,
        })?;
        let games = parser.parse_reader(BufReader::new(pgn_file))?;
        info!(
            games = games.len(),
            errors = parser.error_count(),
            "parsed PGN input"
        );

        let mut writer = ArchiveWriter::create(archive_path)?;
        let mut indexes = IndexSet::new(options);
        for (n, game) in games.iter().enumerate() {
            let offset = writer.write_game(game)?;
            indexes.index_game(game, offset);
            if (n + 1) % 1000 == 0 {
                info!(written = n + 1, "ingest progress");
            }
        }

        let archive_bytes = writer.bytes_written();
        writer.finish()?;
        indexes.save(&sidecar_path(archive_path))?;

        let stats = ImportStats {
            games_imported: games.len(),
            parse_errors: parser.error_count(),
            archive_bytes,
            duration: started.elapsed(),
        };
        info!(
            games = stats.games_imported,
            errors = stats.parse_errors,
            bytes = stats.archive_bytes,
            "ingest finished"
        );
        Ok(stats)
    }

    /// Open an existing archive. The sidecar must be present; a database is
    /// not usable without its indexes.
    pub fn open(archive_path: &Path) -> Result<OrionDatabase, DbError> {
        let sidecar = sidecar_path(archive_path);
        if !sidecar.exists() {
            return Err(DbError::MissingSidecar(sidecar.display().to_string()));
        }

        let reader = ArchiveReader::open(archive_path)?;
        let indexes = IndexSet::load(&sidecar)?;
        Ok(OrionDatabase { reader, indexes })
    }

    pub(crate) fn indexes(&self) -> &IndexSet {
        &self.indexes
    }

    pub fn game_count(&self) -> usize {
        self.indexes.metadata.game_count()
    }

    /// Load one game by id. The id comes from the offset map, never from
    /// the archive record itself.
    pub fn game_by_id(&self, game_id: u32) -> Result<Option<Game>, DbError> {
        let Some(offset) = self.indexes.metadata.game_offset(game_id) else {
            return Ok(None);
        };
        let record = self.reader.read_game_at(offset)?;
        Ok(Some(record.into_game(game_id)))
    }

    /// Start a fluent query.
    pub fn search(&self) -> SearchBuilder<'_> {
        SearchBuilder::new(self)
    }

    /// Run a CQL query and load the matching games, ascending by id.
    pub fn query(&self, source: &str) -> Result<Vec<Game>, DbError> {
        let ids = self.query_ids(source)?;
        Ok(builder::materialize(self, &ids))
    }

    /// Run a CQL query and return how many games match.
    pub fn query_count(&self, source: &str) -> Result<usize, DbError> {
        Ok(self.query_ids(source)?.len())
    }

    fn query_ids(&self, source: &str) -> Result<Vec<u32>, DbError> {
        let plans = cql::compile(source)?;
        let mut ids = BTreeSet::new();
        for plan in &plans {
            if let Some(matched) = builder::resolve_ids(self, plan) {
                ids.extend(matched);
            }
        }
        Ok(ids.into_iter().collect())
    }

    /// Every position at which this exact SAN token was played.
    pub fn find_move(&self, san: &str) -> Vec<GamePosition> {
        self.indexes
            .moves
            .as_ref()
            .map(|index| index.find_move(san))
            .unwrap_or_default()
    }

    /// Every occurrence of the exact position described by `fen`.
    pub fn find_by_fen(&self, fen: &str) -> Result<Vec<GamePosition>, DbError> {
        let position = chess_core::Position::from_fen(fen)
            .map_err(|err| DbError::InvalidFen(format!("{fen}: {err}")))?;
        Ok(self
            .indexes
            .position
            .as_ref()
            .map(|index| index.find_by_hash(chess_core::zobrist::hash(&position)))
            .unwrap_or_default())
    }

    pub fn find_by_structure(&self, structure: PawnStructure) -> Vec<GamePosition> {
        self.indexes
            .structure
            .as_ref()
            .map(|index| index.find_by_structure(structure))
            .unwrap_or_default()
    }

    pub fn find_by_motif(&self, motif: TacticalMotif) -> Vec<GamePosition> {
        self.indexes
            .motifs
            .as_ref()
            .map(|index| index.find_motif(motif))
            .unwrap_or_default()
    }

    /// Positions with ten or fewer non-king pieces.
    pub fn find_endgames(&self) -> Vec<GamePosition> {
        self.indexes
            .material
            .as_ref()
            .map(|index| index.find_endgames())
            .unwrap_or_default()
    }

    /// Games containing the SAN sequence as consecutive moves.
    pub fn find_sequence<S: AsRef<str>>(&self, sequence: &[S]) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .indexes
            .moves
            .as_ref()
            .map(|index| index.find_sequence(sequence).into_iter().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    pub fn game_moves(&self, game_id: u32) -> Vec<MoveEntry> {
        self.indexes
            .moves
            .as_ref()
            .map(|index| index.game_moves(game_id))
            .unwrap_or_default()
    }

    pub fn game_motifs(
        &self,
        game_id: u32,
    ) -> std::collections::BTreeMap<u32, std::collections::HashSet<TacticalMotif>> {
        self.indexes
            .motifs
            .as_ref()
            .map(|index| index.game_motifs(game_id))
            .unwrap_or_default()
    }

    pub fn index_stats(&self) -> IndexStats {
        self.indexes.stats()
    }
}
