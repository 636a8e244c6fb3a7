//! The fluent query builder: a conjunction of predicate slots resolved
//! against the indexes and intersected.

use std::collections::HashSet;

use tracing::{error, warn};

use chess_core::{zobrist, Position};
use chess_tactics::{PawnStructure, TacticalMotif};

use crate::database::OrionDatabase;
use crate::model::Game;

/// One conjunction of predicate slots. All set slots must match; the range
/// slots default to the full domain when only one bound is given.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub player: Option<String>,
    pub event: Option<String>,
    pub event_contains: Option<String>,
    pub eco: Option<String>,
    pub result: Option<String>,
    pub min_elo: Option<u32>,
    pub max_elo: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub fen: Option<String>,
    pub pawn_structure: Option<PawnStructure>,
    pub commentary: Option<String>,
    pub san_move: Option<String>,
    pub motif: Option<TacticalMotif>,
    /// A predicate that can never match (unknown structure name, empty elo
    /// interval). Forces the empty result without consulting any index.
    pub match_nothing: bool,
}

impl SearchParams {
    pub fn is_empty(&self) -> bool {
        *self == SearchParams::default()
    }
}

/// Fluent search over one database handle.
///
/// ```no_run
/// # use oriondb::OrionDatabase;
/// # let db = OrionDatabase::open(std::path::Path::new("games.oriondb")).unwrap();
/// let wins = db
///     .search()
///     .player("carlsen, magnus")
///     .result("1-0")
///     .execute();
/// ```
pub struct SearchBuilder<'a> {
    db: &'a OrionDatabase,
    params: SearchParams,
}

impl<'a> SearchBuilder<'a> {
    pub(crate) fn new(db: &'a OrionDatabase) -> SearchBuilder<'a> {
        SearchBuilder {
            db,
            params: SearchParams::default(),
        }
    }

    /// Matches either color, case-insensitively.
    pub fn player(mut self, name: impl Into<String>) -> Self {
        self.params.player = Some(name.into());
        self
    }

    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.params.event = Some(name.into());
        self
    }

    pub fn eco(mut self, code: impl Into<String>) -> Self {
        self.params.eco = Some(code.into());
        self
    }

    /// One of `1-0`, `0-1`, `1/2-1/2`, `*`.
    pub fn result(mut self, result: impl Into<String>) -> Self {
        self.params.result = Some(result.into());
        self
    }

    pub fn min_elo(mut self, elo: u32) -> Self {
        self.params.min_elo = Some(elo);
        self
    }

    pub fn max_elo(mut self, elo: u32) -> Self {
        self.params.max_elo = Some(elo);
        self
    }

    pub fn elo_range(self, min: u32, max: u32) -> Self {
        self.min_elo(min).max_elo(max)
    }

    /// Dates are "YYYY.MM.DD" strings, compared lexicographically.
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.params.start_date = Some(date.into());
        self
    }

    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.params.end_date = Some(date.into());
        self
    }

    pub fn date_range(self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date(start).end_date(end)
    }

    /// Games reaching the exact position (board, side, castling, en passant).
    pub fn fen(mut self, fen: impl Into<String>) -> Self {
        self.params.fen = Some(fen.into());
        self
    }

    pub fn pawn_structure(mut self, structure: PawnStructure) -> Self {
        self.params.pawn_structure = Some(structure);
        self
    }

    /// Games with a comment containing every token of `text`.
    pub fn commentary(mut self, text: impl Into<String>) -> Self {
        self.params.commentary = Some(text.into());
        self
    }

    /// Games in which this exact SAN token was played.
    pub fn san_move(mut self, san: impl Into<String>) -> Self {
        self.params.san_move = Some(san.into());
        self
    }

    pub fn motif(mut self, motif: TacticalMotif) -> Self {
        self.params.motif = Some(motif);
        self
    }

    /// Matching game ids, ascending.
    pub fn execute_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = resolve_ids(self.db, &self.params)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Matching games, loaded from the archive in id order. Unreadable games
    /// are logged and skipped.
    pub fn execute(&self) -> Vec<Game> {
        materialize(self.db, &self.execute_ids())
    }

    /// Size of the intersection, without touching the archive.
    pub fn count(&self) -> usize {
        resolve_ids(self.db, &self.params).map_or(0, |set| set.len())
    }
}

/// Load games by id, skipping (and logging) read failures.
pub(crate) fn materialize(db: &OrionDatabase, ids: &[u32]) -> Vec<Game> {
    let mut games = Vec::with_capacity(ids.len());
    for &id in ids {
        match db.game_by_id(id) {
            Ok(Some(game)) => games.push(game),
            Ok(None) => warn!(game_id = id, "game id in postings but not in offset map"),
            Err(err) => error!(game_id = id, error = %err, "skipping unreadable game"),
        }
    }
    games
}

/// Intersect the posting sets for every populated slot. `None` means the
/// query matches nothing (some slot produced an empty set, or no slot was
/// populated at all).
pub(crate) fn resolve_ids(db: &OrionDatabase, params: &SearchParams) -> Option<HashSet<u32>> {
    if params.match_nothing {
        return None;
    }

    let indexes = db.indexes();
    let metadata = &indexes.metadata;
    let mut sets: Vec<HashSet<u32>> = Vec::new();

    let mut push = |set: HashSet<u32>| -> bool {
        let empty = set.is_empty();
        sets.push(set);
        !empty
    };

    if let Some(player) = &params.player {
        if !push(metadata.find_by_player(player)) {
            return None;
        }
    }
    if let Some(event) = &params.event {
        if !push(metadata.find_by_event(event)) {
            return None;
        }
    }
    if let Some(needle) = &params.event_contains {
        if !push(metadata.find_by_event_containing(needle)) {
            return None;
        }
    }
    if let Some(eco) = &params.eco {
        if !push(metadata.find_by_eco(eco)) {
            return None;
        }
    }
    if let Some(result) = &params.result {
        if !push(metadata.find_by_result(result)) {
            return None;
        }
    }
    if params.min_elo.is_some() || params.max_elo.is_some() {
        let min = params.min_elo.unwrap_or(0);
        let max = params.max_elo.unwrap_or(3000);
        if !push(metadata.find_by_elo_range(min, max)) {
            return None;
        }
    }
    if params.start_date.is_some() || params.end_date.is_some() {
        let start = params.start_date.as_deref().unwrap_or("0000.00.00");
        let end = params.end_date.as_deref().unwrap_or("9999.99.99");
        if !push(metadata.find_by_date_range(start, end)) {
            return None;
        }
    }

    if let Some(fen) = &params.fen {
        let Ok(position) = Position::from_fen(fen) else {
            warn!(%fen, "unparseable FEN predicate matches nothing");
            return None;
        };
        let set = indexes
            .position
            .as_ref()
            .map(|index| {
                index
                    .find_by_hash(zobrist::hash(&position))
                    .into_iter()
                    .map(|pos| pos.game_id)
                    .collect()
            })
            .unwrap_or_default();
        if !push(set) {
            return None;
        }
    }

    if let Some(structure) = params.pawn_structure {
        let set = indexes
            .structure
            .as_ref()
            .map(|index| {
                index
                    .find_by_structure(structure)
                    .into_iter()
                    .map(|pos| pos.game_id)
                    .collect()
            })
            .unwrap_or_default();
        if !push(set) {
            return None;
        }
    }

    if let Some(text) = &params.commentary {
        let set = indexes
            .comments
            .as_ref()
            .map(|index| index.search(text).into_iter().map(|pos| pos.game_id).collect())
            .unwrap_or_default();
        if !push(set) {
            return None;
        }
    }

    if let Some(san) = &params.san_move {
        let set = indexes
            .moves
            .as_ref()
            .map(|index| index.find_move(san).into_iter().map(|pos| pos.game_id).collect())
            .unwrap_or_default();
        if !push(set) {
            return None;
        }
    }

    if let Some(motif) = params.motif {
        let set = indexes
            .motifs
            .as_ref()
            .map(|index| index.games_with_motif(motif))
            .unwrap_or_default();
        if !push(set) {
            return None;
        }
    }

    // No filters at all: match nothing rather than the whole database
    let (first, rest) = sets.split_first()?;
    let mut intersection = first.clone();
    for set in rest {
        intersection.retain(|id| set.contains(id));
        if intersection.is_empty() {
            return None;
        }
    }
    Some(intersection)
}
