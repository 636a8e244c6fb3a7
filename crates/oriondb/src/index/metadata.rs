//! Metadata index: offsets, inverted tag maps, and the Elo/date range maps.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::model::Game;

/// Unknown-value placeholders are never indexed; querying for them finds
/// nothing.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MetadataIndex {
    game_offsets: HashMap<u32, u64>,
    player: HashMap<String, HashSet<u32>>,
    event: HashMap<String, HashSet<u32>>,
    eco: HashMap<String, HashSet<u32>>,
    result: HashMap<String, HashSet<u32>>,
    elo: BTreeMap<u32, HashSet<u32>>,
    date: BTreeMap<String, HashSet<u32>>,
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl MetadataIndex {
    pub fn index_game(&mut self, game: &Game, offset: u64) {
        let game_id = game.id();
        self.game_offsets.insert(game_id, offset);

        for name in [game.white(), game.black()] {
            if name != "?" {
                self.player
                    .entry(normalize_name(name))
                    .or_default()
                    .insert(game_id);
            }
        }

        if game.event() != "?" {
            self.event
                .entry(normalize_name(game.event()))
                .or_default()
                .insert(game_id);
        }

        if let Some(eco) = game.eco() {
            self.eco
                .entry(eco.trim().to_uppercase())
                .or_default()
                .insert(game_id);
        }

        self.result
            .entry(game.result().to_string())
            .or_default()
            .insert(game_id);

        for elo in [game.white_elo(), game.black_elo()].into_iter().flatten() {
            self.elo.entry(elo).or_default().insert(game_id);
        }

        if game.date() != "????.??.??" {
            self.date
                .entry(game.date().to_string())
                .or_default()
                .insert(game_id);
        }
    }

    pub fn game_offset(&self, game_id: u32) -> Option<u64> {
        self.game_offsets.get(&game_id).copied()
    }

    pub fn game_count(&self) -> usize {
        self.game_offsets.len()
    }

    pub fn find_by_player(&self, name: &str) -> HashSet<u32> {
        self.player
            .get(&normalize_name(name))
            .cloned()
            .unwrap_or_default()
    }

    pub fn find_by_event(&self, name: &str) -> HashSet<u32> {
        self.event
            .get(&normalize_name(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Games whose (lowercased) event name contains `needle` as a substring.
    pub fn find_by_event_containing(&self, needle: &str) -> HashSet<u32> {
        let needle = normalize_name(needle);
        let mut out = HashSet::new();
        for (key, ids) in &self.event {
            if key.contains(&needle) {
                out.extend(ids);
            }
        }
        out
    }

    pub fn find_by_eco(&self, eco: &str) -> HashSet<u32> {
        self.eco
            .get(&eco.trim().to_uppercase())
            .cloned()
            .unwrap_or_default()
    }

    pub fn find_by_result(&self, result: &str) -> HashSet<u32> {
        self.result.get(result).cloned().unwrap_or_default()
    }

    /// Games where either player's rating falls in `[min, max]`.
    pub fn find_by_elo_range(&self, min: u32, max: u32) -> HashSet<u32> {
        let mut out = HashSet::new();
        for ids in self.elo.range(min..=max).map(|(_, ids)| ids) {
            out.extend(ids);
        }
        out
    }

    /// Games dated in `[start, end]`, comparing "YYYY.MM.DD" lexicographically.
    pub fn find_by_date_range(&self, start: &str, end: &str) -> HashSet<u32> {
        let mut out = HashSet::new();
        let range = (
            Bound::Included(start.to_string()),
            Bound::Included(end.to_string()),
        );
        for ids in self.date.range(range).map(|(_, ids)| ids) {
            out.extend(ids);
        }
        out
    }

    pub fn unique_players(&self) -> usize {
        self.player.len()
    }

    pub fn unique_events(&self) -> usize {
        self.event.len()
    }

    pub fn unique_ecos(&self) -> usize {
        self.eco.len()
    }
}
