//! Game records as they flow between the parser, archive, and indexes.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One half-move: the SAN token verbatim from the PGN, plus the brace
/// comment that followed it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub san: String,
    pub comment: Option<String>,
}

impl Move {
    pub fn new(san: impl Into<String>) -> Move {
        Move {
            san: san.into(),
            comment: None,
        }
    }

    pub fn with_comment(san: impl Into<String>, comment: impl Into<String>) -> Move {
        Move {
            san: san.into(),
            comment: Some(comment.into()),
        }
    }

    pub fn has_comment(&self) -> bool {
        self.comment.as_deref().map(|c| !c.is_empty()).unwrap_or(false)
    }
}

/// A parsed game: stable id, tag pairs in first-occurrence order, moves.
///
/// The Seven Tag Roster is always present; the parser fills in the standard
/// placeholder values for missing tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    id: u32,
    tags: Vec<(String, String)>,
    moves: Vec<Move>,
}

impl Game {
    pub fn new(id: u32, tags: Vec<(String, String)>, moves: Vec<Move>) -> Game {
        Game { id, tags, moves }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn tag_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.tag(key).unwrap_or(default)
    }

    pub fn event(&self) -> &str {
        self.tag_or("Event", "?")
    }

    pub fn site(&self) -> &str {
        self.tag_or("Site", "?")
    }

    pub fn date(&self) -> &str {
        self.tag_or("Date", "????.??.??")
    }

    pub fn round(&self) -> &str {
        self.tag_or("Round", "?")
    }

    pub fn white(&self) -> &str {
        self.tag_or("White", "?")
    }

    pub fn black(&self) -> &str {
        self.tag_or("Black", "?")
    }

    pub fn result(&self) -> &str {
        self.tag_or("Result", "*")
    }

    pub fn eco(&self) -> Option<&str> {
        self.tag("ECO").filter(|v| !v.is_empty())
    }

    pub fn white_elo(&self) -> Option<u32> {
        self.tag("WhiteElo").and_then(|v| v.parse().ok())
    }

    pub fn black_elo(&self) -> Option<u32> {
        self.tag("BlackElo").and_then(|v| v.parse().ok())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Game #{}: {} vs {} ({}) - {}",
            self.id,
            self.white(),
            self.black(),
            self.date(),
            self.result()
        )
    }
}

/// A position reached within a game: ply 0 is before any move, ply k is
/// after k half-moves. Identity is `(game_id, ply)`; the FEN rides along.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePosition {
    pub game_id: u32,
    pub ply: u32,
    pub fen: String,
}

impl GamePosition {
    pub fn new(game_id: u32, ply: u32, fen: impl Into<String>) -> GamePosition {
        GamePosition {
            game_id,
            ply,
            fen: fen.into(),
        }
    }
}

impl PartialEq for GamePosition {
    fn eq(&self, other: &GamePosition) -> bool {
        self.game_id == other.game_id && self.ply == other.ply
    }
}

impl Eq for GamePosition {}

impl Hash for GamePosition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.game_id.hash(state);
        self.ply.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_game() -> Game {
        Game::new(
            7,
            vec![
                ("Event".into(), "Tata Steel".into()),
                ("White".into(), "Carlsen, Magnus".into()),
                ("Black".into(), "Giri, Anish".into()),
                ("Result".into(), "1-0".into()),
                ("WhiteElo".into(), "2850".into()),
                ("BlackElo".into(), "?".into()),
            ],
            vec![Move::new("e4"), Move::with_comment("e5", "book")],
        )
    }

    #[test]
    fn test_tag_lookup_and_roster_defaults() {
        let game = sample_game();
        assert_eq!(game.white(), "Carlsen, Magnus");
        assert_eq!(game.result(), "1-0");
        assert_eq!(game.date(), "????.??.??");
        assert_eq!(game.round(), "?");
        assert_eq!(game.eco(), None);
    }

    #[test]
    fn test_elo_parsing() {
        let game = sample_game();
        assert_eq!(game.white_elo(), Some(2850));
        assert_eq!(game.black_elo(), None);
    }

    #[test]
    fn test_game_position_identity_ignores_fen() {
        let a = GamePosition::new(1, 4, "fen-a");
        let b = GamePosition::new(1, 4, "fen-b");
        let c = GamePosition::new(2, 4, "fen-a");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }
}
