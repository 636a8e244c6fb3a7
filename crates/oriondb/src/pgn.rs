//! Error-tolerant streaming PGN parser.
//!
//! Reads one game's worth of text at a time: a game starts at the first
//! `[`-prefixed tag line, and ends at a result token on a movetext line or
//! when the next tag block opens after a blank-line gap. A malformed game is
//! recorded in the error log and skipped; parsing always continues.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::model::{Game, Move};

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\[\s*(\w+)\s+"([^"]*)"\s*\]"#).unwrap());
static MOVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([NBRQK]?[a-h]?[1-8]?x?[a-h][1-8](?:=[NBRQ])?[+#]?|O-O(?:-O)?[+#]?)").unwrap()
});
static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]*)\}").unwrap());
static RESULT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(1-0|0-1|1/2-1/2|\*)").unwrap());
static MOVE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.+").unwrap());
static NAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\d+").unwrap());

const ROSTER_DEFAULTS: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

/// A recorded parse failure; the game it points at was skipped.
#[derive(Debug, Clone)]
pub struct PgnIssue {
    /// 1-based ordinal of the game text within the input.
    pub game_number: usize,
    pub message: String,
}

/// Streaming parser. Game ids are assigned from a monotonic counter that
/// survives across inputs, so one parser can ingest several files.
#[derive(Default)]
pub struct PgnParser {
    next_id: u32,
    games_seen: usize,
    errors: Vec<PgnIssue>,
}

impl PgnParser {
    pub fn new() -> PgnParser {
        PgnParser::default()
    }

    pub fn parse_file(&mut self, path: &Path) -> io::Result<Vec<Game>> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }

    pub fn parse_str(&mut self, text: &str) -> Vec<Game> {
        // Reading from memory cannot fail
        self.parse_reader(io::Cursor::new(text))
            .expect("in-memory read")
    }

    pub fn parse_reader<R: BufRead>(&mut self, mut reader: R) -> io::Result<Vec<Game>> {
        let mut games = Vec::new();
        let mut pending: Option<String> = None;

        while let Some(text) = read_next_game(&mut reader, &mut pending)? {
            self.games_seen += 1;
            match self.parse_game(&text) {
                Ok(game) => games.push(game),
                Err(message) => {
                    warn!(game_number = self.games_seen, %message, "skipping malformed game");
                    self.errors.push(PgnIssue {
                        game_number: self.games_seen,
                        message,
                    });
                }
            }
        }

        Ok(games)
    }

    pub fn errors(&self) -> &[PgnIssue] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    fn parse_game(&mut self, text: &str) -> Result<Game, String> {
        let mut tags: Vec<(String, String)> = Vec::new();
        let mut last_tag_end = 0;
        for cap in TAG_RE.captures_iter(text) {
            let whole = cap.get(0).expect("regex match");
            let key = &cap[1];
            if !tags.iter().any(|(k, _)| k == key) {
                tags.push((key.to_string(), cap[2].to_string()));
            }
            last_tag_end = whole.end();
        }
        let found_tags = !tags.is_empty();

        let movetext = &text[last_tag_end..];
        let cleaned = MOVE_NUMBER_RE.replace_all(movetext, " ");
        let cleaned = NAG_RE.replace_all(&cleaned, " ");
        let cleaned = strip_variations(&cleaned);

        // Blank out comment spans in place so move and comment byte offsets
        // stay aligned in one coordinate system.
        let mut comments: Vec<(usize, String)> = Vec::new();
        let mut blanked = cleaned.clone().into_bytes();
        for cap in COMMENT_RE.captures_iter(&cleaned) {
            let whole = cap.get(0).expect("regex match");
            comments.push((whole.start(), cap[1].trim().to_string()));
            blanked[whole.start()..whole.end()].fill(b' ');
        }
        let blanked = String::from_utf8_lossy(&blanked);

        let mut move_starts = Vec::new();
        let mut moves = Vec::new();
        for m in MOVE_RE.find_iter(&blanked) {
            move_starts.push(m.start());
            moves.push(Move::new(m.as_str()));
        }

        if !found_tags && moves.is_empty() {
            return Err("no tag pairs or movetext found".to_string());
        }

        // A comment belongs to the most recent preceding move; when several
        // comments follow the same move, the last one wins.
        for (start, comment) in comments {
            if comment.is_empty() {
                continue;
            }
            if let Some(i) = move_starts.iter().rposition(|&m| m < start) {
                moves[i].comment = Some(comment);
            }
        }

        for (key, default) in ROSTER_DEFAULTS {
            if !tags.iter().any(|(k, _)| k == key) {
                tags.push((key.to_string(), default.to_string()));
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        Ok(Game::new(id, tags, moves))
    }
}

/// Buffer lines until a game is complete. `pending` carries the tag line
/// that opened the *next* game across calls.
fn read_next_game<R: BufRead>(
    reader: &mut R,
    pending: &mut Option<String>,
) -> io::Result<Option<String>> {
    let mut text = String::new();
    let mut in_game = false;
    let mut blank_gap = false;

    loop {
        let line = match pending.take() {
            Some(line) => line,
            None => {
                let mut buf = String::new();
                if reader.read_line(&mut buf)? == 0 {
                    break;
                }
                buf
            }
        };
        let line = line.trim();

        if line.is_empty() {
            if in_game {
                blank_gap = true;
            }
            continue;
        }

        if line.starts_with('[') {
            if in_game && blank_gap {
                // Next game's tag section: hold the line back
                *pending = Some(line.to_string());
                return Ok(Some(text));
            }
            in_game = true;
            blank_gap = false;
            text.push_str(line);
            text.push('\n');
        } else {
            if !in_game {
                continue; // stray movetext before any tag pair
            }
            blank_gap = false;
            text.push_str(line);
            text.push(' ');
            if RESULT_RE.is_match(line) {
                return Ok(Some(text));
            }
        }
    }

    Ok(if text.is_empty() { None } else { Some(text) })
}

/// Drop parenthesized variations, nested to any depth.
fn strip_variations(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut depth = 0u32;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => result.push(c),
            _ => {}
        }
    }
    result
}
