//! Token index over move comments.
//!
//! Tokenization is deliberately simple: lowercase, split on whitespace and
//! basic punctuation, drop tokens of one or two characters. A richer
//! full-text engine can replace this behind the same two calls.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::GamePosition;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CommentIndex {
    token_to_positions: HashMap<String, HashSet<GamePosition>>,
}

/// Lowercased tokens longer than two characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '!' | '?' | ';' | ':'))
        .filter(|token| token.len() > 2)
        .map(str::to_string)
        .collect()
}

impl CommentIndex {
    pub fn add_comment(&mut self, comment: &str, position: GamePosition) {
        for token in tokenize(comment) {
            self.token_to_positions
                .entry(token)
                .or_default()
                .insert(position.clone());
        }
    }

    /// Positions whose comments contain every token of `text` (AND).
    pub fn search(&self, text: &str) -> HashSet<GamePosition> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return HashSet::new();
        }

        let mut result: Option<HashSet<GamePosition>> = None;
        for token in tokens {
            let Some(positions) = self.token_to_positions.get(&token) else {
                return HashSet::new();
            };
            result = Some(match result {
                None => positions.clone(),
                Some(acc) => acc.intersection(positions).cloned().collect(),
            });
        }
        result.unwrap_or_default()
    }

    pub fn unique_token_count(&self) -> usize {
        self.token_to_positions.len()
    }
}
