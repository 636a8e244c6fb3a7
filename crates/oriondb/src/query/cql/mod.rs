//! CQL, the small query language: `player='carlsen, magnus' AND elo > 2700`.
//!
//! Pipeline: [`lexer`] tokenizes, [`parser`] builds the [`ast::Expr`] tree,
//! [`compiler`] lowers it to a disjunction of [`SearchParams`] conjunctions.

pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;

use crate::error::CqlError;
use crate::query::SearchParams;

/// Full front-end: source text to executable parameter sets. The result is
/// a disjunction: a game matches if any one parameter set matches it.
pub fn compile(source: &str) -> Result<Vec<SearchParams>, CqlError> {
    let tokens = lexer::tokenize(source)?;
    let expr = parser::parse(&tokens)?;
    compiler::compile(&expr)
}
