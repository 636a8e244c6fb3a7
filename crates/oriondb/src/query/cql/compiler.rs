//! Lowers the CQL AST onto [`SearchParams`].
//!
//! The output is a disjunction of conjunctions: `AND` merges two parameter
//! sets into one (range bounds tighten, set slots take the later value),
//! `OR` concatenates alternatives. Execution intersects within each
//! parameter set and unions across them.

use tracing::warn;

use crate::error::CqlError;
use crate::query::SearchParams;

use super::ast::{BinaryOp, CompareOp, Expr, Value};

pub fn compile(expr: &Expr) -> Result<Vec<SearchParams>, CqlError> {
    match expr {
        Expr::Comparison { field, op, value } => Ok(vec![lower_comparison(field, *op, value)?]),
        Expr::Binary { left, op, right } => {
            let left = compile(left)?;
            let right = compile(right)?;
            match op {
                BinaryOp::Or => Ok(left.into_iter().chain(right).collect()),
                BinaryOp::And => {
                    let mut merged = Vec::with_capacity(left.len() * right.len());
                    for a in &left {
                        for b in &right {
                            merged.push(merge_and(a, b));
                        }
                    }
                    Ok(merged)
                }
            }
        }
    }
}

fn unsupported(op: CompareOp, field: &str) -> CqlError {
    CqlError::UnsupportedOperator {
        op: op.symbol().to_string(),
        field: field.to_string(),
    }
}

fn lower_comparison(field: &str, op: CompareOp, value: &Value) -> Result<SearchParams, CqlError> {
    let mut params = SearchParams::default();
    let field_name = field.to_lowercase();

    match field_name.as_str() {
        "player" => match op {
            CompareOp::Eq => params.player = Some(value.as_str()),
            _ => return Err(unsupported(op, &field_name)),
        },
        "event" => match op {
            CompareOp::Eq => params.event = Some(value.as_str()),
            CompareOp::Contains => params.event_contains = Some(value.as_str()),
            _ => return Err(unsupported(op, &field_name)),
        },
        "eco" => match op {
            CompareOp::Eq => params.eco = Some(value.as_str()),
            _ => return Err(unsupported(op, &field_name)),
        },
        "result" => match op {
            CompareOp::Eq => params.result = Some(value.as_str()),
            _ => return Err(unsupported(op, &field_name)),
        },
        "elo" => {
            let elo = value.as_int().ok_or_else(|| CqlError::ExpectedNumber {
                field: field_name.clone(),
            })?;
            match op {
                CompareOp::Gt => params.min_elo = Some(clamp_elo(elo + 1)),
                CompareOp::Ge => params.min_elo = Some(clamp_elo(elo)),
                CompareOp::Lt => {
                    if elo <= 0 {
                        params.match_nothing = true;
                    } else {
                        params.max_elo = Some(clamp_elo(elo - 1));
                    }
                }
                CompareOp::Le => params.max_elo = Some(clamp_elo(elo)),
                CompareOp::Eq => {
                    params.min_elo = Some(clamp_elo(elo));
                    params.max_elo = Some(clamp_elo(elo));
                }
                _ => return Err(unsupported(op, &field_name)),
            }
        }
        "date" => {
            let date = value.as_str();
            match op {
                CompareOp::Ge => params.start_date = Some(date),
                CompareOp::Le => params.end_date = Some(date),
                CompareOp::Eq => {
                    params.start_date = Some(date.clone());
                    params.end_date = Some(date);
                }
                _ => return Err(unsupported(op, &field_name)),
            }
        }
        "fen" => match op {
            CompareOp::Eq => params.fen = Some(value.as_str()),
            _ => return Err(unsupported(op, &field_name)),
        },
        "structure" => match op {
            CompareOp::Eq => match value.as_str().parse() {
                Ok(structure) => params.pawn_structure = Some(structure),
                Err(()) => {
                    warn!(value = %value.as_str(), "unknown pawn structure matches nothing");
                    params.match_nothing = true;
                }
            },
            _ => return Err(unsupported(op, &field_name)),
        },
        "motif" => match op {
            CompareOp::Eq => match value.as_str().parse() {
                Ok(motif) => params.motif = Some(motif),
                Err(()) => {
                    warn!(value = %value.as_str(), "unknown motif matches nothing");
                    params.match_nothing = true;
                }
            },
            _ => return Err(unsupported(op, &field_name)),
        },
        "commentary" => match op {
            CompareOp::Eq | CompareOp::Contains => params.commentary = Some(value.as_str()),
            _ => return Err(unsupported(op, &field_name)),
        },
        "move" => match op {
            CompareOp::Eq => params.san_move = Some(value.as_str()),
            _ => return Err(unsupported(op, &field_name)),
        },
        other => {
            // Unknown fields are warnings, not errors: the predicate drops out
            warn!(field = other, "ignoring unknown CQL field");
        }
    }

    Ok(params)
}

fn clamp_elo(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// AND of two conjunctions: set slots take the right side when both are
/// given; range bounds tighten toward the intersection.
fn merge_and(a: &SearchParams, b: &SearchParams) -> SearchParams {
    SearchParams {
        player: b.player.clone().or_else(|| a.player.clone()),
        event: b.event.clone().or_else(|| a.event.clone()),
        event_contains: b.event_contains.clone().or_else(|| a.event_contains.clone()),
        eco: b.eco.clone().or_else(|| a.eco.clone()),
        result: b.result.clone().or_else(|| a.result.clone()),
        min_elo: max_bound(a.min_elo, b.min_elo),
        max_elo: min_bound(a.max_elo, b.max_elo),
        start_date: max_bound(a.start_date.clone(), b.start_date.clone()),
        end_date: min_bound(a.end_date.clone(), b.end_date.clone()),
        fen: b.fen.clone().or_else(|| a.fen.clone()),
        pawn_structure: b.pawn_structure.or(a.pawn_structure),
        commentary: b.commentary.clone().or_else(|| a.commentary.clone()),
        san_move: b.san_move.clone().or_else(|| a.san_move.clone()),
        motif: b.motif.or(a.motif),
        match_nothing: a.match_nothing || b.match_nothing,
    }
}

fn max_bound<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn min_bound<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
