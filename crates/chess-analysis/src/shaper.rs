//! Turns loosely-keyed engine rows into typed top moves.
//!
//! Engine bindings report candidate moves as key/value records whose keys
//! are capitalized inconsistently (`MultiPVLine`, `NodesPerSecond`, `WDL`).
//! Keys are first normalized to lowercase snake case, then each row must
//! carry a move, exactly one of `centipawn` / `mate`, and every search
//! diagnostic. Diagnostics are kept as text and never interpreted.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::engine::RawEngineRow;
use crate::evaluation::Evaluation;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid regex"));
static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"));

/// A row that does not fit the top move schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("row {row}: both centipawn and mate scores are set")]
    ConflictingScores { row: usize },
    #[error("row {row}: neither centipawn nor mate score is set")]
    MissingScore { row: usize },
    #[error("row {row}: missing field '{field}'")]
    MissingField { row: usize, field: &'static str },
    #[error("row {row}: invalid value for '{field}': {value}")]
    InvalidValue {
        row: usize,
        field: &'static str,
        value: String,
    },
}

/// Search diagnostics attached to a top move, carried verbatim as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchDiagnostics {
    pub time: String,
    pub nodes: String,
    pub multi_pv_line: String,
    pub nodes_per_second: String,
    pub selective_depth: String,
    /// Win/draw/loss per mille, space separated.
    pub wdl: String,
}

/// A ranked candidate move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopMove {
    /// The move in UCI notation.
    #[serde(rename = "move")]
    pub mv: String,
    pub score: Evaluation,
    pub diagnostics: SearchDiagnostics,
}

impl TopMove {
    pub fn centipawn(&self) -> Option<i32> {
        self.score.centipawns()
    }

    pub fn mate(&self) -> Option<i32> {
        self.score.mate()
    }
}

/// Converts a key to lowercase snake case: `MultiPVLine` becomes
/// `multi_pv_line`, `WDL` becomes `wdl`.
pub fn normalize_key(key: &str) -> String {
    let key = ACRONYM_BOUNDARY.replace_all(key, "${1}_${2}");
    let key = WORD_BOUNDARY.replace_all(&key, "${1}_${2}");
    key.replace('-', "_").to_lowercase()
}

/// Shapes every row, failing on the first one that does not fit.
///
/// # Errors
///
/// Returns a [`ShapeError`] naming the offending row (0-based) when a row has
/// both or neither score, lacks a field, or holds a value of the wrong kind.
pub fn shape(rows: &[RawEngineRow]) -> Result<Vec<TopMove>, ShapeError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| shape_row(index, row))
        .collect()
}

fn shape_row(index: usize, raw: &RawEngineRow) -> Result<TopMove, ShapeError> {
    let row: HashMap<String, &Value> = raw
        .iter()
        .map(|(key, value)| (normalize_key(key), value))
        .collect();
    let fields = RowFields { index, row: &row };

    let score = match (fields.integer("centipawn")?, fields.integer("mate")?) {
        (Some(cp), None) => Evaluation::Centipawns(cp),
        (None, Some(mate)) => Evaluation::Mate(mate),
        (Some(_), Some(_)) => return Err(ShapeError::ConflictingScores { row: index }),
        (None, None) => return Err(ShapeError::MissingScore { row: index }),
    };

    let mv = match row.get("move") {
        Some(Value::String(mv)) if !mv.is_empty() => mv.clone(),
        Some(Value::Null) | None => {
            return Err(ShapeError::MissingField {
                row: index,
                field: "move",
            })
        }
        Some(other) => {
            return Err(ShapeError::InvalidValue {
                row: index,
                field: "move",
                value: other.to_string(),
            })
        }
    };

    Ok(TopMove {
        mv,
        score,
        diagnostics: SearchDiagnostics {
            time: fields.text("time")?,
            nodes: fields.text("nodes")?,
            multi_pv_line: fields.text("multi_pv_line")?,
            nodes_per_second: fields.text("nodes_per_second")?,
            selective_depth: fields.text("selective_depth")?,
            wdl: fields.text("wdl")?,
        },
    })
}

struct RowFields<'a> {
    index: usize,
    row: &'a HashMap<String, &'a Value>,
}

impl RowFields<'_> {
    /// An optional integer score; null and absent are the same.
    fn integer(&self, field: &'static str) -> Result<Option<i32>, ShapeError> {
        match self.row.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| ShapeError::InvalidValue {
                    row: self.index,
                    field,
                    value: value.to_string(),
                }),
        }
    }

    /// A required diagnostic, rendered as text.
    fn text(&self, field: &'static str) -> Result<String, ShapeError> {
        match self.row.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            None | Some(Value::Null) => Err(ShapeError::MissingField {
                row: self.index,
                field,
            }),
            Some(other) => Err(ShapeError::InvalidValue {
                row: self.index,
                field,
                value: other.to_string(),
            }),
        }
    }
}
