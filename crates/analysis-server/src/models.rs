//! Request and response bodies.
//!
//! Field names are camelCase on the wire; every successful response is
//! wrapped in a `data` envelope.

use chess_analysis::{Evaluation, MoveAnalysis, PositionEvaluation, TopMove};
use serde::{Deserialize, Serialize};

/// Default search budget for `/evaluate-position`, in milliseconds.
pub const DEFAULT_TIME_TO_ANALYZE_MS: f64 = 1000.0;

fn default_time_to_analyze() -> f64 {
    DEFAULT_TIME_TO_ANALYZE_MS
}

/// Top-level wrapper for all successful responses.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Body of `POST /evaluate-position`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatePositionRequest {
    pub fen: String,
    /// Search budget in milliseconds; fractions are truncated.
    #[serde(default = "default_time_to_analyze")]
    pub time_to_analyze: f64,
}

/// Body of `POST /analyze-move`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMoveRequest {
    pub fen: String,
    #[serde(rename = "move")]
    pub mv: String,
}

/// A candidate move. Exactly one of `centipawn` and `mate` is non-null.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopMoveResponse {
    #[serde(rename = "move")]
    pub mv: String,
    pub centipawn: Option<i32>,
    pub mate: Option<i32>,
    pub time: String,
    pub nodes: String,
    pub multi_pv_line: String,
    pub nodes_per_second: String,
    pub selective_depth: String,
    pub wdl: String,
}

impl From<TopMove> for TopMoveResponse {
    fn from(top: TopMove) -> Self {
        let centipawn = top.centipawn();
        let mate = top.mate();
        let d = top.diagnostics;
        Self {
            mv: top.mv,
            centipawn,
            mate,
            time: d.time,
            nodes: d.nodes,
            multi_pv_line: d.multi_pv_line,
            nodes_per_second: d.nodes_per_second,
            selective_depth: d.selective_depth,
            wdl: d.wdl,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatePositionResponse {
    pub evaluation: Evaluation,
    pub wdl_stats: Option<[u32; 3]>,
    pub top_three_moves: Vec<TopMoveResponse>,
}

impl From<PositionEvaluation> for EvaluatePositionResponse {
    fn from(result: PositionEvaluation) -> Self {
        Self {
            evaluation: result.evaluation,
            wdl_stats: result.wdl_stats,
            top_three_moves: result.top_moves.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMoveResponse {
    pub is_move_capture: bool,
    /// Static evaluation after the move, in pawns from White's point of view.
    pub evaluation_after_move: f64,
    pub absolute_evaluation_change: f64,
}

impl From<MoveAnalysis> for AnalyzeMoveResponse {
    fn from(analysis: MoveAnalysis) -> Self {
        Self {
            is_move_capture: analysis.is_capture,
            evaluation_after_move: analysis.evaluation_after,
            absolute_evaluation_change: analysis.evaluation_change,
        }
    }
}

/// Top moves from the starting position.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopThreeMovesResponse {
    pub top_three_moves: Vec<TopMoveResponse>,
}
