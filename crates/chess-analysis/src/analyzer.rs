//! Position evaluation and move analysis over a shared engine session.
//!
//! This module provides the [`Analyzer`], which sequences validation and
//! engine queries for the two user-facing operations. The session is owned
//! behind a mutex and held for the whole of one operation, so requests never
//! observe each other's positions.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use thiserror::Error;

use crate::engine::{EngineError, EngineSession, SearchInterrupt};
use crate::evaluation::{Evaluation, Perspective};
use crate::shaper::{shape, ShapeError, TopMove};

/// Number of candidate moves reported for a position.
pub const TOP_MOVE_COUNT: usize = 3;

/// The standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors that can occur during analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The position failed validation; the session was not touched.
    #[error("Invalid FEN")]
    InvalidPosition,
    /// The move is not legal in the requested position.
    #[error("Invalid move")]
    InvalidMove,
    /// The engine reported a candidate move that does not fit the schema.
    #[error("Invalid engine output: {0}")]
    InvalidEngineOutput(#[from] ShapeError),
    /// The search budget is negative, not a number, or above the limit.
    #[error("Invalid time to analyze: {0}")]
    InvalidSearchTime(f64),
    /// The engine has no static evaluation for a position in check.
    #[error("Static evaluation is unavailable for a position in check")]
    StaticEvaluationUnavailable,
    /// Error from the engine session.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    /// A previous operation panicked while holding the session.
    #[error("Engine session is unavailable")]
    SessionPoisoned,
}

impl AnalysisError {
    /// Whether the error was caused by the request rather than the engine.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidPosition
                | AnalysisError::InvalidMove
                | AnalysisError::InvalidEngineOutput(_)
                | AnalysisError::InvalidSearchTime(_)
        )
    }
}

/// Configuration for analysis.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Depth for top move and win/draw/loss searches.
    pub depth: u32,
    /// Largest accepted search budget for [`Analyzer::evaluate_position`].
    pub max_search_time_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            depth: 8,
            max_search_time_ms: 10_000,
        }
    }
}

/// Result of [`Analyzer::evaluate_position`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionEvaluation {
    /// Search score from White's point of view.
    pub evaluation: Evaluation,
    /// Win/draw/loss per mille for the side to move.
    pub wdl_stats: Option<[u32; 3]>,
    /// Best moves, best first.
    pub top_moves: Vec<TopMove>,
}

/// Result of [`Analyzer::analyze_move`]. Evaluations are static, in pawns,
/// from White's point of view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveAnalysis {
    /// Whether the move captures, judged before it is played.
    pub is_capture: bool,
    pub evaluation_before: f64,
    pub evaluation_after: f64,
    /// `evaluation_after - evaluation_before`, rounded to centipawns.
    pub evaluation_change: f64,
}

/// Converts a requested analysis time into a whole number of milliseconds,
/// truncating any fraction.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidSearchTime` for negative, NaN or infinite
/// values, and for budgets that truncate to more than `max_ms`.
pub fn search_budget_ms(time_to_analyze_ms: f64, max_ms: u64) -> Result<u64, AnalysisError> {
    if !time_to_analyze_ms.is_finite() || time_to_analyze_ms < 0.0 {
        return Err(AnalysisError::InvalidSearchTime(time_to_analyze_ms));
    }
    let budget = time_to_analyze_ms.floor();
    if budget > max_ms as f64 {
        return Err(AnalysisError::InvalidSearchTime(time_to_analyze_ms));
    }
    Ok(budget as u64)
}

fn round_to_centipawns(pawns: f64) -> f64 {
    (pawns * 100.0).round() / 100.0
}

/// Runs analyses against a single engine session.
pub struct Analyzer {
    session: Mutex<Box<dyn EngineSession>>,
    engine_name: String,
    /// Reaches the session's running search without taking the lock.
    interrupt: Option<Arc<dyn SearchInterrupt>>,
    max_search_time_ms: u64,
}

impl Analyzer {
    /// Creates an analyzer that takes ownership of `session`.
    ///
    /// The session is switched to White's point of view so that evaluations
    /// on either side of a move are comparable.
    ///
    /// # Arguments
    ///
    /// * `session` - The engine session to drive.
    /// * `config` - Analysis configuration.
    pub fn new(mut session: Box<dyn EngineSession>, config: AnalysisConfig) -> Self {
        session.set_search_depth(config.depth);
        session.set_evaluation_perspective(Perspective::Absolute);
        let engine_name = session.name().to_string();
        let interrupt = session.interrupt_handle();
        Self {
            session: Mutex::new(session),
            engine_name,
            interrupt,
            max_search_time_ms: config.max_search_time_ms,
        }
    }

    /// The engine's name as reported during initialization.
    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    /// Ends the search currently running on the session, if any.
    ///
    /// Used when a caller gives up on an operation: the operation still
    /// completes, but without waiting out the rest of its search budget.
    /// An engine that is not searching ignores the request.
    pub fn stop_search(&self) {
        let Some(interrupt) = &self.interrupt else {
            return;
        };
        if let Err(e) = interrupt.stop() {
            tracing::warn!(error = %e, "Failed to stop engine search");
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, Box<dyn EngineSession>>, AnalysisError> {
        self.session.lock().map_err(|_| {
            tracing::error!("Engine session lock poisoned");
            AnalysisError::SessionPoisoned
        })
    }

    /// Evaluates a position: top moves and win/draw/loss statistics at the
    /// configured depth, plus a time-bounded search score.
    ///
    /// # Arguments
    ///
    /// * `fen` - Position in FEN notation.
    /// * `time_to_analyze_ms` - Search budget; fractions of a millisecond are dropped.
    ///
    /// # Errors
    ///
    /// - `AnalysisError::InvalidPosition` if the FEN is invalid (nothing is loaded)
    /// - `AnalysisError::InvalidSearchTime` if the budget is negative, not
    ///   finite or above the configured maximum
    /// - `AnalysisError::InvalidEngineOutput` if a top move row is malformed
    /// - `AnalysisError::Engine` if the engine fails
    pub fn evaluate_position(
        &self,
        fen: &str,
        time_to_analyze_ms: f64,
    ) -> Result<PositionEvaluation, AnalysisError> {
        let mut session = self.session()?;

        if !session.is_position_valid(fen) {
            tracing::warn!(fen, "Rejected invalid FEN");
            return Err(AnalysisError::InvalidPosition);
        }
        let budget_ms = search_budget_ms(time_to_analyze_ms, self.max_search_time_ms)?;

        session.load_position(fen)?;
        let rows = session.top_moves(TOP_MOVE_COUNT)?;
        let wdl_stats = session.win_draw_loss_stats()?;
        let evaluation = session.evaluation(budget_ms)?;

        let top_moves = shape(&rows).map_err(|e| {
            tracing::warn!(error = %e, fen, "Engine returned malformed top move");
            e
        })?;

        tracing::debug!(fen, budget_ms, ?evaluation, "Position evaluated");
        Ok(PositionEvaluation {
            evaluation,
            wdl_stats,
            top_moves,
        })
    }

    /// Analyzes a single move: whether it captures and how the static
    /// evaluation changes when it is played.
    ///
    /// The position stays loaded in the session when the move is rejected.
    ///
    /// # Errors
    ///
    /// - `AnalysisError::InvalidPosition` if the FEN is invalid (nothing is loaded)
    /// - `AnalysisError::InvalidMove` if the move is illegal in the position
    /// - `AnalysisError::StaticEvaluationUnavailable` if either side of the
    ///   move is in check
    /// - `AnalysisError::Engine` if the engine fails
    pub fn analyze_move(&self, fen: &str, mv: &str) -> Result<MoveAnalysis, AnalysisError> {
        let mut session = self.session()?;

        if !session.is_position_valid(fen) {
            tracing::warn!(fen, "Rejected invalid FEN");
            return Err(AnalysisError::InvalidPosition);
        }
        session.load_position(fen)?;

        if !session.is_move_valid(mv) {
            tracing::warn!(fen, mv, "Rejected invalid move");
            return Err(AnalysisError::InvalidMove);
        }

        let is_capture = session.would_capture(mv)?;
        let evaluation_before = session
            .static_evaluation()?
            .ok_or(AnalysisError::StaticEvaluationUnavailable)?;
        session.apply_move(mv)?;
        let evaluation_after = session
            .static_evaluation()?
            .ok_or(AnalysisError::StaticEvaluationUnavailable)?;

        let evaluation_change = round_to_centipawns(evaluation_after - evaluation_before);
        tracing::debug!(fen, mv, is_capture, evaluation_change, "Move analyzed");
        Ok(MoveAnalysis {
            is_capture,
            evaluation_before,
            evaluation_after,
            evaluation_change,
        })
    }

    /// Top moves from the standard starting position.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails or reports a malformed row.
    pub fn opening_top_moves(&self) -> Result<Vec<TopMove>, AnalysisError> {
        let mut session = self.session()?;
        session.load_position(STARTING_FEN)?;
        let rows = session.top_moves(TOP_MOVE_COUNT)?;
        Ok(shape(&rows)?)
    }
}
