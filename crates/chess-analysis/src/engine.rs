//! The engine session abstraction the analyzer drives.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::board::BoardError;
use crate::evaluation::{Evaluation, Perspective};

/// One candidate move as reported by the engine, keyed the way the engine
/// binding emits it (`Move`, `Centipawn`, `MultiPVLine`, ...).
///
/// Rows are deliberately loose; [`crate::shaper::shape`] turns them into
/// typed [`crate::TopMove`]s.
pub type RawEngineRow = Map<String, Value>;

/// Errors that can occur when working with chess engines.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process.
    #[error("Failed to spawn engine: {0}")]
    SpawnError(#[from] std::io::Error),
    /// Engine executable was not found at the specified path.
    #[error("Engine not found at path: {0}")]
    NotFound(String),
    /// Engine failed to initialize properly (UCI handshake failed).
    #[error("Engine initialization failed")]
    InitFailed,
    /// Engine returned an invalid or unexpected response.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
    /// Talking to the engine failed.
    #[error("UCI error: {0}")]
    Protocol(#[from] uci::UciError),
    /// An operation needed a position but none was loaded.
    #[error("No position loaded")]
    NoPosition,
    /// Position bookkeeping rejected the input.
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Ends a search running on an [`EngineSession`] from another thread.
///
/// The interrupted search returns normally with whatever it found so far.
pub trait SearchInterrupt: Send + Sync {
    fn stop(&self) -> Result<(), EngineError>;
}

/// A stateful handle to an analysis engine.
///
/// The session holds exactly one current position. [`EngineSession::load_position`]
/// replaces it outright; [`EngineSession::apply_move`] advances it one ply and
/// cannot be undone. Validity queries never mutate the session.
pub trait EngineSession: Send {
    /// The engine's name as reported during initialization.
    fn name(&self) -> &str;

    /// Whether `fen` describes a well-formed, legal position.
    fn is_position_valid(&self, fen: &str) -> bool;

    /// Replaces the current position.
    ///
    /// # Errors
    ///
    /// - `EngineError::Board` if the FEN is invalid
    /// - `EngineError::Protocol` if the engine cannot be reached
    fn load_position(&mut self, fen: &str) -> Result<(), EngineError>;

    /// Whether `mv` is legal in the current position. `false` when nothing
    /// is loaded.
    fn is_move_valid(&self, mv: &str) -> bool;

    /// Whether playing `mv` in the current position captures a piece.
    fn would_capture(&self, mv: &str) -> Result<bool, EngineError>;

    /// Plays `mv`, advancing the current position one ply.
    fn apply_move(&mut self, mv: &str) -> Result<(), EngineError>;

    /// Static evaluation of the current position in pawns, or `None` when the
    /// engine declines to evaluate it (side to move in check).
    fn static_evaluation(&mut self) -> Result<Option<f64>, EngineError>;

    /// Up to `count` best moves of the current position, best first.
    fn top_moves(&mut self, count: usize) -> Result<Vec<RawEngineRow>, EngineError>;

    /// Win/draw/loss per mille for the side to move, when the engine reports it.
    fn win_draw_loss_stats(&mut self) -> Result<Option<[u32; 3]>, EngineError>;

    /// Searches the current position for `search_time_ms` milliseconds.
    fn evaluation(&mut self, search_time_ms: u64) -> Result<Evaluation, EngineError>;

    /// Depth used by fixed-depth searches ([`EngineSession::top_moves`] and
    /// [`EngineSession::win_draw_loss_stats`]).
    fn set_search_depth(&mut self, depth: u32);

    /// Point of view for every score the session reports.
    fn set_evaluation_perspective(&mut self, perspective: Perspective);

    /// A handle that can end a running search while another thread holds the
    /// session. `None` when the engine cannot be interrupted.
    fn interrupt_handle(&self) -> Option<Arc<dyn SearchInterrupt>>;
}
