//! Chess position analysis on top of a UCI engine session.
//!
//! This crate validates positions and moves, drives an engine session
//! through the two analysis operations and reshapes the engine's loosely
//! keyed output into typed results.
//!
//! # Overview
//!
//! - [`Analyzer`] - Evaluates positions and analyzes single moves over a locked session
//! - [`EngineSession`] - The stateful engine interface the analyzer drives
//! - [`StockfishSession`] - [`EngineSession`] backed by a Stockfish process
//! - [`BoardState`] - Board oracle for FEN validity, move legality and captures
//! - [`shape`] - Normalizes raw engine rows into [`TopMove`]s
//! - [`Evaluation`] - Position evaluation (centipawn or mate score)
//!
//! # Example
//!
//! ```ignore
//! use chess_analysis::{AnalysisConfig, Analyzer, EngineConfig, StockfishSession};
//!
//! let session = StockfishSession::spawn(&EngineConfig::default())?;
//! let analyzer = Analyzer::new(Box::new(session), AnalysisConfig::default());
//! let result = analyzer.analyze_move(
//!     "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2",
//!     "e7e5",
//! )?;
//! println!("Change: {:+.2}", result.evaluation_change);
//! ```

pub mod analyzer;
pub mod board;
pub mod engine;
pub mod evaluation;
pub mod shaper;
pub mod stockfish;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use analyzer::{
    search_budget_ms, AnalysisConfig, AnalysisError, Analyzer, MoveAnalysis, PositionEvaluation,
    STARTING_FEN, TOP_MOVE_COUNT,
};
pub use board::{BoardError, BoardState};
pub use engine::{EngineError, EngineSession, RawEngineRow, SearchInterrupt};
pub use evaluation::{Evaluation, Perspective};
pub use shaper::{normalize_key, shape, SearchDiagnostics, ShapeError, TopMove};
pub use stockfish::{EngineConfig, StockfishSession};
