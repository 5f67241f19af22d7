//! An in-memory [`EngineSession`] for tests.
//!
//! [`FakeSession`] validates and plays moves with the real board oracle,
//! scores positions by material balance and records every call it receives,
//! so tests can assert both results and the order of session operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use cozy_chess::{Color, Piece};
use serde_json::{json, Value};

use crate::board::BoardState;
use crate::engine::{EngineError, EngineSession, RawEngineRow, SearchInterrupt};
use crate::evaluation::{Evaluation, Perspective};

/// One operation a [`FakeSession`] was asked to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    IsPositionValid(String),
    LoadPosition(String),
    IsMoveValid(String),
    WouldCapture(String),
    ApplyMove(String),
    StaticEvaluation,
    TopMoves(usize),
    WinDrawLossStats,
    Evaluation(u64),
    SetSearchDepth(u32),
    SetPerspective(Perspective),
    /// Sent through the interrupt handle, possibly from another thread.
    Stop,
}

/// Shared record of session calls; stays readable after the session has been
/// moved into an analyzer.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<SessionCall>>>);

impl CallLog {
    fn push(&self, call: SessionCall) {
        self.lock().push(call);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SessionCall>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<SessionCall> {
        self.lock().clone()
    }

    /// Whether any call matches `predicate`.
    pub fn any(&self, predicate: impl Fn(&SessionCall) -> bool) -> bool {
        self.lock().iter().any(predicate)
    }

    /// Position of the first call matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&SessionCall) -> bool) -> Option<usize> {
        self.lock().iter().position(predicate)
    }
}

/// Stop flag behind [`FakeSession`]'s interrupt handle.
struct FakeInterrupt {
    stopped: AtomicBool,
    log: CallLog,
}

impl SearchInterrupt for FakeInterrupt {
    fn stop(&self) -> Result<(), EngineError> {
        self.log.push(SessionCall::Stop);
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Engine session backed by the board oracle and a material count.
pub struct FakeSession {
    board: Option<BoardState>,
    log: CallLog,
    perspective: Perspective,
    rows: Option<Vec<RawEngineRow>>,
    wdl: Option<[u32; 3]>,
    timed_search: bool,
    interrupt: Arc<FakeInterrupt>,
}

impl Default for FakeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSession {
    pub fn new() -> Self {
        let log = CallLog::default();
        Self {
            board: None,
            log: log.clone(),
            perspective: Perspective::Relative,
            rows: None,
            wdl: Some([50, 900, 50]),
            timed_search: false,
            interrupt: Arc::new(FakeInterrupt {
                stopped: AtomicBool::new(false),
                log,
            }),
        }
    }

    /// Returns canned rows from `top_moves` instead of generated ones.
    pub fn with_rows(mut self, rows: Vec<RawEngineRow>) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_wdl(mut self, wdl: Option<[u32; 3]>) -> Self {
        self.wdl = wdl;
        self
    }

    /// Makes `evaluation` take its whole search budget, like `go movetime`,
    /// unless the interrupt handle stops it first.
    pub fn with_timed_search(mut self) -> Self {
        self.timed_search = true;
        self
    }

    /// A handle to the call log.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn wait_for_budget(&self, search_time_ms: u64) {
        let stopped = &self.interrupt.stopped;
        stopped.store(false, Ordering::SeqCst);
        let deadline = Instant::now() + Duration::from_millis(search_time_ms);
        while Instant::now() < deadline && !stopped.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    fn loaded(&self) -> Result<&BoardState, EngineError> {
        self.board.as_ref().ok_or(EngineError::NoPosition)
    }

    /// Material balance in centipawns from White's point of view.
    fn material(board: &BoardState) -> i32 {
        const VALUES: [(Piece, i32); 5] = [
            (Piece::Pawn, 100),
            (Piece::Knight, 300),
            (Piece::Bishop, 300),
            (Piece::Rook, 500),
            (Piece::Queen, 900),
        ];
        let board = board.board();
        VALUES
            .iter()
            .map(|&(piece, value)| {
                let white = (board.pieces(piece) & board.colors(Color::White)).len() as i32;
                let black = (board.pieces(piece) & board.colors(Color::Black)).len() as i32;
                (white - black) * value
            })
            .sum()
    }

    /// Material in the configured perspective.
    fn score(&self, board: &BoardState) -> i32 {
        let white = Self::material(board);
        if self.perspective == Perspective::Relative && board.side_to_move() == Color::Black {
            -white
        } else {
            white
        }
    }
}

/// A well-formed row in the engine binding's key convention.
pub fn engine_row(
    mv: &str,
    centipawn: Option<i32>,
    mate: Option<i32>,
    line: usize,
) -> RawEngineRow {
    let value = json!({
        "Move": mv,
        "Centipawn": centipawn,
        "Mate": mate,
        "Time": 4,
        "Nodes": 1200,
        "MultiPVLine": line,
        "NodesPerSecond": 300000,
        "SelectiveDepth": 9,
        "WDL": "50 900 50",
    });
    match value {
        Value::Object(map) => map,
        _ => RawEngineRow::new(),
    }
}

impl EngineSession for FakeSession {
    fn name(&self) -> &str {
        "Fake Engine"
    }

    fn is_position_valid(&self, fen: &str) -> bool {
        self.log.push(SessionCall::IsPositionValid(fen.to_string()));
        BoardState::is_valid_fen(fen)
    }

    fn load_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.log.push(SessionCall::LoadPosition(fen.to_string()));
        self.board = Some(BoardState::from_fen(fen)?);
        Ok(())
    }

    fn is_move_valid(&self, mv: &str) -> bool {
        self.log.push(SessionCall::IsMoveValid(mv.to_string()));
        self.board.as_ref().is_some_and(|board| board.is_legal(mv))
    }

    fn would_capture(&self, mv: &str) -> Result<bool, EngineError> {
        self.log.push(SessionCall::WouldCapture(mv.to_string()));
        Ok(self.loaded()?.would_capture(mv)?)
    }

    fn apply_move(&mut self, mv: &str) -> Result<(), EngineError> {
        self.log.push(SessionCall::ApplyMove(mv.to_string()));
        let board = self.board.as_mut().ok_or(EngineError::NoPosition)?;
        board.apply(mv)?;
        Ok(())
    }

    fn static_evaluation(&mut self) -> Result<Option<f64>, EngineError> {
        self.log.push(SessionCall::StaticEvaluation);
        let board = self.loaded()?;
        if board.in_check() {
            return Ok(None);
        }
        Ok(Some(f64::from(self.score(board)) / 100.0))
    }

    fn top_moves(&mut self, count: usize) -> Result<Vec<RawEngineRow>, EngineError> {
        self.log.push(SessionCall::TopMoves(count));
        let board = self.loaded()?;
        if let Some(rows) = &self.rows {
            return Ok(rows.iter().take(count).cloned().collect());
        }
        let score = self.score(board);
        Ok(board
            .legal_moves()
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, mv)| engine_row(mv, Some(score), None, i + 1))
            .collect())
    }

    fn win_draw_loss_stats(&mut self) -> Result<Option<[u32; 3]>, EngineError> {
        self.log.push(SessionCall::WinDrawLossStats);
        self.loaded()?;
        Ok(self.wdl)
    }

    fn evaluation(&mut self, search_time_ms: u64) -> Result<Evaluation, EngineError> {
        self.log.push(SessionCall::Evaluation(search_time_ms));
        if self.timed_search {
            self.wait_for_budget(search_time_ms);
        }
        let board = self.loaded()?;
        Ok(Evaluation::Centipawns(self.score(board)))
    }

    fn set_search_depth(&mut self, depth: u32) {
        self.log.push(SessionCall::SetSearchDepth(depth));
    }

    fn set_evaluation_perspective(&mut self, perspective: Perspective) {
        self.log.push(SessionCall::SetPerspective(perspective));
        self.perspective = perspective;
    }

    fn interrupt_handle(&self) -> Option<Arc<dyn SearchInterrupt>> {
        Some(self.interrupt.clone())
    }
}
