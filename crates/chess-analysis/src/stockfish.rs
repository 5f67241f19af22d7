//! Stockfish-backed [`EngineSession`].

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cozy_chess::Color;
use serde::Deserialize;
use serde_json::{json, Value};
use uci::{
    EngineInfo, GoOptions, GuiCommand, SearchOutput, StopHandle, UciClient, MAX_UCI_LINES,
};

use crate::board::BoardState;
use crate::engine::{EngineError, EngineSession, RawEngineRow, SearchInterrupt};
use crate::evaluation::{Evaluation, Perspective};

/// How long a session waits for the engine to exit after `quit` before
/// killing it.
const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Engine process settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Executable path, or a bare name looked up in `PATH`.
    pub path: String,
    /// Depth for fixed-depth searches.
    pub depth: u32,
    pub threads: u32,
    pub hash_mb: u32,
    /// 0-20; 20 is full strength.
    pub skill_level: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: "stockfish".to_string(),
            depth: 8,
            threads: 1,
            hash_mb: 16,
            skill_level: 20,
        }
    }
}

/// The position the engine is currently set up with.
#[derive(Debug, Clone)]
struct LoadedPosition {
    start_fen: String,
    moves: Vec<String>,
    board: BoardState,
}

/// A Stockfish engine driven over UCI.
///
/// The engine has no way to report whether a FEN or a move is acceptable, so
/// the session mirrors the current position in a [`BoardState`] and answers
/// validity and capture queries locally. Only valid positions and legal moves
/// are ever sent to the engine.
///
/// [`StockfishSession::spawn`] runs the engine as a child process; any other
/// reader/writer pair works through [`StockfishSession::from_client`].
pub struct StockfishSession<R: BufRead = BufReader<ChildStdout>, W: Write = ChildStdin> {
    /// The engine process handle, reaped on drop.
    process: Option<Child>,
    client: UciClient<R, W>,
    depth: u32,
    perspective: Perspective,
    position: Option<LoadedPosition>,
    /// Whether the engine prints `wdl` in its info lines.
    wdl_supported: bool,
}

impl StockfishSession {
    /// Spawns the engine and prepares it for analysis.
    ///
    /// # Arguments
    ///
    /// * `config` - Executable path and engine options
    ///
    /// # Errors
    ///
    /// - `EngineError::NotFound` if the executable doesn't exist
    /// - `EngineError::SpawnError` if the engine process fails to start
    /// - `EngineError::InitFailed` if UCI initialization fails
    pub fn spawn(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut process = Command::new(&config.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => EngineError::NotFound(config.path.clone()),
                _ => EngineError::SpawnError(e),
            })?;

        let (Some(stdin), Some(stdout)) = (process.stdin.take(), process.stdout.take()) else {
            let _ = process.kill();
            let _ = process.wait();
            return Err(EngineError::InitFailed);
        };

        let client = UciClient::new(BufReader::new(stdout), stdin);
        let session = Self::start(Some(process), client, config)?;
        tracing::info!(
            engine = %session.client.name(),
            path = %config.path,
            depth = session.depth,
            wdl = session.wdl_supported,
            "Engine started"
        );
        Ok(session)
    }
}

impl<R: BufRead, W: Write> StockfishSession<R, W> {
    /// Prepares an engine that is already connected through `client`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InitFailed` if the UCI handshake fails.
    pub fn from_client(
        client: UciClient<R, W>,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        Self::start(None, client, config)
    }

    fn start(
        process: Option<Child>,
        client: UciClient<R, W>,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let mut session = Self {
            process,
            client,
            depth: config.depth.max(1),
            perspective: Perspective::default(),
            position: None,
            wdl_supported: false,
        };
        session.initialize(config)?;
        Ok(session)
    }

    fn initialize(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        self.client.handshake().map_err(|e| {
            tracing::error!(error = %e, path = %config.path, "UCI handshake failed");
            EngineError::InitFailed
        })?;

        self.set_option_if_supported("Threads", &config.threads.to_string())?;
        self.set_option_if_supported("Hash", &config.hash_mb.to_string())?;
        self.set_option_if_supported("UCI_LimitStrength", "false")?;
        self.set_option_if_supported("Skill Level", &config.skill_level.to_string())?;
        self.wdl_supported = self.set_option_if_supported("UCI_ShowWDL", "true")?;
        Ok(())
    }

    /// Sets an option the engine advertised; returns whether it was set.
    fn set_option_if_supported(&mut self, name: &str, value: &str) -> Result<bool, EngineError> {
        if !self.client.supports_option(name) {
            tracing::debug!(option = name, "Engine does not advertise option");
            return Ok(false);
        }
        self.client.set_option(name, value)?;
        tracing::debug!(option = name, value, "Engine option set");
        Ok(true)
    }

    fn loaded(&self) -> Result<&LoadedPosition, EngineError> {
        self.position.as_ref().ok_or(EngineError::NoPosition)
    }

    fn side_to_move(&self) -> Result<Color, EngineError> {
        Ok(self.loaded()?.board.side_to_move())
    }
}

impl<W: Write + Send> SearchInterrupt for StopHandle<W> {
    fn stop(&self) -> Result<(), EngineError> {
        StopHandle::stop(self)?;
        tracing::debug!("Sent stop to engine");
        Ok(())
    }
}

impl<R, W> EngineSession for StockfishSession<R, W>
where
    R: BufRead + Send,
    W: Write + Send + 'static,
{
    fn name(&self) -> &str {
        self.client.name()
    }

    fn is_position_valid(&self, fen: &str) -> bool {
        BoardState::is_valid_fen(fen)
    }

    fn load_position(&mut self, fen: &str) -> Result<(), EngineError> {
        let board = BoardState::from_fen(fen)?;
        let start_fen = board.fen();

        self.client.send(&GuiCommand::UciNewGame)?;
        self.client.sync()?;
        self.client.send(&GuiCommand::Position {
            fen: Some(start_fen.clone()),
            moves: Vec::new(),
        })?;

        self.position = Some(LoadedPosition {
            start_fen,
            moves: Vec::new(),
            board,
        });
        Ok(())
    }

    fn is_move_valid(&self, mv: &str) -> bool {
        self.position
            .as_ref()
            .is_some_and(|position| position.board.is_legal(mv))
    }

    fn would_capture(&self, mv: &str) -> Result<bool, EngineError> {
        Ok(self.loaded()?.board.would_capture(mv)?)
    }

    fn apply_move(&mut self, mv: &str) -> Result<(), EngineError> {
        let position = self.position.as_mut().ok_or(EngineError::NoPosition)?;
        position.board.apply(mv)?;
        position.moves.push(mv.to_string());

        let command = GuiCommand::Position {
            fen: Some(position.start_fen.clone()),
            moves: position.moves.clone(),
        };
        self.client.send(&command)?;
        Ok(())
    }

    fn static_evaluation(&mut self) -> Result<Option<f64>, EngineError> {
        let side = self.side_to_move()?;

        self.client.send(&GuiCommand::Eval)?;
        let line = self
            .client
            .read_until(MAX_UCI_LINES, "Final evaluation", |l| {
                l.starts_with("Final evaluation")
            })?;
        // `eval` has no terminator; flush whatever follows the summary line.
        self.client.sync()?;

        let pawns = parse_final_evaluation(&line)
            .ok_or_else(|| EngineError::InvalidResponse(line.clone()))?;
        Ok(pawns.map(|v| {
            if self.perspective == Perspective::Relative && side == Color::Black {
                -v
            } else {
                v
            }
        }))
    }

    fn top_moves(&mut self, count: usize) -> Result<Vec<RawEngineRow>, EngineError> {
        let side = self.side_to_move()?;
        if count == 0 {
            return Ok(Vec::new());
        }

        self.client.set_option("MultiPV", &count.to_string())?;
        let output = self.client.search(&GoOptions::depth(self.depth));
        let restored = self.client.set_option("MultiPV", "1");
        let output = output?;
        restored?;

        let rows = rows_from_search(&output, count, side, self.perspective);
        tracing::debug!(
            requested = count,
            returned = rows.len(),
            depth = self.depth,
            "Top moves collected"
        );
        Ok(rows)
    }

    fn win_draw_loss_stats(&mut self) -> Result<Option<[u32; 3]>, EngineError> {
        self.loaded()?;
        if !self.wdl_supported {
            return Ok(None);
        }

        let output = self.client.search(&GoOptions::depth(self.depth))?;
        if output.best_move.is_none() {
            return Ok(None);
        }
        Ok(output
            .infos
            .iter()
            .rev()
            .filter(|info| info.line() == 1)
            .find_map(|info| info.wdl)
            .map(|wdl| wdl.as_array()))
    }

    fn evaluation(&mut self, search_time_ms: u64) -> Result<Evaluation, EngineError> {
        let side = self.side_to_move()?;

        // `movetime 0` means "no limit" to Stockfish.
        let output = self
            .client
            .search(&GoOptions::movetime(search_time_ms.max(1)))?;
        let score = output.last_scored(1).and_then(|info| info.score).ok_or_else(|| {
            EngineError::InvalidResponse("search ended without a score".to_string())
        })?;

        Ok(Evaluation::from_engine_score(score, side, self.perspective))
    }

    fn set_search_depth(&mut self, depth: u32) {
        self.depth = depth.max(1);
    }

    fn set_evaluation_perspective(&mut self, perspective: Perspective) {
        self.perspective = perspective;
    }

    fn interrupt_handle(&self) -> Option<Arc<dyn SearchInterrupt>> {
        Some(Arc::new(self.client.stop_handle()))
    }
}

impl<R: BufRead, W: Write> Drop for StockfishSession<R, W> {
    fn drop(&mut self) {
        let quit = self.client.quit();
        let Some(process) = self.process.as_mut() else {
            return;
        };
        if quit.is_ok() {
            let deadline = Instant::now() + QUIT_GRACE;
            while Instant::now() < deadline {
                if let Ok(Some(_)) = process.try_wait() {
                    return;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
        }
        let _ = process.kill();
        let _ = process.wait();
    }
}

/// Parses the summary line of Stockfish's `eval` output.
///
/// `Final evaluation       +0.25 (white side) [with scaled NNUE, ...]` yields
/// `Some(Some(0.25))`; `Final evaluation: none (in check)` yields `Some(None)`.
fn parse_final_evaluation(line: &str) -> Option<Option<f64>> {
    let rest = line.strip_prefix("Final evaluation")?;
    let token = rest
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
        .split_whitespace()
        .next()?;
    if token == "none" {
        return Some(None);
    }
    token.parse::<f64>().ok().map(Some)
}

/// Builds one row per multipv line from a finished search, best line first.
fn rows_from_search(
    output: &SearchOutput,
    count: usize,
    side: Color,
    perspective: Perspective,
) -> Vec<RawEngineRow> {
    let mut rows = Vec::new();
    for line in 1..=count as u32 {
        let Some(info) = output
            .infos
            .iter()
            .rev()
            .find(|info| info.line() == line && info.is_complete_line())
        else {
            break;
        };
        if let Some(row) = raw_row(info, side, perspective) {
            rows.push(row);
        }
    }
    rows
}

fn raw_row(info: &EngineInfo, side: Color, perspective: Perspective) -> Option<RawEngineRow> {
    let score = Evaluation::from_engine_score(info.score?, side, perspective);
    let mv = info.pv.first()?;

    let mut row = RawEngineRow::new();
    row.insert("Move".to_string(), json!(mv));
    row.insert(
        "Centipawn".to_string(),
        score.centipawns().map_or(Value::Null, Value::from),
    );
    row.insert(
        "Mate".to_string(),
        score.mate().map_or(Value::Null, Value::from),
    );
    let diagnostics = [
        ("Time", info.time),
        ("Nodes", info.nodes),
        ("MultiPVLine", Some(u64::from(info.line()))),
        ("NodesPerSecond", info.nps),
        ("SelectiveDepth", info.seldepth.map(u64::from)),
    ];
    for (key, value) in diagnostics {
        if let Some(value) = value {
            row.insert(key.to_string(), json!(value));
        }
    }
    if let Some(wdl) = info.wdl {
        row.insert(
            "WDL".to_string(),
            json!(format!("{} {} {}", wdl.win, wdl.draw, wdl.loss)),
        );
    }
    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;

    const SICILIAN: &str = "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2";

    /// Engine output for `uci`, the following `isready` and one `readyok`
    /// per option set during initialization.
    const STARTUP: &[&str] = &[
        "Stockfish 16.1 by the Stockfish developers (see AUTHORS file)",
        "id name Stockfish 16.1",
        "id author the Stockfish developers (see AUTHORS file)",
        "option name Threads type spin default 1 min 1 max 1024",
        "option name Hash type spin default 16 min 1 max 33554432",
        "option name MultiPV type spin default 1 min 1 max 500",
        "option name Skill Level type spin default 20 min 0 max 20",
        "option name UCI_LimitStrength type check default false",
        "option name UCI_ShowWDL type check default false",
        "uciok",
        "readyok",
        "readyok",
        "readyok",
        "readyok",
        "readyok",
        "readyok",
    ];

    /// Records what the session writes to the engine.
    #[derive(Clone, Default)]
    struct Wire(Arc<Mutex<Vec<u8>>>);

    impl Write for Wire {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Wire {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }

        fn clear(&self) {
            self.0.lock().unwrap().clear();
        }
    }

    type ScriptedSession = StockfishSession<Cursor<Vec<u8>>, Wire>;

    /// A session whose engine prints the startup transcript followed by `replies`.
    fn scripted(startup: &[&str], replies: &[&str]) -> (ScriptedSession, Wire) {
        let mut text = startup.join("\n");
        for reply in replies {
            text.push('\n');
            text.push_str(reply);
        }
        text.push('\n');

        let wire = Wire::default();
        let client = UciClient::new(Cursor::new(text.into_bytes()), wire.clone());
        let session = StockfishSession::from_client(client, &EngineConfig::default()).unwrap();
        (session, wire)
    }

    /// A session with `fen` loaded and the wire cleared.
    fn loaded_session(fen: &str, replies: &[&str]) -> (ScriptedSession, Wire) {
        let mut all = vec!["readyok"];
        all.extend_from_slice(replies);
        let (mut session, wire) = scripted(STARTUP, &all);
        session.load_position(fen).unwrap();
        wire.clear();
        (session, wire)
    }

    #[test]
    fn test_startup_sets_advertised_options() {
        let (session, wire) = scripted(STARTUP, &[]);

        assert_eq!(session.name(), "Stockfish 16.1");
        assert!(session.wdl_supported);
        assert_eq!(
            wire.lines(),
            vec![
                "uci",
                "isready",
                "setoption name Threads value 1",
                "isready",
                "setoption name Hash value 16",
                "isready",
                "setoption name UCI_LimitStrength value false",
                "isready",
                "setoption name Skill Level value 20",
                "isready",
                "setoption name UCI_ShowWDL value true",
                "isready",
            ]
        );
    }

    #[test]
    fn test_startup_skips_unadvertised_options() {
        let (mut session, wire) = scripted(&["id name Minimal", "uciok", "readyok"], &["readyok"]);

        assert_eq!(wire.lines(), vec!["uci", "isready"]);
        session.load_position(SICILIAN).unwrap();
        wire.clear();
        assert_eq!(session.win_draw_loss_stats().unwrap(), None);
        assert!(wire.lines().is_empty());
    }

    #[test]
    fn test_load_position_resets_then_sends_fen() {
        let (mut session, wire) = scripted(STARTUP, &["readyok"]);
        wire.clear();

        session.load_position(SICILIAN).unwrap();

        let fen = BoardState::from_fen(SICILIAN).unwrap().fen();
        assert_eq!(
            wire.lines(),
            vec![
                "ucinewgame".to_string(),
                "isready".to_string(),
                format!("position fen {}", fen),
            ]
        );
    }

    #[test]
    fn test_invalid_input_never_reaches_engine() {
        let (mut session, wire) = loaded_session(SICILIAN, &[]);

        assert!(session.load_position("not a fen").is_err());
        assert!(!session.is_move_valid("a2a1"));
        assert!(session.apply_move("a2a1").is_err());
        assert!(wire.lines().is_empty());
    }

    #[test]
    fn test_apply_move_replays_moves_from_start_fen() {
        let (mut session, wire) = loaded_session(SICILIAN, &[]);

        session.apply_move("e7e5").unwrap();
        session.apply_move("f3e5").unwrap();

        let fen = BoardState::from_fen(SICILIAN).unwrap().fen();
        assert_eq!(
            wire.lines(),
            vec![
                format!("position fen {} moves e7e5", fen),
                format!("position fen {} moves e7e5 f3e5", fen),
            ]
        );
    }

    #[test]
    fn test_top_moves_restores_multipv() {
        let (mut session, wire) = loaded_session(
            SICILIAN,
            &[
                "readyok",
                "info depth 8 seldepth 10 multipv 1 score cp 31 wdl 52 921 27 nodes 8301 \
                 nps 754636 time 11 pv d7d6 d2d4",
                "info depth 8 seldepth 9 multipv 2 score cp 40 wdl 60 900 40 nodes 8301 \
                 nps 754636 time 11 pv e7e6",
                "bestmove d7d6 ponder d2d4",
                "readyok",
            ],
        );

        let rows = session.top_moves(2).unwrap();

        assert_eq!(
            wire.lines(),
            vec![
                "setoption name MultiPV value 2",
                "isready",
                "go depth 8",
                "setoption name MultiPV value 1",
                "isready",
            ]
        );
        // Black to move, reported from White's point of view
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Move"], json!("d7d6"));
        assert_eq!(rows[0]["Centipawn"], json!(-31));
        assert_eq!(rows[1]["Centipawn"], json!(-40));
    }

    #[test]
    fn test_static_evaluation_resyncs_after_eval() {
        let (mut session, wire) = loaded_session(
            SICILIAN,
            &[
                "NNUE evaluation        +0.12 (white side)",
                "Final evaluation       +0.25 (white side) [with scaled NNUE, ...]",
                "readyok",
            ],
        );

        assert_eq!(session.static_evaluation().unwrap(), Some(0.25));
        assert_eq!(wire.lines(), vec!["eval", "isready"]);
    }

    #[test]
    fn test_static_evaluation_relative_for_black() {
        let (mut session, _wire) = loaded_session(
            SICILIAN,
            &["Final evaluation       +0.25 (white side)", "readyok"],
        );
        session.set_evaluation_perspective(Perspective::Relative);

        assert_eq!(session.static_evaluation().unwrap(), Some(-0.25));
    }

    #[test]
    fn test_static_evaluation_in_check() {
        let (mut session, _wire) = loaded_session(
            "4k3/8/8/8/8/8/8/4R1K1 b - - 0 1",
            &["Final evaluation: none (in check)", "readyok"],
        );
        assert_eq!(session.static_evaluation().unwrap(), None);
    }

    #[test]
    fn test_evaluation_never_sends_movetime_zero() {
        let (mut session, wire) = loaded_session(
            SICILIAN,
            &["info depth 1 score cp 20 pv e7e5", "bestmove e7e5"],
        );

        let evaluation = session.evaluation(0).unwrap();

        assert_eq!(wire.lines(), vec!["go movetime 1"]);
        assert_eq!(evaluation, Evaluation::Centipawns(-20));
    }

    #[test]
    fn test_win_draw_loss_from_side_to_move() {
        let (mut session, _wire) = loaded_session(
            SICILIAN,
            &["info depth 8 score cp 31 wdl 52 921 27 pv d7d6", "bestmove d7d6"],
        );
        assert_eq!(session.win_draw_loss_stats().unwrap(), Some([52, 921, 27]));
    }

    #[test]
    fn test_interrupt_handle_sends_stop() {
        let (session, wire) = loaded_session(SICILIAN, &[]);
        let handle = session.interrupt_handle().unwrap();

        handle.stop().unwrap();

        assert_eq!(wire.lines(), vec!["stop"]);
    }

    #[test]
    fn test_drop_sends_quit() {
        let (session, wire) = loaded_session(SICILIAN, &[]);
        drop(session);
        assert_eq!(wire.lines(), vec!["quit"]);
    }

    #[test]
    fn test_engine_not_found() {
        let config = EngineConfig {
            path: "/nonexistent/path/to/stockfish".to_string(),
            ..EngineConfig::default()
        };
        match StockfishSession::spawn(&config) {
            Err(EngineError::NotFound(path)) => {
                assert_eq!(path, "/nonexistent/path/to/stockfish");
            }
            Err(other) => panic!("Expected NotFound error, got {other}"),
            Ok(_) => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.path, "stockfish");
        assert_eq!(config.depth, 8);
        assert_eq!(config.threads, 1);
        assert_eq!(config.skill_level, 20);
    }

    #[test]
    fn test_parse_final_evaluation() {
        assert_eq!(
            parse_final_evaluation("Final evaluation       +0.25 (white side)"),
            Some(Some(0.25))
        );
        assert_eq!(
            parse_final_evaluation(
                "Final evaluation       -1.37 (white side) [with scaled NNUE, optimism, ...]"
            ),
            Some(Some(-1.37))
        );
        assert_eq!(
            parse_final_evaluation("Final evaluation: none (in check)"),
            Some(None)
        );
        assert_eq!(parse_final_evaluation("NNUE evaluation        +0.12"), None);
        assert_eq!(parse_final_evaluation("Final evaluation garbage"), None);
    }

    fn multipv_search() -> SearchOutput {
        let lines = [
            "info depth 7 multipv 1 score cp 10 pv e2e4",
            "info depth 8 seldepth 11 multipv 1 score cp 31 wdl 52 921 27 nodes 8301 \
             nps 754636 time 11 pv e2e4 e7e5",
            "info depth 8 seldepth 9 multipv 2 score mate -3 wdl 0 0 1000 nodes 8301 \
             nps 754636 time 11 pv d2d4",
            "info depth 9 multipv 2 score cp 80 lowerbound pv g1f3",
        ];
        SearchOutput {
            infos: lines.iter().filter_map(|l| EngineInfo::parse(l)).collect(),
            best_move: Some("e2e4".to_string()),
            ponder: Some("e7e5".to_string()),
        }
    }

    #[test]
    fn test_rows_from_search_keeps_last_exact_line() {
        let rows = rows_from_search(&multipv_search(), 3, Color::White, Perspective::Absolute);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Move"], json!("e2e4"));
        assert_eq!(rows[0]["Centipawn"], json!(31));
        assert_eq!(rows[0]["Mate"], Value::Null);
        assert_eq!(rows[0]["MultiPVLine"], json!(1));
        assert_eq!(rows[0]["SelectiveDepth"], json!(11));
        assert_eq!(rows[0]["WDL"], json!("52 921 27"));

        // The lowerbound line for multipv 2 is ignored
        assert_eq!(rows[1]["Move"], json!("d2d4"));
        assert_eq!(rows[1]["Centipawn"], Value::Null);
        assert_eq!(rows[1]["Mate"], json!(-3));
    }

    #[test]
    fn test_rows_from_search_flips_for_black() {
        let rows = rows_from_search(&multipv_search(), 2, Color::Black, Perspective::Absolute);
        assert_eq!(rows[0]["Centipawn"], json!(-31));
        assert_eq!(rows[1]["Mate"], json!(3));

        let rows = rows_from_search(&multipv_search(), 2, Color::Black, Perspective::Relative);
        assert_eq!(rows[0]["Centipawn"], json!(31));
    }

    #[test]
    fn test_rows_from_search_without_moves() {
        let output = SearchOutput {
            infos: vec![EngineInfo::parse("info depth 0 score mate 0").unwrap()],
            best_move: None,
            ponder: None,
        };
        assert!(rows_from_search(&output, 3, Color::White, Perspective::Absolute).is_empty());
    }
}
