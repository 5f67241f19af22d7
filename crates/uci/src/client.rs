//! Synchronous UCI client for driving an engine over any reader/writer pair.
//!
//! The client is I/O agnostic: a child process's stdout/stdin work the same as
//! an in-memory transcript, which keeps engine wrappers testable without a
//! real engine binary.
//!
//! # Example
//!
//! ```no_run
//! use std::io::BufReader;
//! use std::process::{Command, Stdio};
//! use uci::{GoOptions, GuiCommand, UciClient};
//!
//! let mut child = Command::new("stockfish")
//!     .stdin(Stdio::piped())
//!     .stdout(Stdio::piped())
//!     .spawn()?;
//! let stdout = BufReader::new(child.stdout.take().unwrap());
//! let stdin = child.stdin.take().unwrap();
//!
//! let mut client = UciClient::new(stdout, stdin);
//! client.handshake()?;
//! client.send(&GuiCommand::Position { fen: None, moves: vec![] })?;
//! let output = client.search(&GoOptions::depth(10))?;
//! println!("Best move: {:?}", output.best_move);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{EngineInfo, EngineMessage, GoOptions, GuiCommand, UciError};

/// Maximum number of lines to read before giving up on a handshake response.
pub const MAX_UCI_LINES: usize = 1000;

/// Maximum number of lines to read before giving up on a `bestmove`.
pub const MAX_SEARCH_LINES: usize = 100_000;

/// Everything an engine reported during one `go` command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutput {
    /// All `info` lines in arrival order.
    pub infos: Vec<EngineInfo>,
    /// Best move; `None` for `bestmove (none)` (mate or stalemate).
    pub best_move: Option<String>,
    /// Suggested ponder move.
    pub ponder: Option<String>,
}

impl SearchOutput {
    /// The last info line for the given multipv line carrying a score.
    pub fn last_scored(&self, line: u32) -> Option<&EngineInfo> {
        self.infos
            .iter()
            .rev()
            .find(|info| info.line() == line && info.score.is_some() && info.bound.is_none())
    }
}

/// A client for communicating with a UCI-compatible chess engine.
///
/// # Lifecycle
///
/// 1. Wrap the engine's output/input with [`UciClient::new`]
/// 2. Perform the handshake with [`UciClient::handshake`]
/// 3. Send commands with [`UciClient::send`] and collect searches with [`UciClient::search`]
///
/// The writer is shared with any [`StopHandle`] taken from the client, so a
/// search blocked in [`UciClient::search`] can be ended from another thread.
pub struct UciClient<R: BufRead, W: Write> {
    reader: R,
    writer: Arc<Mutex<W>>,
    /// The engine's name as reported during UCI initialization.
    name: String,
    /// Option names advertised during the handshake.
    options: Vec<String>,
}

impl<R: BufRead, W: Write> UciClient<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer: Arc::new(Mutex::new(writer)),
            name: String::new(),
            options: Vec::new(),
        }
    }

    /// Returns the engine's name, empty until the handshake completes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the engine advertised an option with this name (case-insensitive,
    /// like the protocol).
    pub fn supports_option(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.eq_ignore_ascii_case(name))
    }

    /// A handle that can send `stop` while this client is blocked in a search.
    pub fn stop_handle(&self) -> StopHandle<W> {
        StopHandle {
            writer: Arc::clone(&self.writer),
        }
    }

    /// Sends a command followed by a newline and flushes.
    pub fn send(&mut self, command: &GuiCommand) -> Result<(), UciError> {
        write_command(&self.writer, command)
    }

    /// Reads one trimmed line. End of stream is an error: engines never close
    /// their output while a command is pending.
    pub fn read_line(&mut self) -> Result<String, UciError> {
        let mut line = String::new();
        let bytes = self.reader.read_line(&mut line)?;
        if bytes == 0 {
            return Err(UciError::Disconnected);
        }
        let line = line.trim().to_string();
        tracing::trace!("UCI << {}", line);
        Ok(line)
    }

    /// Sends `uci`, records the id and options until `uciok`, then synchronizes.
    pub fn handshake(&mut self) -> Result<(), UciError> {
        self.send(&GuiCommand::Uci)?;

        let mut lines_read = 0;
        loop {
            if lines_read >= MAX_UCI_LINES {
                return Err(UciError::TooManyLines {
                    expected: "uciok",
                    lines: lines_read,
                });
            }
            lines_read += 1;
            match EngineMessage::parse(&self.read_line()?) {
                Some(EngineMessage::Id {
                    name: Some(name), ..
                }) => self.name = name,
                Some(EngineMessage::Option { name }) => self.options.push(name),
                Some(EngineMessage::UciOk) => break,
                _ => {}
            }
        }

        if self.name.is_empty() {
            self.name = "Unknown Engine".to_string();
        }
        tracing::debug!(
            engine = %self.name,
            options = self.options.len(),
            "UCI handshake complete"
        );

        self.sync()
    }

    /// Sends `isready` and discards everything up to `readyok`.
    pub fn sync(&mut self) -> Result<(), UciError> {
        self.send(&GuiCommand::IsReady)?;
        self.read_until(MAX_UCI_LINES, "readyok", |line| line == "readyok")?;
        Ok(())
    }

    /// Sets an option and waits until the engine has applied it.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), UciError> {
        self.send(&GuiCommand::SetOption {
            name: name.to_string(),
            value: Some(value.to_string()),
        })?;
        self.sync()
    }

    /// Reads lines until `matches` accepts one, returning that line.
    pub fn read_until(
        &mut self,
        max_lines: usize,
        expected: &'static str,
        mut matches: impl FnMut(&str) -> bool,
    ) -> Result<String, UciError> {
        for _ in 0..max_lines {
            let line = self.read_line()?;
            if matches(&line) {
                return Ok(line);
            }
        }
        Err(UciError::TooManyLines {
            expected,
            lines: max_lines,
        })
    }

    /// Runs `go` with the given options and collects output until `bestmove`.
    pub fn search(&mut self, options: &GoOptions) -> Result<SearchOutput, UciError> {
        self.send(&GuiCommand::Go(options.clone()))?;

        let mut output = SearchOutput::default();
        for _ in 0..MAX_SEARCH_LINES {
            match EngineMessage::parse(&self.read_line()?) {
                Some(EngineMessage::Info(info)) => output.infos.push(info),
                Some(EngineMessage::BestMove { mv, ponder }) => {
                    output.best_move = mv;
                    output.ponder = ponder;
                    return Ok(output);
                }
                _ => {}
            }
        }

        Err(UciError::TooManyLines {
            expected: "bestmove",
            lines: MAX_SEARCH_LINES,
        })
    }

    /// Asks the engine to exit. The caller owns the process and reaps it.
    pub fn quit(&mut self) -> Result<(), UciError> {
        self.send(&GuiCommand::Quit)
    }
}

/// Ends a running search from another thread.
///
/// The engine answers `stop` with its `bestmove`, which the blocked
/// [`UciClient::search`] reads as usual. An idle engine ignores it.
pub struct StopHandle<W: Write> {
    writer: Arc<Mutex<W>>,
}

impl<W: Write> Clone for StopHandle<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
        }
    }
}

impl<W: Write> StopHandle<W> {
    pub fn stop(&self) -> Result<(), UciError> {
        write_command(&self.writer, &GuiCommand::Stop)
    }
}

/// Writes one command line in a single write so concurrent senders never interleave.
fn write_command<W: Write>(writer: &Mutex<W>, command: &GuiCommand) -> Result<(), UciError> {
    let line = command.to_uci();
    tracing::trace!("UCI >> {}", line);
    let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
    writer.write_all(format!("{}\n", line).as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Score;
    use std::io::Cursor;

    /// Builds a client whose engine side replays `transcript`.
    fn scripted(transcript: &[&str]) -> UciClient<Cursor<Vec<u8>>, Vec<u8>> {
        let mut text = transcript.join("\n");
        text.push('\n');
        UciClient::new(Cursor::new(text.into_bytes()), Vec::new())
    }

    fn sent_lines(client: &UciClient<Cursor<Vec<u8>>, Vec<u8>>) -> Vec<String> {
        let written = client.writer.lock().unwrap();
        String::from_utf8_lossy(&written)
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_handshake_records_name_and_options() {
        let mut client = scripted(&[
            "Stockfish 16.1 by the Stockfish developers",
            "id name Stockfish 16.1",
            "id author the Stockfish developers",
            "option name Threads type spin default 1 min 1 max 1024",
            "option name UCI_ShowWDL type check default false",
            "uciok",
            "readyok",
        ]);

        client.handshake().unwrap();

        assert_eq!(client.name(), "Stockfish 16.1");
        assert!(client.supports_option("uci_showwdl"));
        assert!(!client.supports_option("Ponder"));
        assert_eq!(sent_lines(&client), vec!["uci", "isready"]);
    }

    #[test]
    fn test_handshake_without_name_uses_placeholder() {
        let mut client = scripted(&["uciok", "readyok"]);
        client.handshake().unwrap();
        assert_eq!(client.name(), "Unknown Engine");
    }

    #[test]
    fn test_handshake_fails_when_engine_exits() {
        let mut client = scripted(&["id name Broken"]);
        assert!(matches!(client.handshake(), Err(UciError::Disconnected)));
    }

    #[test]
    fn test_search_collects_infos_until_bestmove() {
        let mut client = scripted(&[
            "info depth 1 score cp 20 pv e2e4",
            "info depth 2 score cp 35 pv d2d4 d7d5",
            "bestmove d2d4 ponder d7d5",
            "readyok",
        ]);

        let output = client.search(&GoOptions::depth(2)).unwrap();

        assert_eq!(output.infos.len(), 2);
        assert_eq!(output.best_move.as_deref(), Some("d2d4"));
        assert_eq!(output.ponder.as_deref(), Some("d7d5"));
        assert_eq!(
            output.last_scored(1).and_then(|i| i.score),
            Some(Score::Cp(35))
        );
        assert_eq!(sent_lines(&client), vec!["go depth 2"]);
    }

    #[test]
    fn test_search_without_legal_moves() {
        let mut client = scripted(&["info depth 0 score mate 0", "bestmove (none)"]);

        let output = client.search(&GoOptions::depth(8)).unwrap();

        assert_eq!(output.best_move, None);
        assert_eq!(
            output.last_scored(1).and_then(|i| i.score),
            Some(Score::Mate(0))
        );
    }

    #[test]
    fn test_last_scored_skips_bounds() {
        let output = SearchOutput {
            infos: vec![
                EngineInfo::parse("info depth 5 score cp 10 pv e2e4").unwrap(),
                EngineInfo::parse("info depth 6 score cp 60 upperbound pv e2e4").unwrap(),
            ],
            best_move: Some("e2e4".to_string()),
            ponder: None,
        };
        assert_eq!(
            output.last_scored(1).and_then(|i| i.score),
            Some(Score::Cp(10))
        );
    }

    #[test]
    fn test_set_option_waits_for_readyok() {
        let mut client = scripted(&["readyok"]);
        client.set_option("MultiPV", "3").unwrap();
        assert_eq!(
            sent_lines(&client),
            vec!["setoption name MultiPV value 3", "isready"]
        );
    }

    #[test]
    fn test_stop_handle_shares_the_writer() {
        let mut client = scripted(&["bestmove e2e4"]);
        let handle = client.stop_handle();

        client.search(&GoOptions::movetime(60_000)).unwrap();
        let from_thread = handle.clone();
        std::thread::spawn(move || from_thread.stop().unwrap())
            .join()
            .unwrap();

        assert_eq!(sent_lines(&client), vec!["go movetime 60000", "stop"]);
    }

    #[test]
    fn test_read_until_gives_up() {
        let transcript: Vec<String> = (0..5).map(|i| format!("noise {}", i)).collect();
        let lines: Vec<&str> = transcript.iter().map(String::as_str).collect();
        let mut client = scripted(&lines);
        let err = client.read_until(3, "readyok", |l| l == "readyok").unwrap_err();
        assert!(matches!(
            err,
            UciError::TooManyLines {
                expected: "readyok",
                lines: 3
            }
        ));
    }
}
