//! UCI (Universal Chess Interface) protocol library.
//!
//! This crate provides types and parsing for the UCI protocol used by chess engines,
//! seen from the GUI side: commands are formatted for the engine, engine output is
//! parsed back into typed messages.
//!
//! # Commands used
//!
//! - `uci` / `uciok` - Initialize engine, get id and options
//! - `isready` / `readyok` - Synchronization
//! - `setoption name <name> [value <value>]` - Configure the engine
//! - `ucinewgame` - Reset engine state between unrelated positions
//! - `position fen <fen> [moves <move>...]` - Set position
//! - `go [movetime <ms>] [depth <d>]` - Start search
//! - `eval` - Static evaluation (Stockfish extension)
//! - `stop` - End a running search early
//! - `quit` - Exit engine

mod client;
mod command;
mod info;

pub use client::{SearchOutput, StopHandle, UciClient, MAX_SEARCH_LINES, MAX_UCI_LINES};
pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, Score, ScoreBound, Wdl};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UciError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Engine closed the connection")]
    Disconnected,
    #[error("No '{expected}' after {lines} lines")]
    TooManyLines { expected: &'static str, lines: usize },
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification.
    Id {
        name: Option<String>,
        author: Option<String>,
    },
    /// An option the engine supports (only the name is kept).
    Option { name: String },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Best move found; `None` when the position has no legal moves.
    BestMove {
        mv: Option<String>,
        ponder: Option<String>,
    },
}

impl EngineMessage {
    /// Parse a line of engine output. Returns `None` for lines that are not
    /// UCI messages (banners, `eval` tables).
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.first().copied()? {
            "uciok" => Some(EngineMessage::UciOk),
            "readyok" => Some(EngineMessage::ReadyOk),
            "id" => match tokens.get(1).copied() {
                Some("name") => Some(EngineMessage::Id {
                    name: Some(tokens[2..].join(" ")),
                    author: None,
                }),
                Some("author") => Some(EngineMessage::Id {
                    name: None,
                    author: Some(tokens[2..].join(" ")),
                }),
                _ => None,
            },
            "option" => {
                if tokens.get(1) != Some(&"name") {
                    return None;
                }
                let end = tokens
                    .iter()
                    .position(|&t| t == "type")
                    .unwrap_or(tokens.len());
                let name = tokens[2..end].join(" ");
                (!name.is_empty()).then_some(EngineMessage::Option { name })
            }
            "bestmove" => {
                let mv = tokens
                    .get(1)
                    .filter(|&&m| m != "(none)" && m != "0000")
                    .map(|m| m.to_string());
                let ponder = match (tokens.get(2), tokens.get(3)) {
                    (Some(&"ponder"), Some(p)) => Some(p.to_string()),
                    _ => None,
                };
                Some(EngineMessage::BestMove { mv, ponder })
            }
            "info" => EngineInfo::parse(line).map(EngineMessage::Info),
            _ => None,
        }
    }
}
