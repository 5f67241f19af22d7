//! UCI commands sent from the GUI side to an engine.

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// Tell the engine the next position belongs to a new game.
    UciNewGame,
    /// Set an engine option.
    SetOption {
        name: String,
        value: Option<String>,
    },
    /// Set up position.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Start calculating.
    Go(GoOptions),
    /// Print the static evaluation of the current position (Stockfish extension).
    Eval,
    /// Stop calculating.
    Stop,
    /// Quit the engine.
    Quit,
}

/// Options for the `go` command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoOptions {
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search to this depth.
    pub depth: Option<u32>,
}

impl GoOptions {
    /// Search to a fixed depth.
    pub fn depth(depth: u32) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }

    /// Search for a fixed number of milliseconds.
    pub fn movetime(ms: u64) -> Self {
        Self {
            movetime: Some(ms),
            ..Self::default()
        }
    }
}

impl GuiCommand {
    /// Format the command as a single UCI line (without trailing newline).
    pub fn to_uci(&self) -> String {
        match self {
            GuiCommand::Uci => "uci".to_string(),
            GuiCommand::IsReady => "isready".to_string(),
            GuiCommand::UciNewGame => "ucinewgame".to_string(),
            GuiCommand::SetOption { name, value } => match value {
                Some(v) => format!("setoption name {} value {}", name, v),
                None => format!("setoption name {}", name),
            },
            GuiCommand::Position { fen, moves } => {
                let mut line = match fen {
                    Some(f) => format!("position fen {}", f),
                    None => "position startpos".to_string(),
                };
                if !moves.is_empty() {
                    line.push_str(" moves ");
                    line.push_str(&moves.join(" "));
                }
                line
            }
            GuiCommand::Go(opts) => {
                let mut parts = vec!["go".to_string()];
                if let Some(ms) = opts.movetime {
                    parts.push(format!("movetime {}", ms));
                }
                if let Some(d) = opts.depth {
                    parts.push(format!("depth {}", d));
                }
                parts.join(" ")
            }
            GuiCommand::Eval => "eval".to_string(),
            GuiCommand::Stop => "stop".to_string(),
            GuiCommand::Quit => "quit".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_simple_commands() {
        assert_eq!(GuiCommand::Uci.to_uci(), "uci");
        assert_eq!(GuiCommand::IsReady.to_uci(), "isready");
        assert_eq!(GuiCommand::UciNewGame.to_uci(), "ucinewgame");
        assert_eq!(GuiCommand::Eval.to_uci(), "eval");
        assert_eq!(GuiCommand::Stop.to_uci(), "stop");
    }

    #[test]
    fn format_position_fen_with_moves() {
        let cmd = GuiCommand::Position {
            fen: Some("8/8/8/8/8/8/8/K6k w - - 0 1".to_string()),
            moves: vec!["a1a2".to_string(), "h1h2".to_string()],
        };
        assert_eq!(
            cmd.to_uci(),
            "position fen 8/8/8/8/8/8/8/K6k w - - 0 1 moves a1a2 h1h2"
        );
    }

    #[test]
    fn format_position_without_moves() {
        let cmd = GuiCommand::Position {
            fen: None,
            moves: Vec::new(),
        };
        assert_eq!(cmd.to_uci(), "position startpos");
    }

    #[test]
    fn format_go_and_setoption() {
        assert_eq!(GuiCommand::Go(GoOptions::depth(8)).to_uci(), "go depth 8");
        assert_eq!(GuiCommand::Go(GoOptions::movetime(3000)).to_uci(), "go movetime 3000");
        let opt = GuiCommand::SetOption {
            name: "Skill Level".to_string(),
            value: Some("20".to_string()),
        };
        assert_eq!(opt.to_uci(), "setoption name Skill Level value 20");
        let button = GuiCommand::SetOption {
            name: "Clear Hash".to_string(),
            value: None,
        };
        assert_eq!(button.to_uci(), "setoption name Clear Hash");
    }
}
