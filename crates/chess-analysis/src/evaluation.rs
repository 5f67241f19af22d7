//! Chess position evaluation types.

use cozy_chess::Color;
use serde::{Deserialize, Serialize};

/// Represents a chess position evaluation.
///
/// Evaluations can be either centipawn scores (for normal positions)
/// or mate scores (when a forced mate is found). Serialized as
/// `{"type": "cp", "value": 35}` or `{"type": "mate", "value": -2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Evaluation {
    /// Centipawn evaluation
    #[serde(rename = "cp")]
    Centipawns(i32),
    /// Mate in N moves
    #[serde(rename = "mate")]
    Mate(i32),
}

/// Point of view that engine scores are reported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    /// Positive scores favor White regardless of who is to move.
    #[default]
    Absolute,
    /// Positive scores favor the side to move (raw UCI convention).
    Relative,
}

impl Perspective {
    /// Whether a side-to-move relative score must be negated to match this
    /// perspective.
    pub fn flips(self, side_to_move: Color) -> bool {
        self == Perspective::Absolute && side_to_move == Color::Black
    }
}

impl Evaluation {
    /// Converts a raw UCI score (side to move's view) into the requested perspective.
    pub fn from_engine_score(
        score: uci::Score,
        side_to_move: Color,
        perspective: Perspective,
    ) -> Self {
        let eval = match score {
            uci::Score::Cp(cp) => Evaluation::Centipawns(cp),
            uci::Score::Mate(m) => Evaluation::Mate(m),
        };
        if perspective.flips(side_to_move) {
            eval.flip()
        } else {
            eval
        }
    }

    /// Negates the evaluation (switches point of view).
    pub fn flip(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(-cp),
            Evaluation::Mate(m) => Evaluation::Mate(-m),
        }
    }

    /// Centipawn value, if this is not a mate score.
    pub fn centipawns(&self) -> Option<i32> {
        match self {
            Evaluation::Centipawns(cp) => Some(*cp),
            Evaluation::Mate(_) => None,
        }
    }

    /// Mate distance, if this is a mate score.
    pub fn mate(&self) -> Option<i32> {
        match self {
            Evaluation::Centipawns(_) => None,
            Evaluation::Mate(m) => Some(*m),
        }
    }
}
