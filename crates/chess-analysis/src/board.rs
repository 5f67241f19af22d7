//! Board-state oracle backing the engine session's validity checks.
//!
//! The UCI protocol has no way to ask an engine whether a FEN or a move is
//! acceptable; feeding it garbage tends to crash the process instead. The
//! session therefore keeps its own copy of the current board and answers
//! validity, legality and capture questions from it.

use cozy_chess::{Board, Color, File, Move, Piece, Square};
use thiserror::Error;

/// Errors produced by board bookkeeping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The FEN failed to parse or describes an impossible position.
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
    /// The move is not in coordinate notation.
    #[error("Malformed move: {0}")]
    MalformedMove(String),
    /// The move is well-formed but not legal in the current position.
    #[error("Illegal move: {0}")]
    IllegalMove(String),
}

/// The current position, with moves exchanged in standard UCI notation.
#[derive(Debug, Clone)]
pub struct BoardState {
    board: Board,
}

impl BoardState {
    /// Parses a FEN, rejecting malformed records and impossible positions.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let board = fen
            .parse::<Board>()
            .map_err(|_| BoardError::InvalidFen(fen.to_string()))?;
        Ok(Self { board })
    }

    /// Whether the FEN would be accepted by [`BoardState::from_fen`].
    pub fn is_valid_fen(fen: &str) -> bool {
        Self::from_fen(fen).is_ok()
    }

    /// The underlying board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    /// The current position as FEN.
    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    /// Resolves a UCI move string to a legal move on this board.
    ///
    /// Castling is accepted in standard notation only (`e1g1`); the
    /// king-takes-rook form (`e1h1`) is rejected as illegal.
    pub fn parse_move(&self, uci: &str) -> Result<Move, BoardError> {
        let mv = uci
            .parse::<Move>()
            .map_err(|_| BoardError::MalformedMove(uci.to_string()))?;

        if self.board.colors(self.board.side_to_move()).has(mv.to) {
            return Err(BoardError::IllegalMove(uci.to_string()));
        }

        let mv = self.castling_move(mv).unwrap_or(mv);
        if self.board.is_legal(mv) {
            Ok(mv)
        } else {
            Err(BoardError::IllegalMove(uci.to_string()))
        }
    }

    /// Whether `uci` is a legal move in the current position.
    pub fn is_legal(&self, uci: &str) -> bool {
        self.parse_move(uci).is_ok()
    }

    /// Whether playing `uci` captures a piece, en passant included.
    pub fn would_capture(&self, uci: &str) -> Result<bool, BoardError> {
        let mv = self.parse_move(uci)?;
        let opponent = !self.board.side_to_move();

        if self.board.colors(opponent).has(mv.to) {
            return Ok(true);
        }

        let en_passant = self.board.piece_on(mv.from) == Some(Piece::Pawn)
            && mv.from.file() != mv.to.file()
            && self.board.piece_on(mv.to).is_none();
        Ok(en_passant)
    }

    /// Plays a legal move.
    pub fn apply(&mut self, uci: &str) -> Result<(), BoardError> {
        let mv = self.parse_move(uci)?;
        self.board.play(mv);
        Ok(())
    }

    /// All legal moves in standard UCI notation.
    pub fn legal_moves(&self) -> Vec<String> {
        let mut moves = Vec::new();
        self.board.generate_moves(|piece_moves| {
            for mv in piece_moves {
                moves.push(self.format_move(mv));
            }
            false
        });
        moves
    }

    /// Translates a standard castling move (king two squares) into the
    /// king-takes-rook encoding used by the board.
    fn castling_move(&self, mv: Move) -> Option<Move> {
        if self.board.piece_on(mv.from) != Some(Piece::King)
            || mv.promotion.is_some()
            || mv.from.rank() != mv.to.rank()
            || mv.from.file() != File::E
        {
            return None;
        }
        let rook_file = match mv.to.file() {
            File::G => File::H,
            File::C => File::A,
            _ => return None,
        };
        Some(Move {
            from: mv.from,
            to: Square::new(rook_file, mv.from.rank()),
            promotion: None,
        })
    }

    fn format_move(&self, mv: Move) -> String {
        let own = self.board.colors(self.board.side_to_move());
        if self.board.piece_on(mv.from) == Some(Piece::King) && own.has(mv.to) {
            let king_file = if mv.to.file() > mv.from.file() {
                File::G
            } else {
                File::C
            };
            let to = Square::new(king_file, mv.from.rank());
            return format!("{}{}", mv.from, to);
        }
        mv.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SICILIAN: &str = "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2";

    #[test]
    fn test_rejects_rank_with_nine_files() {
        assert!(!BoardState::is_valid_fen(
            "3q4/8/1PpPp3/2BP4/p1Pp4/1b2kP1r/1N6/K8 w - - 0 1"
        ));
    }

    #[test]
    fn test_rejects_structurally_broken_fens() {
        for fen in [
            "",
            "not a fen",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNZ w KQkq - 0 1",
        ] {
            assert!(!BoardState::is_valid_fen(fen), "accepted {:?}", fen);
        }
    }

    #[test]
    fn test_accepts_valid_position() {
        let state = BoardState::from_fen(SICILIAN).unwrap();
        assert_eq!(state.side_to_move(), Color::Black);
        assert!(!state.in_check());
    }

    #[test]
    fn test_move_legality_depends_on_position() {
        let state = BoardState::from_fen(SICILIAN).unwrap();
        assert!(state.is_legal("e7e5"));
        // White pawn, but black to move
        assert!(!state.is_legal("a2a1"));
        assert_eq!(
            state.parse_move("xx"),
            Err(BoardError::MalformedMove("xx".to_string()))
        );
    }

    #[test]
    fn test_capture_detection() {
        let state =
            BoardState::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2")
                .unwrap();
        assert!(state.would_capture("e4d5").unwrap());
        assert!(!state.would_capture("e4e5").unwrap());
    }

    #[test]
    fn test_en_passant_counts_as_capture() {
        let state =
            BoardState::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        assert!(state.would_capture("e5f6").unwrap());
    }

    #[test]
    fn test_standard_castling_notation() {
        let mut state =
            BoardState::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        assert!(state.is_legal("e1g1"));
        assert!(state.is_legal("e1c1"));
        assert!(!state.is_legal("e1h1"));
        assert!(!state.would_capture("e1g1").unwrap());

        let moves = state.legal_moves();
        assert!(moves.contains(&"e1g1".to_string()));
        assert!(!moves.contains(&"e1h1".to_string()));

        state.apply("e1g1").unwrap();
        assert_eq!(state.side_to_move(), Color::Black);
        assert!(state.fen().starts_with("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R4RK1 b"));
    }

    #[test]
    fn test_apply_rejects_illegal_move() {
        let mut state = BoardState::from_fen(SICILIAN).unwrap();
        assert!(state.apply("e2e4").is_err());
        state.apply("d7d6").unwrap();
        assert_eq!(state.side_to_move(), Color::White);
    }
}
