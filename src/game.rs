//////////////////////////
// game.rs
//////////////////////////

use log::debug;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::piece::Piece;
use crate::simulate::exposes_king;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingState {
    pub position: Position,
    pub checked: bool,
}

/// Cached king squares, written only by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingTracking {
    pub white: KingState,
    pub black: KingState,
}

impl KingTracking {
    pub fn get(&self, color: Color) -> &KingState {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    fn get_mut(&mut self, color: Color) -> &mut KingState {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    Idle,
    /// A pawn reached the last rank; the turn ends once a piece is chosen.
    AwaitingPromotion { position: Position, color: Color },
}

/// What a click means for the current selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickResolution {
    Execute(Move),
    Select { from: Position, moves: Vec<Move> },
    NoSelection,
    InvalidMove,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameController {
    current_player: Color,
    check: bool,
    kings: KingTracking,
    last_move: Option<LastMove>,
    phase: TurnPhase,
}

impl Default for GameController {
    fn default() -> Self {
        GameController::new()
    }
}

impl GameController {
    pub fn new() -> Self {
        GameController {
            current_player: Color::White,
            check: false,
            kings: KingTracking {
                white: KingState { position: home_king(Color::White), checked: false },
                black: KingState { position: home_king(Color::Black), checked: false },
            },
            last_move: None,
            phase: TurnPhase::Idle,
        }
    }

    /// Controller for an arbitrary setup with `to_move` on turn.
    pub fn from_board(board: &Board, to_move: Color) -> Result<Self, ChessError> {
        board.validate()?;
        let locate = |color| {
            board
                .find_king(color)
                .ok_or_else(|| ChessError::Corrupt(format!("{color} king missing")))
        };
        let mut controller = GameController {
            current_player: to_move,
            check: false,
            kings: KingTracking {
                white: KingState { position: locate(Color::White)?, checked: false },
                black: KingState { position: locate(Color::Black)?, checked: false },
            },
            last_move: None,
            phase: TurnPhase::Idle,
        };
        controller.refresh_check(board);
        Ok(controller)
    }

    pub fn reset(&mut self) {
        *self = GameController::new();
    }

    pub fn current_player(&self) -> Color {
        self.current_player
    }

    pub fn check(&self) -> bool {
        self.check
    }

    pub fn kings(&self) -> &KingTracking {
        &self.kings
    }

    pub fn last_move(&self) -> Option<&LastMove> {
        self.last_move.as_ref()
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Is the current player's king attacked on `board`?
    pub fn is_check(&self, board: &Board) -> bool {
        let king = self.kings.get(self.current_player).position;
        board.is_defended_by(king, self.current_player.opposite())
    }

    /// Moves of the piece on `from` that do not leave its own king attacked.
    pub fn legal_moves(&self, board: &Board, from: Position) -> Vec<Move> {
        match board.get(from) {
            Some(piece) => self.legal_moves_of(board, piece),
            None => Vec::new(),
        }
    }

    fn legal_moves_of(&self, board: &Board, piece: &Piece) -> Vec<Move> {
        let king = self.kings.get(piece.color).position;
        let mut candidates = piece.valid_moves(board, false);
        candidates.extend(piece.en_passant(self.last_move.as_ref()));
        candidates.retain(|mv| !exposes_king(board, mv, piece.color, king));
        candidates
    }

    pub fn any_valid_moves(&self, board: &Board) -> bool {
        board
            .pieces_of(self.current_player)
            .any(|piece| !self.legal_moves_of(board, piece).is_empty())
    }

    /// Two-phase click handling: a click on a cached target executes it,
    /// otherwise it tries to select the clicked piece.
    pub fn handle_click(&self, board: &Board, at: Position, cached: &[Move]) -> ClickResolution {
        if let Some(mv) = cached.iter().find(|mv| mv.to == at) {
            return ClickResolution::Execute(*mv);
        }

        if let Some(piece) = board.get(at).filter(|p| p.color == self.current_player) {
            let moves = self.legal_moves_of(board, piece);
            if !moves.is_empty() {
                debug!("{} selects {:?} on {} ({} moves)", piece.color, piece.kind, at, moves.len());
                return ClickResolution::Select { from: at, moves };
            }
        }

        if cached.is_empty() {
            ClickResolution::NoSelection
        } else {
            ClickResolution::InvalidMove
        }
    }

    /// Plays `mv` on the live board.
    ///
    /// A pawn reaching the last rank leaves the turn open and returns
    /// `PromotionPending`; everything else switches the player and classifies
    /// the position for the side now to move.
    pub fn handle_move(&mut self, board: &mut Board, mv: &Move) -> MoveOutcome {
        let Some(&mover) = board.get(mv.from) else {
            panic!("no piece on {} to play {}", mv.from, mv);
        };
        let captured = board.apply(mv);
        debug!("{} plays {}", mover.color, mv);

        if mover.kind == PieceType::King {
            self.kings.get_mut(mover.color).position = mv.to;
        }
        if let Some(&moved) = board.get(mv.to) {
            self.last_move = Some(LastMove { piece: moved, from: mv.from });
        }

        if mover.kind == PieceType::Pawn && mv.to.rank() == mover.color.promotion_rank() {
            self.phase = TurnPhase::AwaitingPromotion { position: mv.to, color: mover.color };
            return MoveOutcome::PromotionPending;
        }

        let own = if mv.is_castle() {
            MoveOutcome::Castle
        } else if captured.is_some() {
            MoveOutcome::Capture
        } else {
            MoveOutcome::Move
        };
        self.finish_turn(board, own)
    }

    /// Completes a pending promotion by replacing the pawn with `kind`.
    pub fn promote(&mut self, board: &mut Board, kind: PieceType) -> Result<MoveOutcome, ChessError> {
        let TurnPhase::AwaitingPromotion { position, color } = self.phase else {
            return Err(ChessError::NoPromotionPending);
        };
        if !kind.is_promotion_choice() {
            return Err(ChessError::InvalidPromotion(kind));
        }

        let Some(mut pawn) = board.get(position).copied() else {
            panic!("promotion square {} is empty", position);
        };
        pawn.kind = kind;
        board.place(pawn);
        if let Some(last) = self.last_move.as_mut() {
            last.piece = pawn;
        }
        debug!("{} promotes on {} to {:?}", color, position, kind);

        self.phase = TurnPhase::Idle;
        Ok(self.finish_turn(board, MoveOutcome::Promoted))
    }

    fn finish_turn(&mut self, board: &Board, own: MoveOutcome) -> MoveOutcome {
        self.kings.get_mut(self.current_player).checked = false;
        self.current_player = self.current_player.opposite();
        self.assert_king_tracked(board);
        self.refresh_check(board);

        match (self.check, self.any_valid_moves(board)) {
            (true, false) => MoveOutcome::Checkmate,
            (false, false) => MoveOutcome::Stalemate,
            (true, true) => MoveOutcome::Check,
            (false, true) => own,
        }
    }

    fn refresh_check(&mut self, board: &Board) {
        self.check = self.is_check(board);
        let player = self.current_player;
        self.kings.get_mut(player).checked = self.check;
    }

    fn assert_king_tracked(&self, board: &Board) {
        for color in [Color::White, Color::Black] {
            let at = self.kings.get(color).position;
            assert!(
                matches!(board.get(at), Some(p) if p.kind == PieceType::King && p.color == color),
                "{} king is not on its tracked square {}",
                color,
                at
            );
        }
    }

    /// Cross-checks the cached king squares against `board`.
    pub fn verify(&self, board: &Board) -> Result<(), ChessError> {
        for color in [Color::White, Color::Black] {
            let at = self.kings.get(color).position;
            if board.find_king(color) != Some(at) {
                return Err(ChessError::Corrupt(format!("{color} king is not on {at}")));
            }
        }
        if let TurnPhase::AwaitingPromotion { position, color } = self.phase {
            match board.get(position) {
                Some(p) if p.kind == PieceType::Pawn && p.color == color => {}
                _ => {
                    return Err(ChessError::Corrupt(format!(
                        "no {color} pawn waiting on {position}"
                    )))
                }
            }
        }
        Ok(())
    }
}

fn home_king(color: Color) -> Position {
    match Position::new(4, color.back_rank()) {
        Some(at) => at,
        None => unreachable!("back rank is on the board"),
    }
}
