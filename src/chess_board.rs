//////////////////////////
// chess_board.rs
//////////////////////////

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::board::Board;
use crate::game::{ClickResolution, GameController, TurnPhase};
use crate::history::{History, HistoryEntry, MoveRecord};
use crate::storage::{SaveStore, SavedGame};
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    Repetition,
    Surrender,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatus {
    pub game_over: bool,
    pub winner: Option<Color>,
    pub reason: Option<GameOverReason>,
    pub info: String,
}

impl Default for GameStatus {
    fn default() -> Self {
        GameStatus {
            game_over: false,
            winner: None,
            reason: None,
            info: turn_info(Color::White),
        }
    }
}

fn turn_info(player: Color) -> String {
    format!("{}'s turn", player)
}

/// Why a click did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ignored {
    OutOfBounds,
    NoSelection,
    InvalidMove,
    ViewingHistory,
    GameOver,
    AwaitingPromotion,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A piece was picked up; `targets` are the squares to highlight.
    Selected { from: Position, targets: Vec<Position> },
    Moved(MoveOutcome),
    Ignored(Ignored),
}

/// One game: the live board, its controller and the move log.
pub struct ChessBoard {
    board: Board,
    controller: GameController,
    history: History,
    status: GameStatus,
    pending: Option<MoveRecord>,
    valid_moves: Vec<Move>,
    selected: Option<Position>,
    store: Option<Arc<SaveStore>>,
    autosave: bool,
}

impl Default for ChessBoard {
    fn default() -> Self {
        ChessBoard::new()
    }
}

impl ChessBoard {
    /// A standard game kept in memory only.
    pub fn new() -> Self {
        Self::fresh(Board::standard(), GameController::new(), None)
    }

    /// Resumes the game saved in `store`, or starts a new one if that fails.
    pub fn open(store: Arc<SaveStore>) -> Self {
        match store.load() {
            Ok(saved) => Self::from_saved(saved, Some(store)),
            Err(e) => {
                warn!("could not restore {}: {}; starting a new game", store.path().display(), e);
                Self::fresh(Board::standard(), GameController::new(), Some(store))
            }
        }
    }

    /// Starts from a custom setup with `to_move` on turn.
    pub fn with_position(board: Board, to_move: Color, store: Option<Arc<SaveStore>>) -> Result<Self, ChessError> {
        let controller = GameController::from_board(&board, to_move)?;
        let mut game = Self::fresh(board, controller, store);
        game.refresh_info();
        Ok(game)
    }

    pub fn from_saved(saved: SavedGame, store: Option<Arc<SaveStore>>) -> Self {
        ChessBoard {
            board: saved.board,
            controller: saved.controller,
            history: saved.history,
            status: saved.status,
            pending: saved.pending,
            valid_moves: Vec::new(),
            selected: None,
            store,
            autosave: true,
        }
    }

    fn fresh(board: Board, controller: GameController, store: Option<Arc<SaveStore>>) -> Self {
        let history = History::new(HistoryEntry {
            board: board.clone(),
            controller: controller.clone(),
            played: None,
        });
        ChessBoard {
            board,
            controller,
            history,
            status: GameStatus::default(),
            pending: None,
            valid_moves: Vec::new(),
            selected: None,
            store,
            autosave: true,
        }
    }

    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    pub fn current_player(&self) -> Color {
        self.controller.current_player()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_viewing_history(&self) -> bool {
        !self.history.at_tip()
    }

    pub fn valid_moves(&self) -> &[Move] {
        &self.valid_moves
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn game_over(&self) -> bool {
        self.status.game_over
    }

    pub fn winner(&self) -> Option<Color> {
        self.status.winner
    }

    pub fn info(&self) -> &str {
        &self.status.info
    }

    pub fn pending_promotion(&self) -> Option<(Position, Color)> {
        match self.controller.phase() {
            TurnPhase::AwaitingPromotion { position, color } => Some((position, color)),
            TurnPhase::Idle => None,
        }
    }

    /// Handles a click on board square `(x, y)`.
    pub fn handle_click(&mut self, x: i32, y: i32) -> ClickOutcome {
        let Some(at) = Position::from_coords(x, y) else {
            return ClickOutcome::Ignored(Ignored::OutOfBounds);
        };
        if self.status.game_over {
            return ClickOutcome::Ignored(Ignored::GameOver);
        }
        if !self.history.at_tip() {
            return ClickOutcome::Ignored(Ignored::ViewingHistory);
        }
        if self.pending_promotion().is_some() {
            return ClickOutcome::Ignored(Ignored::AwaitingPromotion);
        }

        let cached = std::mem::take(&mut self.valid_moves);
        self.selected = None;
        match self.controller.handle_click(&self.board, at, &cached) {
            ClickResolution::Select { from, moves } => {
                let targets = moves.iter().map(|mv| mv.to).collect();
                self.valid_moves = moves;
                self.selected = Some(from);
                ClickOutcome::Selected { from, targets }
            }
            ClickResolution::Execute(mv) => ClickOutcome::Moved(self.execute(mv)),
            ClickResolution::NoSelection => ClickOutcome::Ignored(Ignored::NoSelection),
            ClickResolution::InvalidMove => ClickOutcome::Ignored(Ignored::InvalidMove),
        }
    }

    fn execute(&mut self, mv: Move) -> MoveOutcome {
        let Some(&mover) = self.board.get(mv.from) else {
            panic!("selected move {} has no piece behind it", mv);
        };
        let captured = if mv.is_castle() {
            None
        } else {
            self.board.get(mv.capture_square()).map(|p| p.kind)
        };

        let outcome = self.controller.handle_move(&mut self.board, &mv);
        let record = MoveRecord {
            piece: mover.kind,
            color: mover.color,
            mv,
            captured,
            promotion: None,
            outcome,
        };

        if outcome == MoveOutcome::PromotionPending {
            self.pending = Some(record);
            self.status.info = "Choose a promotion piece".into();
            return outcome;
        }
        self.complete_turn(record)
    }

    /// Finishes a pending promotion with `kind`.
    pub fn promote(&mut self, kind: PieceType) -> Result<MoveOutcome, ChessError> {
        if self.status.game_over {
            return Err(ChessError::GameOver);
        }
        if self.pending.is_none() {
            return Err(ChessError::NoPromotionPending);
        }
        let outcome = self.controller.promote(&mut self.board, kind)?;
        let Some(mut record) = self.pending.take() else {
            return Err(ChessError::NoPromotionPending);
        };
        record.promotion = Some(kind);
        record.outcome = outcome;
        Ok(self.complete_turn(record))
    }

    fn complete_turn(&mut self, mut record: MoveRecord) -> MoveOutcome {
        let to_move = self.controller.current_player();
        match record.outcome {
            MoveOutcome::Checkmate => {
                self.end_game(Some(to_move.opposite()), GameOverReason::Checkmate, "Checkmate!")
            }
            MoveOutcome::Stalemate => self.end_game(None, GameOverReason::Stalemate, "Stalemate!"),
            _ => self.refresh_info(),
        }

        let played = record.clone();
        self.history.push(HistoryEntry {
            board: self.board.clone(),
            controller: self.controller.clone(),
            played: Some(played),
        });

        if !self.status.game_over {
            let draw = if self.board.is_insufficient_material() {
                Some(GameOverReason::InsufficientMaterial)
            } else if self.history.is_repetition() {
                Some(GameOverReason::Repetition)
            } else {
                None
            };
            if let Some(reason) = draw {
                self.end_game(None, reason, "Draw!");
                record.outcome = MoveOutcome::Draw;
                if let Some(tip) = self.history.last_mut().played.as_mut() {
                    tip.outcome = MoveOutcome::Draw;
                }
            }
        }

        self.persist();
        record.outcome
    }

    fn end_game(&mut self, winner: Option<Color>, reason: GameOverReason, info: &str) {
        info!("game over: {:?}, winner {:?}", reason, winner);
        self.valid_moves.clear();
        self.selected = None;
        self.status = GameStatus {
            game_over: true,
            winner,
            reason: Some(reason),
            info: info.to_string(),
        };
    }

    fn refresh_info(&mut self) {
        if self.status.game_over {
            return;
        }
        self.status.info = if self.controller.check() {
            "Check!".to_string()
        } else {
            turn_info(self.controller.current_player())
        };
    }

    /// The player on turn gives up; the opponent wins. `false` if the game
    /// was already over.
    pub fn handle_surrender(&mut self) -> bool {
        if self.status.game_over {
            return false;
        }
        if !self.history.at_tip() {
            self.last_move();
        }
        let loser = self.controller.current_player();
        self.end_game(Some(loser.opposite()), GameOverReason::Surrender, "Surrendered!");
        self.persist();
        true
    }

    pub fn first_move(&mut self) -> Option<MoveOutcome> {
        self.navigate(History::first)
    }

    pub fn previous_move(&mut self) -> Option<MoveOutcome> {
        self.navigate(History::previous)
    }

    pub fn next_move(&mut self) -> Option<MoveOutcome> {
        self.navigate(History::next)
    }

    pub fn last_move(&mut self) -> Option<MoveOutcome> {
        self.navigate(History::last_entry)
    }

    fn navigate(&mut self, step: fn(&mut History) -> Option<&HistoryEntry>) -> Option<MoveOutcome> {
        if self.pending_promotion().is_some() {
            return None;
        }
        let entry = step(&mut self.history)?;
        let outcome = entry.played.as_ref().map_or(MoveOutcome::Move, |r| r.outcome);
        self.board = entry.board.clone();
        self.controller = entry.controller.clone();
        self.valid_moves.clear();
        self.selected = None;
        self.refresh_info();
        debug!("viewing position {} of {}", self.history.cursor(), self.history.tip());
        Some(outcome)
    }

    /// Throws the current game away and sets up a new one.
    pub fn reset(&mut self) {
        let store = self.store.take();
        let autosave = self.autosave;
        *self = Self::fresh(Board::standard(), GameController::new(), store);
        self.autosave = autosave;
        info!("new game");
        self.persist();
    }

    pub fn snapshot(&self) -> SavedGame {
        SavedGame {
            board: self.board.clone(),
            controller: self.controller.clone(),
            history: self.history.clone(),
            status: self.status.clone(),
            pending: self.pending.clone(),
        }
    }

    /// Writes the game to its store, if it has one.
    pub fn save(&self) -> Result<(), ChessError> {
        match &self.store {
            Some(store) => store.save(&self.snapshot()),
            None => Ok(()),
        }
    }

    fn persist(&self) {
        if !self.autosave {
            return;
        }
        if let Err(e) = self.save() {
            error!("saving the game failed: {}", e);
        }
    }
}
