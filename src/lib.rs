//////////////////////////
// lib.rs
//////////////////////////

pub mod types;
pub mod piece;
pub mod board;
pub mod simulate;
pub mod game;
pub mod history;
pub mod chess_board;
pub mod storage;
pub mod config;

pub use types::*;
pub use piece::Piece;
pub use board::Board;
pub use game::{ClickResolution, GameController, KingState, KingTracking, TurnPhase};
pub use history::{History, HistoryEntry, MoveRecord};
pub use chess_board::{ChessBoard, ClickOutcome, GameOverReason, GameStatus, Ignored};
pub use storage::{SaveStore, SavedGame};
pub use config::Config;
