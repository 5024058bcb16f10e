//////////////////////////
// storage.rs
//////////////////////////

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::board::Board;
use crate::chess_board::GameStatus;
use crate::game::{GameController, TurnPhase};
use crate::history::{History, MoveRecord};
use crate::types::*;

/// Everything needed to rebuild a game exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub board: Board,
    pub controller: GameController,
    pub history: History,
    pub status: GameStatus,
    /// Move waiting for its promotion choice before it can enter the history.
    pub pending: Option<MoveRecord>,
}

impl SavedGame {
    pub fn validate(&self) -> Result<(), ChessError> {
        self.history.validate()?;
        self.controller.verify(&self.board)?;
        let awaiting = matches!(self.controller.phase(), TurnPhase::AwaitingPromotion { .. });
        if self.pending.is_some() != awaiting {
            return Err(ChessError::Corrupt("promotion record out of step with turn phase".into()));
        }

        // a pending promotion is the only time the live position runs ahead of the log
        if self.pending.is_some() {
            if !self.history.at_tip() {
                return Err(ChessError::Corrupt("promotion pending away from the latest position".into()));
            }
        } else {
            let shown = self.history.current();
            if shown.board != self.board || shown.controller != self.controller {
                return Err(ChessError::Corrupt(format!(
                    "live position differs from history entry {}",
                    self.history.cursor()
                )));
            }
        }
        Ok(())
    }
}

/// JSON save file guarded by a lock, so a load never sees half a write.
pub struct SaveStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SaveStore { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // a panic mid-save leaves no shared data behind the lock, only the file
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Writes `game` to a temp file beside the target and renames it into place.
    pub fn save(&self, game: &SavedGame) -> Result<(), ChessError> {
        let _guard = self.guard();
        let serialized = serde_json::to_string_pretty(game)?;

        let tmp = self.path.with_extension("tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;

        debug!("saved {} history entries to {}", game.history.len(), self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<SavedGame, ChessError> {
        let _guard = self.guard();
        let mut file = File::open(&self.path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let game: SavedGame = serde_json::from_str(&contents)?;
        game.validate()?;
        info!("loaded game with {} history entries from {}", game.history.len(), self.path.display());
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryEntry;

    fn fresh() -> SavedGame {
        SavedGame {
            board: Board::standard(),
            controller: GameController::new(),
            history: History::new(HistoryEntry {
                board: Board::standard(),
                controller: GameController::new(),
                played: None,
            }),
            status: GameStatus::default(),
            pending: None,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("game.json"));
        let game = fresh();
        store.save(&game).unwrap();
        assert_eq!(store.load().unwrap(), game);
        assert!(!dir.path().join("game.tmp").exists());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("nothing.json"));
        assert!(matches!(store.load(), Err(ChessError::Io(_))));
    }

    #[test]
    fn garbage_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(SaveStore::new(path).load(), Err(ChessError::Json(_))));
    }

    #[test]
    fn mismatched_king_tracking_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("game.json"));
        let mut game = fresh();
        game.board.apply(&Move::normal("e1".parse().unwrap(), "e3".parse().unwrap()));
        fs::write(store.path(), serde_json::to_string(&game).unwrap()).unwrap();
        assert!(matches!(store.load(), Err(ChessError::Corrupt(_))));
    }

    #[test]
    fn live_board_out_of_step_with_history_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("game.json"));
        let mut game = fresh();
        game.board.apply(&Move::normal("e2".parse().unwrap(), "e4".parse().unwrap()));
        fs::write(store.path(), serde_json::to_string(&game).unwrap()).unwrap();
        assert!(matches!(store.load(), Err(ChessError::Corrupt(_))));
    }

    #[test]
    fn concurrent_saves_and_loads_never_tear() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(SaveStore::new(dir.path().join("game.json")));
        let game = fresh();
        store.save(&game).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                let game = game.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        if i % 2 == 0 {
                            store.save(&game).unwrap();
                        } else {
                            assert_eq!(store.load().unwrap(), game);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
