//////////////////////////
// history.rs
//////////////////////////

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::game::GameController;
use crate::types::*;

/// Describes the move that produced a history entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub piece: PieceType,
    pub color: Color,
    pub mv: Move,
    pub captured: Option<PieceType>,
    pub promotion: Option<PieceType>,
    pub outcome: MoveOutcome,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub board: Board,
    pub controller: GameController,
    /// `None` only for the starting position.
    pub played: Option<MoveRecord>,
}

/// Append-only log of positions plus a read cursor.
///
/// Never empty: the first entry is the starting position. Only the tip may be
/// extended, and only while the cursor rests on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    pub fn new(start: HistoryEntry) -> Self {
        History { entries: vec![start], cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Only a history read from a damaged save can be empty; `validate` rejects it.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn tip(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn at_tip(&self) -> bool {
        self.cursor == self.tip()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn last(&self) -> &HistoryEntry {
        &self.entries[self.tip()]
    }

    pub(crate) fn last_mut(&mut self) -> &mut HistoryEntry {
        let tip = self.tip();
        &mut self.entries[tip]
    }

    /// Appends `entry` and moves the cursor onto it. Refused while the cursor
    /// points into the past.
    pub fn push(&mut self, entry: HistoryEntry) -> bool {
        if !self.at_tip() {
            return false;
        }
        self.entries.push(entry);
        self.cursor = self.tip();
        true
    }

    pub fn first(&mut self) -> Option<&HistoryEntry> {
        self.seek(0)
    }

    pub fn previous(&mut self) -> Option<&HistoryEntry> {
        let target = self.cursor.checked_sub(1)?;
        self.seek(target)
    }

    pub fn next(&mut self) -> Option<&HistoryEntry> {
        self.seek(self.cursor + 1)
    }

    pub fn last_entry(&mut self) -> Option<&HistoryEntry> {
        self.seek(self.tip())
    }

    /// Moves the cursor to `index`; `None` if that is off the log or already there.
    fn seek(&mut self, index: usize) -> Option<&HistoryEntry> {
        if index >= self.entries.len() || index == self.cursor {
            return None;
        }
        self.cursor = index;
        Some(&self.entries[index])
    }

    /// The last two positions repeat the two from four plies earlier.
    pub fn is_repetition(&self) -> bool {
        let n = self.entries.len();
        if n < 6 {
            return false;
        }
        let board = |i: usize| &self.entries[i].board;
        board(n - 1).same_placement(board(n - 5)) && board(n - 2).same_placement(board(n - 6))
    }

    pub fn validate(&self) -> Result<(), ChessError> {
        if self.entries.is_empty() {
            return Err(ChessError::Corrupt("history is empty".into()));
        }
        if self.cursor >= self.entries.len() {
            return Err(ChessError::Corrupt(format!(
                "cursor {} past {} entries",
                self.cursor,
                self.entries.len()
            )));
        }
        for entry in &self.entries {
            entry.controller.verify(&entry.board)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> HistoryEntry {
        HistoryEntry {
            board: Board::standard(),
            controller: GameController::new(),
            played: None,
        }
    }

    fn history_of(len: usize) -> History {
        let mut history = History::new(start());
        for _ in 1..len {
            assert!(history.push(start()));
        }
        history
    }

    #[test]
    fn previous_clamps_at_first_entry() {
        let mut history = history_of(4);
        assert!(history.first().is_some());
        assert_eq!(history.cursor(), 0);
        assert!(history.previous().is_none());
        assert!(history.previous().is_none());
        assert!(history.first().is_none());
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn navigation_never_changes_length() {
        let mut history = history_of(5);
        history.first();
        history.next();
        history.next();
        assert_eq!(history.cursor(), 2);
        assert!(history.last_entry().is_some());
        assert_eq!(history.cursor(), 4);
        assert!(history.next().is_none());
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn push_refused_away_from_tip() {
        let mut history = history_of(3);
        history.previous();
        assert!(!history.at_tip());
        assert!(!history.push(start()));
        assert_eq!(history.len(), 3);
        history.last_entry();
        assert!(history.push(start()));
        assert_eq!(history.cursor(), 3);
    }

    #[test]
    fn cursor_past_end_fails_validation() {
        let mut history = history_of(2);
        history.cursor = 5;
        assert!(history.validate().is_err());
    }
}
