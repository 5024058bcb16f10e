//////////////////////////
// board.rs
//////////////////////////

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::piece::Piece;
use crate::types::*;

/// Occupied squares of one position, indexed `[file][rank]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Piece>", try_from = "Vec<Piece>")]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

impl Board {
    pub fn empty() -> Board {
        Board { squares: [[None; 8]; 8] }
    }

    pub fn standard() -> Board {
        let mut board = Board::empty();
        let back_row = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        for color in [Color::White, Color::Black] {
            for (file, kind) in (0u8..).zip(back_row) {
                if let Some(at) = Position::new(file, color.back_rank()) {
                    board.place(Piece::new(kind, color, at));
                }
                if let Some(at) = Position::new(file, color.pawn_rank()) {
                    board.place(Piece::new(PieceType::Pawn, color, at));
                }
            }
        }
        board
    }

    pub fn get(&self, at: Position) -> Option<&Piece> {
        let (x, y) = at.index();
        self.squares[x][y].as_ref()
    }

    pub fn is_occupied(&self, at: Position) -> bool {
        self.get(at).is_some()
    }

    /// Puts `piece` on its own square, returning whatever stood there.
    pub fn place(&mut self, piece: Piece) -> Option<Piece> {
        let (x, y) = piece.position.index();
        self.squares[x][y].replace(piece)
    }

    pub fn remove(&mut self, at: Position) -> Option<Piece> {
        let (x, y) = at.index();
        self.squares[x][y].take()
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.squares.iter().flatten().flatten()
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces().filter(move |p| p.color == color)
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// Performs `mv`, returning the captured piece.
    ///
    /// Both live execution and the move simulator go through here. The mover
    /// must exist; an empty source square means the caller's bookkeeping broke.
    pub fn apply(&mut self, mv: &Move) -> Option<Piece> {
        let Some(mut piece) = self.remove(mv.from) else {
            panic!("no piece on {} to play {}", mv.from, mv);
        };

        let captured = self.remove(mv.capture_square());

        if let MoveKind::Castle { rook_from, rook_to } = mv.kind {
            if let Some(mut rook) = self.remove(rook_from) {
                rook.position = rook_to;
                rook.has_moved = true;
                self.place(rook);
            }
        }

        piece.position = mv.to;
        piece.has_moved = true;
        self.place(piece);
        captured
    }

    /// True if any piece of `by` threatens `at`.
    pub fn is_defended_by(&self, at: Position, by: Color) -> bool {
        self.pieces_of(by)
            .any(|p| p.valid_moves(self, true).iter().any(|m| m.to == at))
    }

    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.pieces_of(color)
            .find(|p| p.kind == PieceType::King)
            .map(|p| p.position)
    }

    /// Same kinds and colors on the same squares, ignoring movement flags.
    pub fn same_placement(&self, other: &Board) -> bool {
        self.squares
            .iter()
            .flatten()
            .zip(other.squares.iter().flatten())
            .all(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => a.kind == b.kind && a.color == b.color,
                (None, None) => true,
                _ => false,
            })
    }

    /// Neither side can ever deliver mate with what is left.
    pub fn is_insufficient_material(&self) -> bool {
        let minors: Vec<&Piece> = self
            .pieces()
            .filter(|p| matches!(p.kind, PieceType::Bishop | PieceType::Knight))
            .collect();
        let others = self
            .pieces()
            .filter(|p| !matches!(p.kind, PieceType::King | PieceType::Bishop | PieceType::Knight))
            .count();
        if others > 0 {
            return false;
        }

        match minors.as_slice() {
            [] | [_] => true,
            // one minor piece each
            [a, b] => a.color != b.color,
            _ => false,
        }
    }

    /// Checks occupancy and king count. Used when a board comes from outside
    /// the engine (a save file).
    pub fn validate(&self) -> Result<(), ChessError> {
        for color in [Color::White, Color::Black] {
            let kings = self
                .pieces_of(color)
                .filter(|p| p.kind == PieceType::King)
                .count();
            if kings != 1 {
                return Err(ChessError::Corrupt(format!(
                    "{} has {} kings",
                    color, kings
                )));
            }
        }
        Ok(())
    }
}

impl From<Board> for Vec<Piece> {
    fn from(board: Board) -> Self {
        board.pieces().copied().collect()
    }
}

impl TryFrom<Vec<Piece>> for Board {
    type Error = ChessError;

    fn try_from(pieces: Vec<Piece>) -> Result<Self, Self::Error> {
        let mut board = Board::empty();
        for piece in pieces {
            if let Some(existing) = board.place(piece) {
                return Err(ChessError::Corrupt(format!(
                    "{:?} and {:?} both on {}",
                    existing.kind, piece.kind, piece.position
                )));
            }
        }
        board.validate()?;
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for file in 0..8 {
            write!(f, " {} ", ((file as u8 + b'a') as char).to_string().cyan())?;
        }
        writeln!(f)?;
        writeln!(f, "  {}", "─".repeat(24).bright_magenta())?;

        for rank in (0..8).rev() {
            write!(f, "{} {}", (rank + 1).to_string().cyan(), "│".bright_magenta())?;
            for file in 0..8 {
                let cell = match self.squares[file][rank] {
                    Some(piece) if piece.color == Color::White => {
                        piece.symbol().to_string().bright_red()
                    }
                    Some(piece) => piece.symbol().to_string().bright_blue(),
                    None => "·".bright_magenta(),
                };
                write!(f, " {} ", cell)?;
            }
            writeln!(f, "{} {}", "│".bright_magenta(), (rank + 1).to_string().cyan())?;
        }

        writeln!(f, "  {}", "─".repeat(24).bright_magenta())?;
        write!(f, "  ")?;
        for file in 0..8 {
            write!(f, " {} ", ((file as u8 + b'a') as char).to_string().cyan())?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Position {
        name.parse().unwrap()
    }

    #[test]
    fn standard_position_has_thirty_two_pieces() {
        let board = Board::standard();
        assert_eq!(board.piece_count(), 32);
        assert_eq!(board.find_king(Color::White), Some(sq("e1")));
        assert_eq!(board.find_king(Color::Black), Some(sq("e8")));
        assert_eq!(board.get(sq("d8")).map(|p| p.kind), Some(PieceType::Queen));
        assert!(board.validate().is_ok());
    }

    #[test]
    fn display_shows_every_rank_and_both_kings() {
        let rendered = Board::standard().to_string();
        assert!(rendered.contains('K'));
        assert!(rendered.contains('k'));
        assert_eq!(rendered.lines().count(), 12);
    }

    #[test]
    fn apply_castle_moves_both_pieces() {
        let mut board = Board::empty();
        board.place(Piece::new(PieceType::King, Color::White, sq("e1")));
        board.place(Piece::new(PieceType::Rook, Color::White, sq("h1")));
        let castle = Move {
            from: sq("e1"),
            to: sq("g1"),
            kind: MoveKind::Castle { rook_from: sq("h1"), rook_to: sq("f1") },
        };
        assert!(board.apply(&castle).is_none());
        assert_eq!(board.get(sq("g1")).map(|p| p.kind), Some(PieceType::King));
        let rook = board.get(sq("f1")).unwrap();
        assert_eq!(rook.kind, PieceType::Rook);
        assert!(rook.has_moved);
        assert!(!board.is_occupied(sq("h1")));
    }

    #[test]
    fn apply_en_passant_removes_the_bypassing_pawn() {
        let mut board = Board::empty();
        board.place(Piece::new(PieceType::Pawn, Color::White, sq("e5")));
        board.place(Piece::new(PieceType::Pawn, Color::Black, sq("d5")));
        let mv = Move {
            from: sq("e5"),
            to: sq("d6"),
            kind: MoveKind::EnPassant { captured: sq("d5") },
        };
        let captured = board.apply(&mv).unwrap();
        assert_eq!(captured.color, Color::Black);
        assert_eq!(board.piece_count(), 1);
        assert!(board.is_occupied(sq("d6")));
    }

    #[test]
    fn insufficient_material_cases() {
        let mut board = Board::empty();
        board.place(Piece::new(PieceType::King, Color::White, sq("e1")));
        board.place(Piece::new(PieceType::King, Color::Black, sq("e8")));
        assert!(board.is_insufficient_material());

        board.place(Piece::new(PieceType::Knight, Color::White, sq("b1")));
        assert!(board.is_insufficient_material());

        board.place(Piece::new(PieceType::Bishop, Color::Black, sq("c8")));
        assert!(board.is_insufficient_material());

        board.place(Piece::new(PieceType::Pawn, Color::Black, sq("a7")));
        assert!(!board.is_insufficient_material());
    }

    #[test]
    fn two_minors_on_one_side_are_not_a_dead_draw() {
        let mut board = Board::empty();
        board.place(Piece::new(PieceType::King, Color::White, sq("e1")));
        board.place(Piece::new(PieceType::King, Color::Black, sq("e8")));
        board.place(Piece::new(PieceType::Bishop, Color::White, sq("c1")));
        board.place(Piece::new(PieceType::Bishop, Color::White, sq("f1")));
        assert!(!board.is_insufficient_material());
    }

    #[test]
    fn deserializing_rejects_doubled_squares_and_missing_kings() {
        let board = Board::standard();
        let mut pieces: Vec<Piece> = board.clone().into();
        let json = serde_json::to_string(&pieces).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);

        let dup = pieces[0];
        pieces.push(dup);
        let json = serde_json::to_string(&pieces).unwrap();
        assert!(serde_json::from_str::<Board>(&json).is_err());

        let no_kings: Vec<Piece> = Board::standard()
            .pieces()
            .filter(|p| p.kind != PieceType::King)
            .copied()
            .collect();
        let json = serde_json::to_string(&no_kings).unwrap();
        assert!(serde_json::from_str::<Board>(&json).is_err());
    }
}
