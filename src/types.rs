//////////////////////////
// types.rs
//////////////////////////

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Kinds a pawn may turn into on the last rank.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    pub fn is_promotion_choice(self) -> bool {
        Self::PROMOTIONS.contains(&self)
    }

    pub fn from_letter(letter: char) -> Option<PieceType> {
        match letter.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank step of a pawn of this color.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank the pieces start on.
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn promotion_rank(self) -> u8 {
        self.opposite().back_rank()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

/// A square on the board. `file` 0 is the a-file, `rank` 0 is the first rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct Position {
    file: u8,
    rank: u8,
}

impl Position {
    pub fn new(file: u8, rank: u8) -> Option<Position> {
        if file < 8 && rank < 8 {
            Some(Position { file, rank })
        } else {
            None
        }
    }

    /// Converts raw board-relative coordinates, rejecting anything off the board.
    pub fn from_coords(x: i32, y: i32) -> Option<Position> {
        let file = u8::try_from(x).ok()?;
        let rank = u8::try_from(y).ok()?;
        Position::new(file, rank)
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn offset(self, df: i8, dr: i8) -> Option<Position> {
        Position::from_coords(
            i32::from(self.file) + i32::from(df),
            i32::from(self.rank) + i32::from(dr),
        )
    }

    /// (x, y) index into the 8x8 array.
    pub(crate) fn index(self) -> (usize, usize) {
        (usize::from(self.file), usize::from(self.rank))
    }
}

impl TryFrom<(u8, u8)> for Position {
    type Error = ChessError;

    fn try_from((file, rank): (u8, u8)) -> Result<Self, Self::Error> {
        Position::new(file, rank)
            .ok_or_else(|| ChessError::InvalidSquare(format!("({file}, {rank})")))
    }
}

impl From<Position> for (u8, u8) {
    fn from(pos: Position) -> Self {
        (pos.file, pos.rank)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

impl FromStr for Position {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Position::new(file, rank).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Normal,
    /// King move of two files; the rook jumps to the square the king crossed.
    Castle { rook_from: Position, rook_to: Position },
    /// Pawn capture onto an empty square; the victim sits on `captured`.
    EnPassant { captured: Position },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub kind: MoveKind,
}

impl Move {
    pub fn normal(from: Position, to: Position) -> Move {
        Move { from, to, kind: MoveKind::Normal }
    }

    pub fn is_castle(&self) -> bool {
        matches!(self.kind, MoveKind::Castle { .. })
    }

    pub fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassant { .. })
    }

    /// Square whose occupant this move removes, if any.
    pub fn capture_square(&self) -> Position {
        match self.kind {
            MoveKind::EnPassant { captured } => captured,
            _ => self.to,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// The piece that moved last (as it stands after the move) and where it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub piece: crate::piece::Piece,
    pub from: Position,
}

impl LastMove {
    pub fn is_pawn_double_step(&self) -> bool {
        self.piece.kind == PieceType::Pawn
            && self.from.file() == self.piece.position.file()
            && self.from.rank().abs_diff(self.piece.position.rank()) == 2
    }
}

/// Feedback tag for a resolved move, consumed by the sound and status layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    Move,
    Capture,
    Castle,
    PromotionPending,
    Promoted,
    Check,
    Checkmate,
    Stalemate,
    Draw,
}

impl MoveOutcome {
    pub fn ends_game(self) -> bool {
        matches!(
            self,
            MoveOutcome::Checkmate | MoveOutcome::Stalemate | MoveOutcome::Draw
        )
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveOutcome::Move => "move",
            MoveOutcome::Capture => "capture",
            MoveOutcome::Castle => "castle",
            MoveOutcome::PromotionPending => "promotion",
            MoveOutcome::Promoted => "promoted",
            MoveOutcome::Check => "check",
            MoveOutcome::Checkmate => "checkmate",
            MoveOutcome::Stalemate => "stalemate",
            MoveOutcome::Draw => "draw",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("save file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("saved game is inconsistent: {0}")]
    Corrupt(String),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("cannot promote a pawn to {0:?}")]
    InvalidPromotion(PieceType),

    #[error("no pawn is waiting for promotion")]
    NoPromotionPending,

    #[error("the game is over")]
    GameOver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squares_parse_and_print() {
        let e4: Position = "e4".parse().unwrap();
        assert_eq!((e4.file(), e4.rank()), (4, 3));
        assert_eq!(e4.to_string(), "e4");
        assert!("i1".parse::<Position>().is_err());
        assert!("a9".parse::<Position>().is_err());
        assert!("a".parse::<Position>().is_err());
    }

    #[test]
    fn coords_outside_board_are_rejected() {
        assert!(Position::from_coords(-1, 0).is_none());
        assert!(Position::from_coords(0, 8).is_none());
        assert_eq!(Position::from_coords(7, 7), Position::new(7, 7));
    }

    #[test]
    fn offset_stops_at_edges() {
        let h8 = Position::new(7, 7).unwrap();
        assert!(h8.offset(1, 0).is_none());
        assert_eq!(h8.offset(-1, -1), Position::new(6, 6));
    }

    #[test]
    fn position_deserialization_validates_range() {
        let ok: Position = serde_json::from_str("[3,4]").unwrap();
        assert_eq!(ok, Position::new(3, 4).unwrap());
        assert!(serde_json::from_str::<Position>("[8,0]").is_err());
    }

    #[test]
    fn promotion_choices_exclude_pawn_and_king() {
        assert!(PieceType::Queen.is_promotion_choice());
        assert!(PieceType::Knight.is_promotion_choice());
        assert!(!PieceType::Pawn.is_promotion_choice());
        assert!(!PieceType::King.is_promotion_choice());
    }
}
