//////////////////////////
// piece.rs
//////////////////////////

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::types::*;

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1),
    (-1, -2), (-1, 2),
    (1, -2), (1, 2),
    (2, -1), (2, 1),
];

const DIAGONALS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ORTHOGONALS: [(i8, i8); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
    pub position: Position,
    /// Only consulted for kings, rooks and pawns.
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceType, color: Color, position: Position) -> Piece {
        Piece { kind, color, position, has_moved: false }
    }

    pub fn symbol(&self) -> char {
        let letter = match self.kind {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match self.color {
            Color::White => letter.to_ascii_uppercase(),
            Color::Black => letter,
        }
    }

    /// Candidate moves of this piece on `board`.
    ///
    /// With `defend_moves` set the result is the set of squares the piece
    /// threatens instead: pawn diagonals count even when empty, squares held by
    /// its own side count, and castling is never produced. Self-check is not
    /// considered in either mode.
    pub fn valid_moves(&self, board: &Board, defend_moves: bool) -> Vec<Move> {
        let mut moves = Vec::new();
        match self.kind {
            PieceType::Pawn => self.pawn_moves(board, defend_moves, &mut moves),
            PieceType::Knight => self.step_moves(board, &KNIGHT_JUMPS, defend_moves, &mut moves),
            PieceType::Bishop => self.slide_moves(board, &DIAGONALS, defend_moves, &mut moves),
            PieceType::Rook => self.slide_moves(board, &ORTHOGONALS, defend_moves, &mut moves),
            PieceType::Queen => self.slide_moves(board, &ALL_DIRECTIONS, defend_moves, &mut moves),
            PieceType::King => {
                self.step_moves(board, &ALL_DIRECTIONS, defend_moves, &mut moves);
                if !defend_moves {
                    self.castling(board, &mut moves);
                }
            }
        }
        moves
    }

    /// En-passant capture available right after `last` double-stepped beside this pawn.
    pub fn en_passant(&self, last: Option<&LastMove>) -> Option<Move> {
        let last = last?;
        if self.kind != PieceType::Pawn
            || last.piece.color == self.color
            || !last.is_pawn_double_step()
        {
            return None;
        }
        let victim = last.piece.position;
        if victim.rank() != self.position.rank()
            || victim.file().abs_diff(self.position.file()) != 1
        {
            return None;
        }
        let to = victim.offset(0, self.color.forward())?;
        Some(Move {
            from: self.position,
            to,
            kind: MoveKind::EnPassant { captured: victim },
        })
    }

    fn pawn_moves(&self, board: &Board, defend_moves: bool, moves: &mut Vec<Move>) {
        let forward = self.color.forward();

        if !defend_moves {
            if let Some(one) = self.position.offset(0, forward) {
                if !board.is_occupied(one) {
                    moves.push(Move::normal(self.position, one));
                    if !self.has_moved && self.position.rank() == self.color.pawn_rank() {
                        if let Some(two) = self.position.offset(0, 2 * forward) {
                            if !board.is_occupied(two) {
                                moves.push(Move::normal(self.position, two));
                            }
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            let Some(target) = self.position.offset(df, forward) else {
                continue;
            };
            if defend_moves {
                moves.push(Move::normal(self.position, target));
            } else if matches!(board.get(target), Some(p) if p.color != self.color) {
                moves.push(Move::normal(self.position, target));
            }
        }
    }

    fn step_moves(&self, board: &Board, steps: &[(i8, i8)], defend_moves: bool, moves: &mut Vec<Move>) {
        for &(df, dr) in steps {
            let Some(target) = self.position.offset(df, dr) else {
                continue;
            };
            match board.get(target) {
                Some(p) if p.color == self.color && !defend_moves => {}
                _ => moves.push(Move::normal(self.position, target)),
            }
        }
    }

    fn slide_moves(&self, board: &Board, directions: &[(i8, i8)], defend_moves: bool, moves: &mut Vec<Move>) {
        for &(df, dr) in directions {
            let mut cursor = self.position;
            while let Some(target) = cursor.offset(df, dr) {
                match board.get(target) {
                    None => moves.push(Move::normal(self.position, target)),
                    Some(p) => {
                        if p.color != self.color || defend_moves {
                            moves.push(Move::normal(self.position, target));
                        }
                        break;
                    }
                }
                cursor = target;
            }
        }
    }

    fn castling(&self, board: &Board, moves: &mut Vec<Move>) {
        // only from the e-file of the home rank
        if self.has_moved || Position::new(4, self.color.back_rank()) != Some(self.position) {
            return;
        }
        // king side: rook on the h-file, two steps right; queen side: a-file, two steps left
        for (rook_file, step) in [(7u8, 1i8), (0u8, -1i8)] {
            if let Some(mv) = self.castle_towards(board, rook_file, step) {
                moves.push(mv);
            }
        }
    }

    fn castle_towards(&self, board: &Board, rook_file: u8, step: i8) -> Option<Move> {
        let rank = self.position.rank();
        let rook_from = Position::new(rook_file, rank)?;
        let rook = board.get(rook_from)?;
        if rook.kind != PieceType::Rook || rook.color != self.color || rook.has_moved {
            return None;
        }

        let mut between = self.position.offset(step, 0)?;
        while between != rook_from {
            if board.is_occupied(between) {
                return None;
            }
            between = between.offset(step, 0)?;
        }

        let crossed = self.position.offset(step, 0)?;
        let to = self.position.offset(2 * step, 0)?;
        let enemy = self.color.opposite();
        if [self.position, crossed, to]
            .iter()
            .any(|&square| board.is_defended_by(square, enemy))
        {
            return None;
        }

        Some(Move {
            from: self.position,
            to,
            kind: MoveKind::Castle { rook_from, rook_to: crossed },
        })
    }
}
