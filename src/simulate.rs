//////////////////////////
// simulate.rs
//////////////////////////

use crate::board::Board;
use crate::types::*;

/// Board as it would stand after `mv`, leaving `board` untouched.
pub fn simulate(board: &Board, mv: &Move) -> Board {
    let mut hypothetical = board.clone();
    hypothetical.apply(mv);
    hypothetical
}

/// Where `color`'s king stands once `mv` is played, given its current square.
pub fn king_after(mv: &Move, king: Position) -> Position {
    if mv.from == king {
        mv.to
    } else {
        king
    }
}

/// Would `color` be left in check by playing `mv`?
pub fn exposes_king(board: &Board, mv: &Move, color: Color, king: Position) -> bool {
    let after = simulate(board, mv);
    after.is_defended_by(king_after(mv, king), color.opposite())
}
