#![allow(dead_code)]

use hotseat_chess::*;

pub fn sq(name: &str) -> Position {
    name.parse().unwrap()
}

pub fn setup(pieces: &[(PieceType, Color, &str)], to_move: Color) -> ChessBoard {
    let mut board = Board::empty();
    for &(kind, color, at) in pieces {
        board.place(Piece::new(kind, color, sq(at)));
    }
    ChessBoard::with_position(board, to_move, None).unwrap()
}

pub fn click(game: &mut ChessBoard, square: &str) -> ClickOutcome {
    let at = sq(square);
    game.handle_click(i32::from(at.file()), i32::from(at.rank()))
}

pub fn targets(game: &mut ChessBoard, square: &str) -> Vec<Position> {
    match click(game, square) {
        ClickOutcome::Selected { targets, .. } => targets,
        other => panic!("{square} is not selectable: {other:?}"),
    }
}

pub fn play(game: &mut ChessBoard, from: &str, to: &str) -> MoveOutcome {
    targets(game, from);
    match click(game, to) {
        ClickOutcome::Moved(outcome) => outcome,
        other => panic!("{from}{to} was not played: {other:?}"),
    }
}

pub fn play_all(game: &mut ChessBoard, moves: &[&str]) {
    for mv in moves {
        let (from, to) = mv.split_at(2);
        play(game, from, to);
    }
}

/// Legal target squares of every piece on the board, keyed by its square.
pub fn all_legal_moves(game: &ChessBoard) -> Vec<(Position, Vec<Move>)> {
    game.board()
        .pieces()
        .map(|p| (p.position, game.controller().legal_moves(game.board(), p.position)))
        .collect()
}
