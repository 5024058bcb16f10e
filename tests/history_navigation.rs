mod common;

use common::*;
use hotseat_chess::*;

fn three_moves() -> ChessBoard {
    let mut game = ChessBoard::new();
    play_all(&mut game, &["e2e4", "e7e5", "g1f3"]);
    game
}

#[test]
fn first_move_shows_the_opening_without_truncating() {
    let mut game = three_moves();
    let live = game.board().clone();

    assert_eq!(game.first_move(), Some(MoveOutcome::Move));
    assert_eq!(game.board(), &Board::standard());
    assert_eq!(game.current_player(), Color::White);
    assert_eq!(game.history().len(), 4);
    assert!(game.is_viewing_history());

    assert_eq!(game.last_move(), Some(MoveOutcome::Move));
    assert_eq!(game.board(), &live);
    assert_eq!(game.current_player(), Color::Black);
    assert!(!game.is_viewing_history());
}

#[test]
fn previous_at_the_start_does_nothing() {
    let mut game = three_moves();
    game.first_move();
    for _ in 0..3 {
        assert_eq!(game.previous_move(), None);
        assert_eq!(game.history().cursor(), 0);
        assert_eq!(game.board(), &Board::standard());
    }
    assert_eq!(game.first_move(), None);
}

#[test]
fn next_at_the_tip_does_nothing() {
    let mut game = three_moves();
    assert_eq!(game.next_move(), None);
    assert_eq!(game.last_move(), None);
}

#[test]
fn moves_are_refused_while_browsing() {
    let mut game = three_moves();
    game.previous_move();
    assert_eq!(game.current_player(), Color::White);
    assert_eq!(click(&mut game, "g8"), ClickOutcome::Ignored(Ignored::ViewingHistory));
    assert_eq!(click(&mut game, "d2"), ClickOutcome::Ignored(Ignored::ViewingHistory));
    assert_eq!(game.history().len(), 4);

    game.next_move();
    assert!(!game.is_viewing_history());
    assert_eq!(play(&mut game, "b8", "c6"), MoveOutcome::Move);
    assert_eq!(game.history().len(), 5);
}

#[test]
fn stepping_back_restores_check_state() {
    let mut game = ChessBoard::new();
    play_all(&mut game, &["e2e4", "f7f6", "d2d4"]);
    assert_eq!(play(&mut game, "g7", "g5"), MoveOutcome::Move);
    assert_eq!(play(&mut game, "d1", "h5"), MoveOutcome::Checkmate);
    assert!(game.controller().check());

    assert_eq!(game.previous_move(), Some(MoveOutcome::Move));
    assert!(!game.controller().check());
    assert_eq!(game.current_player(), Color::White);

    assert_eq!(game.next_move(), Some(MoveOutcome::Checkmate));
    assert!(game.controller().check());
    assert_eq!(game.info(), "Checkmate!");
}

#[test]
fn surrender_while_browsing_returns_to_the_tip() {
    let mut game = three_moves();
    game.first_move();
    assert!(game.handle_surrender());
    assert!(!game.is_viewing_history());
    assert_eq!(game.history().len(), 4);
    // black was on turn at the tip
    assert_eq!(game.winner(), Some(Color::White));
}

#[test]
fn history_records_each_move() {
    let game = three_moves();
    let played: Vec<String> = game
        .history()
        .entries()
        .iter()
        .filter_map(|e| e.played.as_ref())
        .map(|r| r.mv.to_string())
        .collect();
    assert_eq!(played, vec!["e2e4", "e7e5", "g1f3"]);
    assert!(game.history().entries()[0].played.is_none());
}
