//////////////////////////
// main.rs
//////////////////////////
//
// hotseat chess: two players share one terminal. squares are typed the way
// they would be clicked, one at a time ("e2" then "e4") or together ("e2e4").

mod cli;

use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use hotseat_chess::{ChessBoard, ClickOutcome, Config, Ignored, MoveOutcome, PieceType, Position, SaveStore};

fn main() {
    let env = Env::default().filter_or("HOTSEAT_CHESS_LOG", "info");
    env_logger::Builder::from_env(env).init();

    let cli = cli::Cli::parse();
    let cfg = Config::from_env().unwrap_or_else(|e| {
        error!("{}; using default settings", e);
        Config::default()
    });
    let save_path = cli.save_file.clone().unwrap_or(cfg.save_path);

    let store = Arc::new(SaveStore::new(save_path));
    let mut game = ChessBoard::open(store);
    game.set_autosave(cfg.autosave && !cli.no_autosave);
    if cli.new {
        game.reset();
    }
    let game = Arc::new(Mutex::new(game));

    let on_exit = game.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("\n[Ctrl+C] Saving and shutting down...");
        if let Ok(game) = on_exit.lock() {
            if let Err(e) = game.save() {
                error!("final save failed: {}", e);
            }
        }
        std::process::exit(130);
    }) {
        error!("could not install the Ctrl-C handler: {}", e);
    }

    print_help();
    loop {
        {
            let game = match game.lock() {
                Ok(game) => game,
                Err(_) => break,
            };
            print_game(&game);
        }

        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                println!("Read error: {}", e);
                continue;
            }
        }

        let mut game = match game.lock() {
            Ok(game) => game,
            Err(_) => break,
        };
        if !run_command(&mut game, line.trim()) {
            if let Err(e) = game.save() {
                error!("final save failed: {}", e);
            }
            break;
        }
    }
    info!("Goodbye!");
}

fn print_help() {
    println!("Commands:");
    println!("  e2 / e2e4               - click a square / play a move");
    println!("  promote q|r|b|n         - choose the promotion piece");
    println!("  first|prev|next|last    - browse the move history");
    println!("  surrender               - give up the game");
    println!("  reset                   - start a new game");
    println!("  help                    - show this list");
    println!("  quit                    - save and exit");
}

fn print_game(game: &ChessBoard) {
    println!("\n{}", game.board());
    if let Some(from) = game.selected() {
        let targets: Vec<String> = game.valid_moves().iter().map(|m| m.to.to_string()).collect();
        println!("Selected {}: {}", from, targets.join(" ").green());
    }
    if game.is_viewing_history() {
        println!(
            "{}",
            format!("Viewing position {} of {}", game.history().cursor(), game.history().tip()).yellow()
        );
    }
    println!("{}", game.info().bold());
    if let Some(winner) = game.winner() {
        println!("{} wins", winner);
    }
}

/// Returns `false` when the player asked to quit.
fn run_command(game: &mut ChessBoard, cmd: &str) -> bool {
    match cmd {
        "" => {}
        "quit" => return false,
        "help" => print_help(),
        "first" => report_nav(game.first_move()),
        "prev" => report_nav(game.previous_move()),
        "next" => report_nav(game.next_move()),
        "last" => report_nav(game.last_move()),
        "surrender" => {
            if !game.handle_surrender() {
                println!("The game is already over.");
            }
        }
        "reset" => game.reset(),
        c if c.starts_with("promote") => {
            let choice = c.trim_start_matches("promote").trim().chars().next();
            match choice.and_then(PieceType::from_letter) {
                Some(kind) => match game.promote(kind) {
                    Ok(outcome) => report_outcome(outcome),
                    Err(e) => println!("{}", e.to_string().red()),
                },
                None => println!("Use: promote q|r|b|n"),
            }
        }
        c if c.len() == 4 => {
            let (from, to) = c.split_at(2);
            if click(game, from) {
                click(game, to);
            }
        }
        c => {
            click(game, c);
        }
    }
    true
}

/// Sends one square to the board. `false` if nothing came of it.
fn click(game: &mut ChessBoard, square: &str) -> bool {
    let at: Position = match square.parse() {
        Ok(at) => at,
        Err(e) => {
            println!("{}", e.to_string().red());
            return false;
        }
    };
    match game.handle_click(i32::from(at.file()), i32::from(at.rank())) {
        ClickOutcome::Selected { .. } => true,
        ClickOutcome::Moved(outcome) => {
            report_outcome(outcome);
            true
        }
        ClickOutcome::Ignored(reason) => {
            let why = match reason {
                Ignored::OutOfBounds => "That square is off the board.",
                Ignored::NoSelection => "Pick one of your pieces that can move.",
                Ignored::InvalidMove => "That piece cannot go there.",
                Ignored::ViewingHistory => "Return to the latest position ('last') to move.",
                Ignored::GameOver => "The game is over; 'reset' starts a new one.",
                Ignored::AwaitingPromotion => "Choose a promotion piece first.",
            };
            println!("{}", why.red());
            false
        }
    }
}

fn report_outcome(outcome: MoveOutcome) {
    match outcome {
        MoveOutcome::PromotionPending => println!("{}", "Promote to: promote q|r|b|n".yellow()),
        MoveOutcome::Check => println!("{}", "Check!".bright_red()),
        MoveOutcome::Checkmate => println!("{}", "Checkmate!".bright_red().bold()),
        MoveOutcome::Stalemate | MoveOutcome::Draw => println!("{}", "The game is drawn.".yellow()),
        _ => {}
    }
}

fn report_nav(outcome: Option<MoveOutcome>) {
    if outcome.is_none() {
        println!("Nothing further in that direction.");
    }
}
