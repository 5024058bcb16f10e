//////////////////////////
// cli.rs
//////////////////////////

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hotseat-chess", version, about = "Two players, one terminal, one chess board")]
pub struct Cli {
    /// Save file to resume from and write to (overrides the config file)
    #[arg(long)]
    pub save_file: Option<PathBuf>,

    /// Start a new game instead of resuming the saved one
    #[arg(long)]
    pub new: bool,

    /// Do not write the game after every move
    #[arg(long)]
    pub no_autosave: bool,
}
