//////////////////////////
// config.rs
//////////////////////////

use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::types::ChessError;

pub const CONFIG_ENV: &str = "HOTSEAT_CHESS_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the running game is saved after every move.
    pub save_path: PathBuf,
    pub autosave: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("board_data.json"),
            autosave: true,
        }
    }
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self, ChessError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Reads `path` if given and present, otherwise the defaults.
    pub fn load(path: Option<&PathBuf>) -> Result<Self, ChessError> {
        match path {
            Some(p) if p.exists() => Self::from_yaml(&fs::read_to_string(p)?),
            _ => Ok(Self::default()),
        }
    }

    /// Same as [`Config::load`] with the path taken from `HOTSEAT_CHESS_CONFIG`.
    pub fn from_env() -> Result<Self, ChessError> {
        let path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load(path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg = Config::from_yaml("autosave: false\n").unwrap();
        assert!(!cfg.autosave);
        assert_eq!(cfg.save_path, PathBuf::from("board_data.json"));
    }

    #[test]
    fn save_path_is_read() {
        let cfg = Config::from_yaml("save_path: /tmp/chess.json\n").unwrap();
        assert_eq!(cfg.save_path, PathBuf::from("/tmp/chess.json"));
        assert!(cfg.autosave);
    }

    #[test]
    fn absent_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(Some(&dir.path().join("none.yaml"))).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn bad_yaml_is_reported() {
        assert!(matches!(Config::from_yaml("autosave: [1, 2"), Err(ChessError::Yaml(_))));
    }
}
