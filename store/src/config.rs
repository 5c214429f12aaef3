//! File-based configuration
//!
//! A JSON document naming the database file and, optionally, game rule
//! overrides. Missing fields fall back to the shipped defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skirmish_core::log;
use skirmish_core::{GameConfig, GameError, GameResult, ProgressEngine};

use crate::sqlite::SqliteStore;

/// Default database file, relative to the working directory
pub const DEFAULT_DATABASE_PATH: &str = "skirmish.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    pub database_path: PathBuf,
    pub game: GameConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            game: GameConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Read a config file
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            log::error(&format!("failed to read config {}: {}", path.display(), e));
            GameError::InvalidConfig
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> GameResult<Self> {
        serde_json::from_str(raw).map_err(|e| {
            log::error(&format!("failed to parse config: {}", e));
            GameError::InvalidConfig
        })
    }

    /// Open the database, seed its levels and build an engine over it
    pub fn open_engine(&self) -> GameResult<ProgressEngine<SqliteStore>> {
        let store = SqliteStore::open(&self.database_path, &self.game.levels)?;
        ProgressEngine::new(store, self.game.battle.clone())
    }
}
