//! SQLite schema for players, sessions, games and level thresholds

/// Table definitions, applied on every open
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS players (
    id              INTEGER PRIMARY KEY,
    level           INTEGER NOT NULL DEFAULT 1,
    xp              INTEGER NOT NULL DEFAULT 0,
    games_played    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS sessions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    player_id       INTEGER NOT NULL,
    FOREIGN KEY (player_id) REFERENCES players(id)
);

CREATE TABLE IF NOT EXISTS games (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id      INTEGER NOT NULL UNIQUE,
    player_id       INTEGER NOT NULL,
    xp_earned       INTEGER NOT NULL,
    result          TEXT NOT NULL CHECK (result IN ('won', 'lost', 'fled')),
    FOREIGN KEY (session_id) REFERENCES sessions(id),
    FOREIGN KEY (player_id) REFERENCES players(id)
);

CREATE INDEX IF NOT EXISTS idx_games_player ON games(player_id);

CREATE TABLE IF NOT EXISTS levels (
    level           INTEGER PRIMARY KEY,
    xp_required     INTEGER NOT NULL
);
"#;

/// Seed one level row; existing rows are left as they are
pub const SEED_LEVEL: &str = "INSERT OR IGNORE INTO levels (level, xp_required) VALUES (?1, ?2)";

pub const SELECT_PLAYER: &str = "SELECT id, level, xp, games_played FROM players WHERE id = ?1";

pub const INSERT_PLAYER: &str =
    "INSERT INTO players (id, level, xp, games_played) VALUES (?1, ?2, ?3, ?4)";

pub const UPDATE_PLAYER: &str =
    "UPDATE players SET level = ?2, xp = ?3, games_played = ?4 WHERE id = ?1";

pub const INSERT_SESSION: &str = "INSERT INTO sessions (player_id) VALUES (?1)";

/// Session ids belong to one player and are credited at most once
pub const SELECT_SESSION_STATE: &str = "SELECT s.player_id, g.id FROM sessions s \
     LEFT JOIN games g ON g.session_id = s.id WHERE s.id = ?1";

pub const INSERT_GAME: &str =
    "INSERT INTO games (session_id, player_id, xp_earned, result) VALUES (?1, ?2, ?3, ?4)";

pub const SELECT_GAMES: &str =
    "SELECT id, player_id, xp_earned, result FROM games WHERE player_id = ?1 ORDER BY id";

pub const SELECT_LEVELS: &str = "SELECT level, xp_required FROM levels ORDER BY level";
