mod config;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::battle::{BattleAction, BattleSession};
use crate::commit::{CommitReceipt, ProgressStore, ProgressUpdate};
use crate::config::BattleRules;
use crate::engine::ProgressEngine;
use crate::error::{GameError, GameResult};
use crate::levels::LevelThreshold;
use crate::memory::MemoryStore;
use crate::rng::BattleRng;
use crate::types::{GameRecord, Player, PlayerId, SessionId};

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

const PLAYER: PlayerId = 7;
const SESSION: SessionId = 1;

/// RNG that hands out a fixed sequence of rolls
struct ScriptedRng {
    rolls: VecDeque<u32>,
}

impl ScriptedRng {
    /// One `(damage, points)` pair per fight, in order
    fn fights(pairs: &[(u32, u32)]) -> Self {
        Self {
            rolls: pairs.iter().flat_map(|&(d, p)| [d, p]).collect(),
        }
    }
}

impl BattleRng for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.rolls.pop_front().expect("scripted rng ran out of rolls")
    }

    fn gen_inclusive(&mut self, low: u32, high: u32) -> u32 {
        let roll = self.next_u32();
        assert!(
            (low..=high).contains(&roll),
            "scripted roll {roll} outside [{low}, {high}]"
        );
        roll
    }
}

/// Store wrapper whose commits can be switched off
struct FlakyStore {
    inner: MemoryStore,
    unavailable: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::default(),
            unavailable: AtomicBool::new(false),
        }
    }

    fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl ProgressStore for FlakyStore {
    fn load_player(&self, id: PlayerId) -> GameResult<Option<Player>> {
        self.inner.load_player(id)
    }

    fn create_player(&self, id: PlayerId) -> GameResult<Player> {
        self.inner.create_player(id)
    }

    fn load_levels(&self) -> GameResult<Vec<LevelThreshold>> {
        self.inner.load_levels()
    }

    fn open_session(&self, player: PlayerId) -> GameResult<SessionId> {
        self.inner.open_session(player)
    }

    fn load_history(&self, id: PlayerId) -> GameResult<Vec<GameRecord>> {
        self.inner.load_history(id)
    }

    fn commit_progress<F>(&self, id: PlayerId, apply: F) -> GameResult<CommitReceipt>
    where
        F: FnOnce(&Player) -> GameResult<ProgressUpdate>,
    {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GameError::PersistenceFailure);
        }
        self.inner.commit_progress(id, apply)
    }
}

fn new_engine() -> ProgressEngine<MemoryStore> {
    let engine = ProgressEngine::new(MemoryStore::default(), BattleRules::default())
        .expect("default engine");
    engine.register_player(PLAYER).expect("register player");
    engine
}

/// Fight through the scripted rolls, then flee if still standing
fn play_battle<S: ProgressStore>(
    engine: &ProgressEngine<S>,
    fights: &[(u32, u32)],
) -> BattleSession {
    let mut session = engine
        .start_battle(Some(PLAYER), None)
        .expect("start battle")
        .session;
    let mut rng = ScriptedRng::fights(fights);
    for _ in fights {
        engine
            .apply_action(Some(&mut session), BattleAction::Fight, &mut rng)
            .expect("fight");
    }
    if session.is_active() {
        engine
            .apply_action(Some(&mut session), BattleAction::Flee, &mut rng)
            .expect("flee");
    }
    session
}
