//! Game engine for browser WASM builds
//!
//! Wraps `LocalGame` for JavaScript. Errors cross the boundary as their
//! display text; views cross as plain JSON objects.

use std::format;
use std::string::{String, ToString};
use std::vec::Vec;

use serde::Serialize;
use skirmish_core::log;
use skirmish_core::{BattleAction, GameError};
use wasm_bindgen::prelude::*;

use crate::local::LocalGame;

#[wasm_bindgen]
pub struct SkirmishClient {
    game: LocalGame,
}

#[wasm_bindgen]
impl SkirmishClient {
    /// Create a client; without a seed the RNG is seeded from browser entropy
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<u64>) -> Result<SkirmishClient, String> {
        log::info("=== SKIRMISH CLIENT INITIALIZED ===");
        let seed = seed.unwrap_or_else(entropy_seed);
        let game = LocalGame::new(seed).map_err(describe)?;
        Ok(Self { game })
    }

    #[wasm_bindgen]
    pub fn start_battle(&mut self) -> Result<JsValue, String> {
        log::action("start_battle", "starting a fresh battle from JS");
        let snapshot = self.game.start_battle().map_err(describe)?;
        to_js(&snapshot)
    }

    #[wasm_bindgen]
    pub fn fight(&mut self) -> Result<JsValue, String> {
        let turn = self.game.act(BattleAction::Fight).map_err(describe)?;
        to_js(&turn)
    }

    #[wasm_bindgen]
    pub fn flee(&mut self) -> Result<JsValue, String> {
        let turn = self.game.act(BattleAction::Flee).map_err(describe)?;
        to_js(&turn)
    }

    /// The battle in progress, or `null`
    #[wasm_bindgen]
    pub fn get_session(&self) -> JsValue {
        match self.game.session() {
            Some(snapshot) => to_js(&snapshot).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen]
    pub fn get_progress(&self) -> Result<JsValue, String> {
        let view = self.game.progress().map_err(describe)?;
        to_js(&view)
    }

    #[wasm_bindgen]
    pub fn get_history(&self) -> Result<JsValue, String> {
        let history = self.game.history().map_err(describe)?;
        to_js(&history)
    }

    /// Session slot as SCALE bytes for page storage
    #[wasm_bindgen]
    pub fn export_session_scale(&self) -> Vec<u8> {
        self.game.export_session()
    }

    /// Restore an exported session slot; returns the commit receipt if the
    /// restored battle had already ended, otherwise `null`
    #[wasm_bindgen]
    pub fn restore_session_scale(&mut self, session_scale: Vec<u8>) -> Result<JsValue, String> {
        log::debug(
            "restore_session_scale",
            &format!("session_scale: {} bytes", session_scale.len()),
        );
        match self.game.restore_session(&session_scale).map_err(describe)? {
            Some(receipt) => to_js(&receipt),
            None => Ok(JsValue::NULL),
        }
    }
}

fn describe(err: GameError) -> String {
    log::result(false, &format!("{:?}", err));
    err.to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    serde_wasm_bindgen::to_value(value).map_err(|e| {
        log::error(&format!("serialization failed: {:?}", e));
        format!("serialization failed: {:?}", e)
    })
}

fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            // Straight to the console: the `log` backend is optional
            let msg = format!("no entropy source, using a fixed seed: {}", e);
            web_sys::console::warn_1(&JsValue::from_str(&msg));
            0
        }
    }
}
