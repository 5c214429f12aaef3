//! Logging utilities
//!
//! Thin wrappers over the `log` facade so every crate in the workspace
//! reports under one target. Hosts pick the backend (`console_log` in the
//! browser, any `log` implementation natively).

#![allow(unused)]

use crate::types::PlayerId;

const TARGET: &str = "skirmish";

/// Log an info message
#[inline(always)]
pub fn info(msg: &str) {
    ::log::info!(target: TARGET, "{}", msg);
}

/// Log a warning message
#[inline(always)]
pub fn warn(msg: &str) {
    ::log::warn!(target: TARGET, "{}", msg);
}

/// Log an error message
#[inline(always)]
pub fn error(msg: &str) {
    ::log::error!(target: TARGET, "{}", msg);
}

/// Log a debug message with a label
#[inline(always)]
pub fn debug(label: &str, msg: &str) {
    ::log::debug!(target: TARGET, "[{}] {}", label, msg);
}

/// Log battle session state
#[inline(always)]
pub fn session_summary(player: PlayerId, health: i32, battle_points: u32, phase: &str) {
    ::log::debug!(
        target: TARGET,
        "player={} health={} battle_points={} phase={}",
        player,
        health,
        battle_points,
        phase
    );
}

/// Log an action being performed
#[inline(always)]
pub fn action(name: &str, details: &str) {
    ::log::info!(target: TARGET, "> {}: {}", name, details);
}

/// Log action result
#[inline(always)]
pub fn result(success: bool, msg: &str) {
    if success {
        ::log::info!(target: TARGET, "ok: {}", msg);
    } else {
        ::log::warn!(target: TARGET, "failed: {}", msg);
    }
}
