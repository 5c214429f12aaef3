#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod battle;
pub mod commit;
pub mod config;
pub mod error;
pub mod levels;
pub mod log;
pub mod rng;
pub mod types;
pub mod view;

#[cfg(feature = "std")]
pub mod engine;
#[cfg(feature = "std")]
pub mod memory;

#[cfg(test)]
mod tests;

pub use battle::*;
pub use commit::*;
pub use config::*;
pub use error::*;
pub use levels::*;
pub use rng::{BattleRng, XorShiftRng};
pub use types::*;
pub use view::*;

#[cfg(feature = "std")]
pub use engine::{BattleStart, ProgressEngine};
#[cfg(feature = "std")]
pub use memory::MemoryStore;
