//! Quest Chronicles - turn-based RPG rules engine
//!
//! Character progression, inventory and equipment, the quest ledger and
//! combat resolution. The `chronicles` binary drives these through a
//! line-based terminal session.

pub mod character;
pub mod combat;
pub mod data;
pub mod game;
pub mod items;
pub mod quests;

pub use crate::game::error::{GameError, Result};
pub use crate::game::session::{GameSession, Reward};
