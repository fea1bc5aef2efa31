//! Combat system: enemies, damage math, abilities and the battle loop.

#![allow(unused_imports)]

pub mod abilities;
pub mod logic;
pub mod math;
pub mod types;

pub use abilities::*;
pub use logic::*;
pub use math::*;
pub use types::*;
