//! Character model, stats, progression, and persistence.

#![allow(unused_imports)]

pub mod manager;
pub mod progression;
pub mod stats;
pub mod types;

pub use manager::*;
pub use progression::*;
pub use stats::*;
pub use types::*;
