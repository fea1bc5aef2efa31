//! Loading quest and item definitions from data files.

#![allow(unused_imports)]

pub mod loader;

pub use loader::*;
