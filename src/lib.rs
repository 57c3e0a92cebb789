//! Potion laboratory companion: a chat tutor that hands out house points and
//! a cauldron mini-game, both backed by a remote language model.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
