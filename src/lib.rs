//! Bird Arena - real-time two-bird duel simulation core

pub mod battle;
pub mod combat;
pub mod core;
