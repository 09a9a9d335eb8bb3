//! Azoth Rules - turn, priority and AI core for a two-player card game
//!
//! The engine sequences phases, arbitrates priority, resolves a pending-effect
//! stack, runs a per-turn clock and drives a difficulty-scaled AI opponent.
//! Rendering, deck management and networking live outside this crate.

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod runtime;
pub mod tournament;
pub mod zones;

pub use config::MatchConfig;
pub use error::{EngineError, Result};
