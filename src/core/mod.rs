//! Core game types and entities

pub mod card;
pub mod entity;
pub mod player;

pub use card::{Card, CardKind, CardName};
pub use entity::{CardId, EntityStore};
pub use player::{PlayerName, PlayerState, Side};
