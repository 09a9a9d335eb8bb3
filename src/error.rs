//! Error types for the rules engine

use crate::core::Side;
use crate::game::Phase;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Card not found: {0}")]
    CardNotFound(u32),

    #[error("Illegal action: {0}")]
    IllegalAction(String),

    #[error("{0} does not hold priority")]
    NotYourPriority(Side),

    #[error("{action} is not allowed during {phase}")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("Insufficient resources: need {needed}, have {available}")]
    InsufficientResources { needed: usize, available: usize },

    #[error("The game is already over")]
    GameOver,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Match task is no longer running")]
    ChannelClosed,

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
