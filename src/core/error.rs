use thiserror::Error;

use crate::combat::Archetype;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("No entry for archetype: {0:?}")]
    UnknownArchetype(Archetype),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
