use thiserror::Error;

use crate::world::QueryError;

#[derive(Error, Debug)]
pub enum StaffError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("World query failed: {0}")]
    Query(#[from] QueryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StaffError>;
