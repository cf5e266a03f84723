use crate::forest::NodeId;
use thiserror::Error;
use vocab_model::FetchError;

pub type Result<T> = std::result::Result<T, HierarchyError>;

#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Forest already disposed")]
    Disposed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Fixture error: {0}")]
    FixtureError(#[from] serde_json::Error),
}

/// Errors of the hierarchy-configuration store
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot encode configuration: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error("Invalid scope name: {0:?}")]
    InvalidScope(String),
}
