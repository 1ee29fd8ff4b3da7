/// Error types for the sequence graph core.
///
/// Validation rejections (self-connection, duplicate, cycle, zone path/overlap)
/// are not errors: they are returned as values from the validator and the zone
/// registry. The enums here cover contract failures and I/O.
use thiserror::Error;

use crate::graph::{EdgeId, NodeId};

/// Errors raised by graph store mutations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("Duplicate node: {0}")]
    DuplicateNode(NodeId),

    #[error("Invalid position for node {0}: coordinates must be finite")]
    InvalidPosition(NodeId),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while loading or saving sequence documents.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid document key: {0}")]
    InvalidKey(String),
}

/// Result type for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
