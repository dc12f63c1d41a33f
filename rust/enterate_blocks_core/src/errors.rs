//! Error types for the block editor

use thiserror::Error;

use crate::blocks::BlockType;

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Unknown block type: {0}")]
    UnknownType(String),

    #[error("Block {id} is a {expected} block, got {actual} content")]
    TypeMismatch {
        id: String,
        expected: BlockType,
        actual: BlockType,
    },

    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected input from a per-type editing form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("{block_type} blocks have no field named {field}")]
    UnknownField { block_type: BlockType, field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}
