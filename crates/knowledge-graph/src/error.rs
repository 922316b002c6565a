#![forbid(unsafe_code)]

use thiserror::Error;

/// Failures raised by graph operations. None of them leave the store mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Entity '{0}' not found")]
    EntityNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
