use crate::types::ExecutionStatus;
use thiserror::Error;

pub type CallResult<T> = Result<T, CallError>;

/// Errors produced while discovering or invoking a remote procedure.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("failed fetching procedure schema: {0}")]
    SchemaFetch(String),

    #[error("malformed procedure schema: {0}")]
    SchemaParse(String),

    #[error("parameter {parameter} is required")]
    Validation { parameter: String },

    #[error("failed dispatching invocation: {0}")]
    Dispatch(String),

    #[error("gave up waiting for {waiting_for} after {attempts} attempts")]
    PollTimeout { attempts: u32, waiting_for: String },

    #[error("run finished with unexpected status: {status}")]
    RunFailed { status: ExecutionStatus },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to format response: result is missing a formatString")]
    MissingFormatString,
}

impl CallError {
    /// Shorthand used by adapters to wrap transport failures seen while
    /// fetching schema material.
    pub fn schema_fetch(err: impl std::fmt::Display) -> Self {
        Self::SchemaFetch(err.to_string())
    }

    /// Shorthand used by adapters to wrap transport failures seen while
    /// submitting or tracking an invocation.
    pub fn dispatch(err: impl std::fmt::Display) -> Self {
        Self::Dispatch(err.to_string())
    }
}
