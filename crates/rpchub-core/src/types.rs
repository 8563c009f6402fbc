use crate::error::{CallError, CallResult};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// Result key that, by convention, carries a template for human-readable
/// rendering of the rest of the map.
pub const FORMAT_STRING_KEY: &str = "formatString";

/// Loosely-typed invocation result, produced fresh per call.
pub type ResultMap = serde_json::Map<String, JsonValue>;

/// Declared type of a procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    Bool,
    Int,
    String,
}

/// A declared input slot of a remote procedure. Immutable once the owning
/// call is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub param_type: ParamType,
    pub description: String,
    pub required: bool,
}

/// A concrete typed value supplied for one invocation, keyed by parameter
/// name. Closed sum so adapters can match exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    String { name: String, value: String },
    Int { name: String, value: i64 },
    Bool { name: String, value: bool },
}

impl Argument {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::String { name: name.into(), value: value.into() }
    }

    pub fn int(name: impl Into<String>, value: i64) -> Self {
        Self::Int { name: name.into(), value }
    }

    pub fn bool(name: impl Into<String>, value: bool) -> Self {
        Self::Bool { name: name.into(), value }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::String { name, .. } | Self::Int { name, .. } | Self::Bool { name, .. } => name,
        }
    }

    /// The argument value as a JSON value, for payload serialization.
    pub fn value_json(&self) -> JsonValue {
        match self {
            Self::String { value, .. } => JsonValue::String(value.clone()),
            Self::Int { value, .. } => JsonValue::Number((*value).into()),
            Self::Bool { value, .. } => JsonValue::Bool(*value),
        }
    }
}

/// Generalized status vocabulary for asynchronous backend runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    TimedOut,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Succeeds iff every required parameter has a matching argument by name.
/// Parameters are checked in declaration order, so the error names the first
/// missing one deterministically.
pub fn validate_arguments(args: &[Argument], params: &[Parameter]) -> CallResult<()> {
    for param in params {
        if !param.required {
            continue;
        }
        if !args.iter().any(|a| a.name() == param.name) {
            return Err(CallError::Validation { parameter: param.name.clone() });
        }
    }
    Ok(())
}

/// Predicate over a discovered resource's tag set. Multiple filters configured
/// for one source combine with AND semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        tags.get(&self.key).is_some_and(|v| *v == self.value)
    }
}

/// True iff the tag set satisfies every filter.
pub fn matches_all(filters: &[TagFilter], tags: &HashMap<String, String>) -> bool {
    filters.iter().all(|f| f.matches(tags))
}
