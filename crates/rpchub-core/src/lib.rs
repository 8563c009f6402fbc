pub mod call;
pub mod error;
pub mod render;
pub mod testing;
pub mod types;

// Re-export commonly used types
pub use call::{find_arg, same_signature, RemoteCall};
pub use error::{CallError, CallResult};
pub use render::{render, OutputFormat};
pub use types::{
    matches_all, validate_arguments, Argument, ExecutionStatus, ParamType, Parameter, ResultMap,
    TagFilter, FORMAT_STRING_KEY,
};
