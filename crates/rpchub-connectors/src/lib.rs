//! Backend adapters exposing remote resources as procedures.
//!
//! Three backends are supported: synchronous function invocation
//! ([`lambda`]), workflow dispatch ([`workflow`]), and automation documents
//! ([`automation`]). Each one provides the procedure type itself, a client
//! trait so transports can be swapped, an HTTP client, and a discovery
//! source for the registry.

pub mod automation;
pub mod error;
pub mod lambda;
pub mod poll;
pub mod signer;
pub mod workflow;

pub use automation::{AutomationRpc, AutomationSource};
pub use error::{ClientError, ClientResult};
pub use lambda::{LambdaRpc, LambdaSource};
pub use poll::PollPolicy;
pub use signer::{NoSignature, RequestSigner};
pub use workflow::{WorkflowRpc, WorkflowSource};
