use crate::error::CallResult;
use crate::types::{Argument, Parameter, ResultMap};
use async_trait::async_trait;

/// One invokable remote procedure. Backend-specific state (client handles,
/// remote identifiers) stays private to the implementing type and does not
/// change after construction.
///
/// `run` is synchronous from the caller's point of view: asynchronous
/// backends block internally on their poll loops until a terminal state is
/// reached or a retry budget is exhausted.
#[async_trait]
pub trait RemoteCall: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn params(&self) -> &[Parameter];

    async fn run(&self, args: &[Argument]) -> CallResult<ResultMap>;
}

/// Look up an argument by name.
pub fn find_arg<'a>(args: &'a [Argument], name: &str) -> Option<&'a Argument> {
    args.iter().find(|a| a.name() == name)
}

/// Two calls expose the same signature iff their names match and their
/// parameter sets are field-wise equal, independent of parameter order.
pub fn same_signature(a: &dyn RemoteCall, b: &dyn RemoteCall) -> bool {
    if a.name() != b.name() || a.params().len() != b.params().len() {
        return false;
    }
    a.params().iter().all(|pa| b.params().iter().any(|pb| pa == pb))
}
