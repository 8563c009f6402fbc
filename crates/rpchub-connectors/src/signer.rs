//! Request-signing seam for backends that authenticate at the request level.
//!
//! Credential handling (key material, sessions, token refresh) is an external
//! collaborator concern; the HTTP clients only require something that can
//! stamp an outgoing request.

use crate::error::ClientResult;

/// Applies an authentication signature to an outgoing request.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, request: reqwest::Request) -> ClientResult<reqwest::Request>;
}

/// Signer that leaves requests untouched. Suitable for local stacks and
/// tests; production callers supply their platform's signer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSignature;

impl RequestSigner for NoSignature {
    fn sign(&self, request: reqwest::Request) -> ClientResult<reqwest::Request> {
        Ok(request)
    }
}
