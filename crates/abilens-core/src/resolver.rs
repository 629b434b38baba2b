//! The signature lookup boundary.
//!
//! A resolver maps a 4-byte selector to candidate human-readable
//! signatures. Candidates are untrusted: the first one is preferred,
//! nothing more is promised.

use async_trait::async_trait;
use std::sync::Arc;

/// Resolves function selectors to candidate signatures.
///
/// Implementations never fail outward. Transport problems are logged by
/// the implementation and reported as an empty list.
#[async_trait]
pub trait SignatureResolver: Send + Sync {
    /// Candidate signatures for `selector`, most canonical first.
    async fn lookup(&self, selector: [u8; 4]) -> Vec<String>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: SignatureResolver + ?Sized> SignatureResolver for Arc<T> {
    async fn lookup(&self, selector: [u8; 4]) -> Vec<String> {
        (**self).lookup(selector).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
