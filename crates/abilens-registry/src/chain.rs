//! Ordered fallback across several resolvers.

use abilens_core::resolver::SignatureResolver;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Asks each resolver in turn; the first non-empty answer wins.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn SignatureResolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: Arc<dyn SignatureResolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }
}

#[async_trait]
impl SignatureResolver for ResolverChain {
    async fn lookup(&self, selector: [u8; 4]) -> Vec<String> {
        for resolver in &self.resolvers {
            let found = resolver.lookup(selector).await;
            if !found.is_empty() {
                debug!(
                    resolver = resolver.name(),
                    selector = %hex::encode(selector),
                    count = found.len(),
                    "selector resolved"
                );
                return found;
            }
        }
        Vec::new()
    }

    fn name(&self) -> &str {
        "chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySignatureRegistry;

    #[tokio::test]
    async fn first_non_empty_wins() {
        let first = Arc::new(MemorySignatureRegistry::new());
        first.register("transfer(address,uint256)");
        let second = Arc::new(MemorySignatureRegistry::with_defaults());

        let chain = ResolverChain::new().with(first).with(second);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.names(), vec!["memory", "memory"]);

        // only the second knows approve
        assert_eq!(
            chain.lookup([0x09, 0x5e, 0xa7, 0xb3]).await,
            vec!["approve(address,uint256)".to_string()]
        );
        assert_eq!(chain.lookup([0xa9, 0x05, 0x9c, 0xbb]).await.len(), 1);
        assert!(chain.lookup([0, 0, 0, 0]).await.is_empty());
    }

    #[tokio::test]
    async fn empty_chain_knows_nothing() {
        assert!(ResolverChain::new().lookup([0xa9, 0x05, 0x9c, 0xbb]).await.is_empty());
    }
}
