//! In-memory `SignatureResolver` implementation.
//!
//! Suitable for tests, offline CLI use, and as the first link of a
//! resolver chain. Thread-safe via `RwLock`.

use abilens_core::resolver::SignatureResolver;
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use abilens_core::selector::selector_of;

/// Signatures shipped with the crate, in canonical form.
pub const BUNDLED_SIGNATURES: &[&str] = &[
    // ERC-20
    "transfer(address,uint256)",
    "approve(address,uint256)",
    "transferFrom(address,address,uint256)",
    // Safe
    "execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)",
    "execTransactionFromModule(address,uint256,bytes,uint8)",
    "multiSend(bytes)",
    // Uniswap Universal Router
    "execute(bytes,bytes[],uint256)",
    "execute(bytes,bytes[])",
    // zkSync L2→L1 governance
    "sendToL1(bytes)",
    "execute(((address,uint256,bytes)[],address,bytes32))",
];

#[derive(Debug, Default)]
pub struct MemorySignatureRegistry {
    by_selector: RwLock<HashMap<[u8; 4], Vec<String>>>,
}

impl MemorySignatureRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with [`BUNDLED_SIGNATURES`].
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        for sig in BUNDLED_SIGNATURES {
            registry.register(sig);
        }
        registry
    }

    /// Add a canonical signature (`name(type,...)`, no spaces or names).
    ///
    /// Later registrations for the same selector rank after earlier ones.
    /// Returns the selector the signature was filed under.
    pub fn register(&self, signature: &str) -> [u8; 4] {
        let signature = signature.trim();
        let selector = selector_of(signature);
        let mut map = self
            .by_selector
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let candidates = map.entry(selector).or_default();
        if !candidates.iter().any(|s| s == signature) {
            candidates.push(signature.to_string());
        }
        selector
    }

    /// Number of distinct selectors known.
    pub fn len(&self) -> usize {
        self.by_selector
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every registered signature, sorted.
    pub fn all_signatures(&self) -> Vec<String> {
        let map = self
            .by_selector
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<String> = map.values().flatten().cloned().collect();
        all.sort();
        all
    }
}

#[async_trait]
impl SignatureResolver for MemorySignatureRegistry {
    async fn lookup(&self, selector: [u8; 4]) -> Vec<String> {
        self.by_selector
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&selector)
            .cloned()
            .unwrap_or_default()
    }

    fn name(&self) -> &str {
        "memory"
    }
}
