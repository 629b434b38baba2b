//! Which `bytes` parameters may be reinterpreted as nested payloads.
//!
//! Container functions such as a Safe `execTransaction` carry both a call
//! payload and opaque blobs (signatures). Only the listed parameter indices
//! of a registered signature are eligible; unregistered functions allow all.

use std::collections::{HashMap, HashSet};

use crate::signature::FunctionSpec;

/// Safe `execTransaction`: only `data` (index 2), never `signatures`.
pub const SAFE_EXEC_TRANSACTION: &str =
    "execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)";
/// Safe module execution: only `data` (index 2).
pub const SAFE_EXEC_FROM_MODULE: &str = "execTransactionFromModule(address,uint256,bytes,uint8)";

/// Per-function allow-lists of parameter indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionPolicy {
    allow: HashMap<String, HashSet<usize>>,
}

impl FunctionPolicy {
    /// No entries: every `bytes` parameter is eligible.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// The built-in table.
    pub fn with_defaults() -> Self {
        Self::permissive()
            .allow(SAFE_EXEC_TRANSACTION, [2])
            .allow(SAFE_EXEC_FROM_MODULE, [2])
    }

    /// Register (or replace) the allow-list for `signature`.
    ///
    /// Signatures are stored in canonical form, so `f(bytes data)` and
    /// `f(bytes)` name the same entry.
    pub fn allow(mut self, signature: &str, indices: impl IntoIterator<Item = usize>) -> Self {
        self.insert(signature, indices);
        self
    }

    pub fn insert(&mut self, signature: &str, indices: impl IntoIterator<Item = usize>) {
        self.allow
            .insert(canonical(signature), indices.into_iter().collect());
    }

    /// May parameter `index` of `signature` be decoded as a nested payload?
    pub fn is_eligible(&self, signature: &str, index: usize) -> bool {
        match self.allow.get(signature) {
            Some(indices) => indices.contains(&index),
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.allow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allow.is_empty()
    }
}

fn canonical(signature: &str) -> String {
    FunctionSpec::parse(signature)
        .map(|spec| spec.signature)
        .unwrap_or_else(|_| signature.trim().to_string())
}
