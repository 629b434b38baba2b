//! Error types for the abilens decode pipeline.
//!
//! Only fatal conditions live here. Opportunistic misses (an unknown nested
//! selector, bytes that are not a multi-send batch) are expressed as `Option`
//! or as the original value, never as an error.

use thiserror::Error;

/// Errors raised while turning struct definitions into type descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Unknown struct \"{name}\". Available: {available}")]
    UnknownStruct { name: String, available: String },

    #[error("Unknown type \"{ty}\" for field \"{field}\". Define it as a struct or enum, or check for typos.")]
    UnknownType { ty: String, field: String },

    #[error("Unsupported type \"mapping\" for field \"{field}\". Mappings cannot be ABI-encoded.")]
    MappingType { field: String },

    #[error("Circular reference detected: {name}")]
    CircularReference { name: String },
}

impl ResolveError {
    /// Build an `UnknownStruct` error listing the structs that do exist.
    pub fn unknown_struct<'a>(name: &str, available: impl IntoIterator<Item = &'a str>) -> Self {
        let list: Vec<&str> = available.into_iter().collect();
        ResolveError::UnknownStruct {
            name: name.to_string(),
            available: if list.is_empty() {
                "none".into()
            } else {
                list.join(", ")
            },
        }
    }
}

/// Errors that can occur while decoding calldata or an encoded struct.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid hex input: {reason}")]
    InvalidHex { reason: String },

    #[error("Calldata too short: {len} bytes (need at least {min})")]
    CalldataTooShort { len: usize, min: usize },

    #[error("Invalid function signature '{signature}': {reason}")]
    InvalidSignature { signature: String, reason: String },

    #[error("No signature found for selector {selector}")]
    SignatureNotFound { selector: String },

    #[error("Selector mismatch: calldata has {found}, signature '{signature}' expects {expected}")]
    SelectorMismatch {
        signature: String,
        expected: String,
        found: String,
    },

    #[error("ABI decode failed: {reason}")]
    AbiDecodeFailed { reason: String },

    #[error("ABI encode failed: {reason}")]
    AbiEncodeFailed { reason: String },

    #[error("Invalid ABI type '{ty}': {reason}")]
    InvalidType { ty: String, reason: String },

    #[error("No struct definitions found")]
    NoStructs,

    #[error("Several root structs found ({candidates}); pick one by name")]
    AmbiguousStruct { candidates: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
