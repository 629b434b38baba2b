//! # abilens-core
//!
//! Core types, errors, and traits shared across the abilens crates.
//! The struct parser, the calldata decoders, and the signature registries
//! are all built on top of the interfaces defined here.

pub mod call;
pub mod config;
pub mod error;
pub mod hexutil;
pub mod resolver;
pub mod selector;
pub mod types;

pub use call::{
    DecodeReport, L1Operation, L1RelayCall, MultiSendBatch, MultiSendTransaction, NestedCall,
    Operation, PoolHop, UniswapCommand, UniswapParam, UniswapParamValue, UniswapRouterCall,
};
pub use config::DecoderConfig;
pub use error::{DecodeError, ResolveError};
pub use resolver::SignatureResolver;
pub use selector::{selector_hex, selector_of};
pub use types::{DecodedValue, TypeDescriptor};
