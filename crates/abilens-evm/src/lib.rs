//! # abilens-evm
//!
//! Struct parsing and calldata decoding for EVM contracts.
//!
//! ## Implementation notes
//! - Uses `alloy-dyn-abi` for the ABI codec itself; everything here builds
//!   descriptors for it and post-processes what it returns
//! - Struct text → symbol table → resolved tuple descriptor → `abi.encode` blob
//! - Calldata → router / relay recognisers, else signature lookup → nested
//!   `bytes` expansion (multi-send batches and calls, depth-capped)

pub mod abi_type;
pub mod call_decoder;
pub mod decoder;
pub mod encoder;
pub mod guard;
pub mod l1_relay;
pub mod multisend;
pub mod nested;
pub mod normalizer;
pub mod policy;
pub mod render;
pub mod signature;
pub mod struct_parser;
pub mod type_resolver;
pub mod uniswap;

pub use abilens_core::selector;

pub use call_decoder::{decode_function_call, decode_params, decode_struct};
pub use decoder::{decode_struct_blob, CalldataDecoder};
pub use encoder::{encode_call, encode_call_json, encode_params};
pub use guard::{RequestGuard, RequestTicket};
pub use nested::NestedDecoder;
pub use policy::FunctionPolicy;
pub use render::{render_report, render_value};
pub use selector::{keccak256, selector_of};
pub use signature::FunctionSpec;
pub use struct_parser::{StructField, StructSymbolTable};
pub use type_resolver::{detect_roots, resolve};
