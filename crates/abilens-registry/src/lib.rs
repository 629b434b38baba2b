//! # abilens-registry
//!
//! Signature resolvers for abilens.
//!
//! ## Levels
//! 1. **In-Memory Registry**: bundled well-known signatures plus anything registered at runtime
//! 2. **Caching Resolver**: TTL + capacity bounded cache in front of any resolver
//! 3. **Remote Resolver**: 4byte.directory over HTTP (`remote` feature)
//!
//! The public-facing API is the `SignatureResolver` trait from `abilens-core`.

pub mod cache;
pub mod chain;
pub mod memory;
#[cfg(feature = "remote")]
pub mod remote;

pub use cache::{CachingResolver, SignatureCache};
pub use chain::ResolverChain;
pub use memory::MemorySignatureRegistry;

#[cfg(feature = "remote")]
pub use remote::FourByteResolver;
