//! # abilens-observability
//!
//! Structured logging for abilens.
//!
//! Log levels are configurable globally and per component; output is
//! human-readable text or JSON (compatible with ELK, Loki, CloudWatch).
//! Logs go to stderr so decoded output on stdout stays machine-readable.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
