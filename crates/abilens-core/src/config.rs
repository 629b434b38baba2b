//! Decoder configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tunables for the calldata decoder and the signature lookup stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// How many nested `bytes` levels are reinterpreted as calls before giving up
    #[serde(default = "default_max_nested_depth")]
    pub max_nested_depth: usize,
    /// Lifetime of a cached selector lookup, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Entry count past which expired cache entries are evicted
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Base URL of the 4byte.directory API
    #[serde(default = "default_fourbyte_url")]
    pub fourbyte_url: String,
    /// HTTP timeout for signature lookups, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Only consult the bundled signature set, never the network
    #[serde(default)]
    pub offline: bool,
    /// Extra nested-decode allow-lists: signature → eligible parameter indices
    #[serde(default)]
    pub nested_allowlist: HashMap<String, Vec<usize>>,
}

fn default_max_nested_depth() -> usize { 16 }
fn default_cache_ttl_secs() -> u64 { 3_600 }
fn default_cache_capacity() -> usize { 1_000 }
fn default_fourbyte_url() -> String { "https://www.4byte.directory".into() }
fn default_http_timeout_secs() -> u64 { 10 }

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_nested_depth: default_max_nested_depth(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            fourbyte_url: default_fourbyte_url(),
            http_timeout_secs: default_http_timeout_secs(),
            offline: false,
            nested_allowlist: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let cfg: DecoderConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, DecoderConfig::default());
        assert_eq!(cfg.cache_ttl_secs, 3_600);
        assert_eq!(cfg.cache_capacity, 1_000);
    }

    #[test]
    fn partial_yaml_overrides() {
        let yaml = "
max_nested_depth: 4
offline: true
nested_allowlist:
  \"foo(bytes,bytes)\": [1]
";
        let cfg: DecoderConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.max_nested_depth, 4);
        assert!(cfg.offline);
        assert_eq!(cfg.nested_allowlist["foo(bytes,bytes)"], vec![1]);
        assert_eq!(cfg.fourbyte_url, "https://www.4byte.directory");
    }
}
