//! Signature lookup against 4byte.directory.
//!
//! # Feature Flag
//! This module requires the `remote` feature flag (enables `reqwest`).
//!
//! ```toml
//! abilens-registry = { version = "0.1", features = ["remote"] }
//! ```
//!
//! # Usage
//! ```ignore
//! let resolver = FourByteResolver::new()?;
//! let candidates = resolver.lookup([0xa9, 0x05, 0x9c, 0xbb]).await;
//! ```
//!
//! The directory accepts any submission, so collisions and junk entries
//! exist. Candidates whose text does not hash to the selector are
//! dropped, and the rest are ordered oldest first: the earliest
//! submission for a selector is almost always the real one.

#[cfg(feature = "remote")]
pub use imp::*;

#[cfg(not(feature = "remote"))]
compile_error!("The `remote` feature must be enabled to use abilens_registry::remote");

#[cfg(feature = "remote")]
mod imp {
    use abilens_core::{config::DecoderConfig, resolver::SignatureResolver};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use reqwest::{Client, StatusCode};
    use serde::{Deserialize, Serialize};
    use std::time::Duration;
    use tracing::{debug, warn};

    use abilens_core::selector::selector_of;

    pub const DEFAULT_BASE_URL: &str = "https://www.4byte.directory";
    const SERVICE: &str = "4byte.directory";
    const USER_AGENT: &str = concat!("abilens/", env!("CARGO_PKG_VERSION"));

    // ─── Error ────────────────────────────────────────────────────────────────

    #[derive(Debug, thiserror::Error)]
    pub enum RemoteError {
        #[error("HTTP request failed: {0}")]
        Http(#[from] reqwest::Error),

        #[error("Rate limited by {service}")]
        RateLimited { service: String },

        #[error("Unexpected HTTP status {status} from {service}")]
        Status { service: String, status: u16 },
    }

    // ─── 4byte.directory ─────────────────────────────────────────────────────

    #[derive(Debug, Deserialize)]
    struct FourByteResponse {
        results: Vec<FourByteResult>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct FourByteResult {
        pub id: u64,
        pub text_signature: String,
        #[serde(default)]
        pub hex_signature: String,
        #[serde(default)]
        pub created_at: Option<DateTime<Utc>>,
    }

    /// Keep candidates that hash to `selector`, oldest submission first.
    pub fn rank_candidates(selector: [u8; 4], mut results: Vec<FourByteResult>) -> Vec<String> {
        results.retain(|r| selector_of(&r.text_signature) == selector);
        results.sort_by(|a, b| match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => x.cmp(&y).then(a.id.cmp(&b.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        results.into_iter().map(|r| r.text_signature).collect()
    }

    // ─── Resolver ────────────────────────────────────────────────────────────

    pub struct FourByteResolver {
        client: Client,
        base_url: String,
    }

    impl FourByteResolver {
        /// Resolver for the public directory with a 10 second timeout.
        pub fn new() -> Result<Self, RemoteError> {
            Self::with_timeout(DEFAULT_BASE_URL, Duration::from_secs(10))
        }

        pub fn from_config(config: &DecoderConfig) -> Result<Self, RemoteError> {
            Self::with_timeout(
                &config.fourbyte_url,
                Duration::from_secs(config.http_timeout_secs),
            )
        }

        pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
            let client = Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()?;
            Ok(Self {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            })
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        /// Raw directory entries for `selector`, unfiltered.
        pub async fn fetch(&self, selector: [u8; 4]) -> Result<Vec<FourByteResult>, RemoteError> {
            let url = format!(
                "{}/api/v1/signatures/?hex_signature=0x{}",
                self.base_url,
                hex::encode(selector)
            );

            let resp = self.client.get(&url).send().await?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                return Err(RemoteError::RateLimited {
                    service: SERVICE.into(),
                });
            }
            if !resp.status().is_success() {
                return Err(RemoteError::Status {
                    service: SERVICE.into(),
                    status: resp.status().as_u16(),
                });
            }

            let body: FourByteResponse = resp.json().await?;
            Ok(body.results)
        }
    }

    #[async_trait]
    impl SignatureResolver for FourByteResolver {
        async fn lookup(&self, selector: [u8; 4]) -> Vec<String> {
            let selector_hex = hex::encode(selector);
            match self.fetch(selector).await {
                Ok(results) => {
                    let total = results.len();
                    let ranked = rank_candidates(selector, results);
                    debug!(selector = %selector_hex, total, kept = ranked.len(), "4byte lookup");
                    ranked
                }
                Err(RemoteError::RateLimited { .. }) => {
                    warn!(selector = %selector_hex, "4byte.directory rate limit hit");
                    Vec::new()
                }
                Err(e) => {
                    warn!(selector = %selector_hex, error = %e, "4byte.directory lookup failed");
                    Vec::new()
                }
            }
        }

        fn name(&self) -> &str {
            "4byte"
        }
    }

}
