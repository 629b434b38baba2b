//! Recursive reinterpretation of `bytes` values.
//!
//! A `bytes` argument is often itself calldata (Safe transactions, routers,
//! governance proposals). For each eligible argument the decoder tries, in
//! order: a Safe multi-send batch, then a function call whose signature the
//! resolver knows. Anything that does not decode stays raw.
//!
//! Failures here are never errors: the worst outcome is the original hex.

use std::sync::Arc;

use abilens_core::{
    call::{MultiSendBatch, NestedCall},
    hexutil::{decode_hex, encode_hex, leading_selector},
    resolver::SignatureResolver,
    types::DecodedValue,
};
use futures::future::BoxFuture;
use tracing::debug;

use crate::{
    call_decoder::decode_params, multisend, policy::FunctionPolicy, selector::selector_hex,
    signature::FunctionSpec,
};

/// Nesting levels below the top-level call that may be expanded.
pub const DEFAULT_MAX_DEPTH: usize = 16;

pub struct NestedDecoder {
    resolver: Arc<dyn SignatureResolver>,
    policy: FunctionPolicy,
    max_depth: usize,
}

impl NestedDecoder {
    pub fn new(resolver: Arc<dyn SignatureResolver>) -> Self {
        Self {
            resolver,
            policy: FunctionPolicy::with_defaults(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_policy(mut self, policy: FunctionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `0` disables nested decoding entirely.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn policy(&self) -> &FunctionPolicy {
        &self.policy
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn resolver(&self) -> &Arc<dyn SignatureResolver> {
        &self.resolver
    }

    /// Try to read `value` as a call one level below the top.
    ///
    /// Returns `DecodedValue::NestedCall` on success, otherwise `value`
    /// unchanged as `Bytes`.
    pub async fn try_decode_as_call(&self, value: &str) -> DecodedValue {
        self.call_or_bytes(value.to_string(), 1).await
    }

    /// Expand the eligible `bytes` arguments of a call decoded at `depth`.
    pub fn expand_params<'a>(
        &'a self,
        spec: &'a FunctionSpec,
        params: Vec<(String, DecodedValue)>,
        depth: usize,
    ) -> BoxFuture<'a, Vec<(String, DecodedValue)>> {
        Box::pin(async move {
            let mut out = Vec::with_capacity(params.len());
            for (i, (name, value)) in params.into_iter().enumerate() {
                let eligible = spec.inputs.get(i).is_some_and(|d| d.is_dynamic_bytes())
                    && self.policy.is_eligible(&spec.signature, i);
                let value = match value {
                    DecodedValue::Bytes(hex) if eligible => self.expand_bytes(hex, depth + 1).await,
                    other => other,
                };
                out.push((name, value));
            }
            out
        })
    }

    /// Multi-send first, then a function call, else the raw bytes.
    async fn expand_bytes(&self, hex: String, depth: usize) -> DecodedValue {
        if depth > self.max_depth {
            return DecodedValue::Bytes(hex);
        }
        let Ok(raw) = decode_hex(&hex) else {
            return DecodedValue::Bytes(hex);
        };
        if let Some(batch) = self.decode_multisend(&raw, depth).await {
            return DecodedValue::MultiSend(batch);
        }
        match self.decode_call(&raw, depth).await {
            Some(call) => DecodedValue::NestedCall(Box::new(call)),
            None => DecodedValue::Bytes(hex),
        }
    }

    /// A call, or the raw bytes. Used for payloads that are calldata by
    /// construction (multi-send records, relayed operations).
    pub fn call_or_bytes(&self, hex: String, depth: usize) -> BoxFuture<'_, DecodedValue> {
        Box::pin(async move {
            let Ok(raw) = decode_hex(&hex) else {
                return DecodedValue::Bytes(hex);
            };
            match self.decode_call(&raw, depth).await {
                Some(call) => DecodedValue::NestedCall(Box::new(call)),
                None => DecodedValue::Bytes(hex),
            }
        })
    }

    async fn decode_multisend(&self, raw: &[u8], depth: usize) -> Option<MultiSendBatch> {
        let records = multisend::parse(raw)?;
        let mut transactions = Vec::with_capacity(records.len());
        for record in &records {
            let data = self.call_or_bytes(encode_hex(record.data), depth + 1).await;
            transactions.push(record.to_transaction_with(data));
        }
        debug!(count = transactions.len(), depth, "decoded multi-send batch");
        Some(MultiSendBatch { transactions })
    }

    /// Decode `raw` against the first signature the resolver offers.
    fn decode_call<'a>(&'a self, raw: &'a [u8], depth: usize) -> BoxFuture<'a, Option<NestedCall>> {
        Box::pin(async move {
            if depth > self.max_depth {
                debug!(depth, "nesting limit reached, leaving bytes raw");
                return None;
            }
            let selector = leading_selector(raw)?;
            let candidates = self.resolver.lookup(selector).await;
            let Some(signature) = candidates.first() else {
                debug!(selector = %selector_hex(selector), "no signature for nested call");
                return None;
            };

            let spec = match FunctionSpec::parse(signature) {
                Ok(s) => s,
                Err(e) => {
                    debug!(%signature, error = %e, "unusable signature");
                    return None;
                }
            };
            let params = match decode_params(&spec.inputs, &raw[4..]) {
                Ok(p) => p,
                Err(e) => {
                    debug!(signature = %spec.signature, error = %e, "nested decode failed");
                    return None;
                }
            };
            let parameters = self.expand_params(&spec, params, depth).await;

            Some(NestedCall {
                signature: spec.signature.clone(),
                selector: selector_hex(selector),
                parameters,
                raw: encode_hex(raw),
            })
        })
    }
}

impl std::fmt::Debug for NestedDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NestedDecoder")
            .field("resolver", &self.resolver.name())
            .field("policy", &self.policy)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encoder::encode_call, multisend::MultiSendRecord};
    use abilens_core::call::Operation;
    use alloy_primitives::U256;
    use async_trait::async_trait;
    use std::collections::HashMap;

    const TRANSFER: &str = "transfer(address,uint256)";
    const FORWARD: &str = "forward(bytes)";
    const MULTISEND: &str = "multiSend(bytes)";

    /// In-memory resolver keyed by selector.
    struct Known(HashMap<[u8; 4], Vec<String>>);

    impl Known {
        fn new(signatures: &[&str]) -> Arc<Self> {
            let mut map: HashMap<[u8; 4], Vec<String>> = HashMap::new();
            for s in signatures {
                map.entry(crate::selector::selector_of(s))
                    .or_default()
                    .push(s.to_string());
            }
            Arc::new(Self(map))
        }
    }

    #[async_trait]
    impl SignatureResolver for Known {
        async fn lookup(&self, selector: [u8; 4]) -> Vec<String> {
            self.0.get(&selector).cloned().unwrap_or_default()
        }

        fn name(&self) -> &str {
            "known"
        }
    }

    fn transfer_calldata() -> Vec<u8> {
        encode_call(
            &FunctionSpec::parse(TRANSFER).unwrap(),
            &[
                DecodedValue::Address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045".into()),
                DecodedValue::Number("1000000".into()),
            ],
        )
        .unwrap()
    }

    fn forward(inner: &[u8]) -> Vec<u8> {
        encode_call(
            &FunctionSpec::parse(FORWARD).unwrap(),
            &[DecodedValue::Bytes(encode_hex(inner))],
        )
        .unwrap()
    }

    fn decoder() -> NestedDecoder {
        NestedDecoder::new(Known::new(&[TRANSFER, FORWARD, MULTISEND]))
    }

    #[tokio::test]
    async fn bytes_argument_becomes_call() {
        let value = decoder()
            .try_decode_as_call(&encode_hex(transfer_calldata()))
            .await;
        let call = value.as_nested_call().expect("nested call");
        assert_eq!(call.signature, TRANSFER);
        assert_eq!(call.selector, "0xa9059cbb");
        assert_eq!(call.parameter("param1"), Some(&DecodedValue::Number("1000000".into())));
    }

    #[tokio::test]
    async fn unknown_selector_stays_raw() {
        let hex = "0xdeadbeef0000";
        assert_eq!(
            decoder().try_decode_as_call(hex).await,
            DecodedValue::Bytes(hex.into())
        );
    }

    #[tokio::test]
    async fn too_short_stays_raw() {
        assert_eq!(
            decoder().try_decode_as_call("0xa9").await,
            DecodedValue::Bytes("0xa9".into())
        );
    }

    #[tokio::test]
    async fn mismatched_payload_stays_raw() {
        // right selector, missing arguments
        let hex = "0xa9059cbb0000";
        assert_eq!(
            decoder().try_decode_as_call(hex).await,
            DecodedValue::Bytes(hex.into())
        );
    }

    #[tokio::test]
    async fn recursion_is_bounded() {
        let mut data = transfer_calldata();
        for _ in 0..5 {
            data = forward(&data);
        }
        let hex = encode_hex(&data);

        let shallow = decoder().with_max_depth(2);
        let value = shallow.try_decode_as_call(&hex).await;
        let level1 = value.as_nested_call().unwrap();
        let level2 = level1.parameter("param0").unwrap().as_nested_call().unwrap();
        assert_eq!(level2.signature, FORWARD);
        assert!(matches!(level2.parameter("param0"), Some(DecodedValue::Bytes(_))));

        let deep = decoder();
        let mut value = deep.try_decode_as_call(&hex).await;
        let mut levels = 0;
        while let DecodedValue::NestedCall(call) = value {
            levels += 1;
            value = call
                .parameters
                .first()
                .map(|(_, v)| v.clone())
                .unwrap_or(DecodedValue::Bool(false));
        }
        assert_eq!(levels, 6);
    }

    #[tokio::test]
    async fn zero_depth_disables_expansion() {
        let spec = FunctionSpec::parse(FORWARD).unwrap();
        let params = vec![("param0".to_string(), DecodedValue::Bytes(encode_hex(transfer_calldata())))];
        let out = decoder()
            .with_max_depth(0)
            .expand_params(&spec, params.clone(), 0)
            .await;
        assert_eq!(out, params);
    }

    #[tokio::test]
    async fn policy_excludes_signature_blob() {
        let sig = "exec(bytes,bytes)";
        let spec = FunctionSpec::parse(sig).unwrap();
        let inner = encode_hex(transfer_calldata());
        let params = vec![
            ("param0".to_string(), DecodedValue::Bytes(inner.clone())),
            ("param1".to_string(), DecodedValue::Bytes(inner.clone())),
        ];
        let decoder = decoder().with_policy(FunctionPolicy::with_defaults().allow(sig, [0]));
        let out = decoder.expand_params(&spec, params, 0).await;
        assert!(out[0].1.as_nested_call().is_some());
        assert_eq!(out[1].1, DecodedValue::Bytes(inner));
    }

    #[tokio::test]
    async fn multisend_records_are_decoded() {
        let transfer = transfer_calldata();
        let batch = multisend::pack(&[
            MultiSendRecord {
                operation: Operation::Call,
                to: [0x11; 20],
                value: U256::ZERO,
                data: &transfer,
            },
            MultiSendRecord {
                operation: Operation::Call,
                to: [0x22; 20],
                value: U256::from(7u8),
                data: &[],
            },
        ]);
        let call = encode_call(
            &FunctionSpec::parse(MULTISEND).unwrap(),
            &[DecodedValue::Bytes(encode_hex(&batch))],
        )
        .unwrap();

        let value = decoder().try_decode_as_call(&encode_hex(call)).await;
        let outer = value.as_nested_call().unwrap();
        let Some(DecodedValue::MultiSend(batch)) = outer.parameter("param0") else {
            panic!("expected a multi-send batch");
        };
        assert_eq!(batch.transactions.len(), 2);
        assert_eq!(
            batch.transactions[0].data.as_nested_call().unwrap().signature,
            TRANSFER
        );
        assert_eq!(batch.transactions[1].data, DecodedValue::Bytes("0x".into()));
        assert_eq!(batch.transactions[1].value, "7");
    }
}
