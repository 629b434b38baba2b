//! Top-level decoding entry points.
//!
//! # Order of attempts for calldata
//! 1. Universal Router `execute` (selector match, then outer decode)
//! 2. zkSync `sendToL1` (selector match, then proposal decode)
//! 3. The explicit signature, or the first one the resolver knows
//! 4. Nested expansion of the decoded `bytes` arguments
//!
//! Steps 1 and 2 are opportunistic: a no-match falls through to step 3.
//! Only step 3 can fail the whole decode.

use std::sync::Arc;

use abilens_core::{
    call::{DecodeReport, L1RelayCall, NestedCall},
    config::DecoderConfig,
    error::DecodeError,
    hexutil::{decode_hex, encode_hex, leading_selector},
    resolver::SignatureResolver,
    types::DecodedValue,
};
use tracing::debug;

use crate::{
    call_decoder::{decode_function_call, decode_params, decode_struct},
    guard::RequestGuard,
    l1_relay,
    nested::NestedDecoder,
    policy::FunctionPolicy,
    selector::selector_hex,
    signature::FunctionSpec,
    struct_parser::StructSymbolTable,
    type_resolver::{detect_roots, resolve},
    uniswap,
};

/// Decodes calldata end to end: recognisers, signature lookup, and nested
/// expansion.
#[derive(Debug)]
pub struct CalldataDecoder {
    nested: NestedDecoder,
    guard: RequestGuard,
}

impl CalldataDecoder {
    pub fn new(resolver: Arc<dyn SignatureResolver>) -> Self {
        Self {
            nested: NestedDecoder::new(resolver),
            guard: RequestGuard::new(),
        }
    }

    /// Depth cap and policy from `config`; its allow-list entries are merged
    /// over the built-in table.
    pub fn from_config(resolver: Arc<dyn SignatureResolver>, config: &DecoderConfig) -> Self {
        let mut policy = FunctionPolicy::with_defaults();
        for (signature, indices) in &config.nested_allowlist {
            policy.insert(signature, indices.iter().copied());
        }
        Self::new(resolver)
            .with_policy(policy)
            .with_max_depth(config.max_nested_depth)
    }

    pub fn with_policy(mut self, policy: FunctionPolicy) -> Self {
        self.nested = self.nested.with_policy(policy);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.nested = self.nested.with_max_depth(max_depth);
        self
    }

    pub fn nested(&self) -> &NestedDecoder {
        &self.nested
    }

    pub fn guard(&self) -> &RequestGuard {
        &self.guard
    }

    /// Decode selector-prefixed calldata, looking the signature up.
    ///
    /// # Errors
    /// Invalid hex, fewer than four bytes, no known signature for the
    /// selector, or arguments that do not fit the signature.
    pub async fn decode(&self, calldata_hex: &str) -> Result<DecodedValue, DecodeError> {
        if let Some(value) = self.recognise(calldata_hex).await {
            return Ok(value);
        }

        let raw = decode_hex(calldata_hex)?;
        let selector = leading_selector(&raw).ok_or(DecodeError::CalldataTooShort {
            len: raw.len(),
            min: 4,
        })?;
        let candidates = self.nested.resolver().lookup(selector).await;
        let signature = candidates.first().ok_or_else(|| DecodeError::SignatureNotFound {
            selector: selector_hex(selector),
        })?;
        debug!(%signature, candidates = candidates.len(), "resolved top-level selector");

        let spec = FunctionSpec::parse(signature)?;
        self.finish(decode_function_call(&spec, &raw)?, &spec).await
    }

    /// Decode against a caller-supplied signature.
    ///
    /// With `with_selector` the first four bytes are skipped whatever they
    /// are; a selector that differs from the signature's is only logged.
    /// Without it the data is the bare argument encoding.
    pub async fn decode_with_signature(
        &self,
        signature: &str,
        data_hex: &str,
        with_selector: bool,
    ) -> Result<DecodedValue, DecodeError> {
        let spec = FunctionSpec::parse(signature)?;

        if with_selector {
            if let Some(value) = self.recognise(data_hex).await {
                return Ok(value);
            }
        }

        let raw = decode_hex(data_hex)?;
        let args = if with_selector {
            let found = leading_selector(&raw).ok_or(DecodeError::CalldataTooShort {
                len: raw.len(),
                min: 4,
            })?;
            if found != spec.selector {
                debug!(
                    signature = %spec.signature,
                    found = %selector_hex(found),
                    "selector differs from the given signature, decoding anyway"
                );
            }
            &raw[4..]
        } else {
            &raw[..]
        };

        let call = NestedCall {
            signature: spec.signature.clone(),
            selector: spec.selector_hex(),
            parameters: decode_params(&spec.inputs, args)?,
            raw: encode_hex(&raw),
        };
        self.finish(call, &spec).await
    }

    /// [`decode`](Self::decode) or [`decode_with_signature`](Self::decode_with_signature),
    /// folded into a report.
    pub async fn decode_report(
        &self,
        data_hex: &str,
        signature: Option<&str>,
        with_selector: bool,
    ) -> DecodeReport {
        let result = match signature {
            Some(sig) => self.decode_with_signature(sig, data_hex, with_selector).await,
            None => self.decode(data_hex).await,
        };
        DecodeReport::from(result)
    }

    /// Like [`decode_report`](Self::decode_report), but `None` when another
    /// request started on this decoder before this one finished.
    pub async fn decode_latest(
        &self,
        data_hex: &str,
        signature: Option<&str>,
        with_selector: bool,
    ) -> Option<DecodeReport> {
        let ticket = self.guard.begin();
        let report = self.decode_report(data_hex, signature, with_selector).await;
        if self.guard.is_current(ticket) {
            Some(report)
        } else {
            debug!(?ticket, "dropping superseded decode");
            None
        }
    }

    async fn finish(&self, mut call: NestedCall, spec: &FunctionSpec) -> Result<DecodedValue, DecodeError> {
        let params = std::mem::take(&mut call.parameters);
        call.parameters = self.nested.expand_params(spec, params, 0).await;
        Ok(DecodedValue::NestedCall(Box::new(call)))
    }

    /// Router and relay recognisers, top level only.
    async fn recognise(&self, calldata_hex: &str) -> Option<DecodedValue> {
        if uniswap::is_candidate_hex(calldata_hex) {
            match uniswap::decode_hex(calldata_hex) {
                Some(call) => return Some(DecodedValue::UniswapRouter(call)),
                None => debug!("universal router selector without a decodable body"),
            }
        }

        let raw = decode_hex(calldata_hex).ok()?;
        if l1_relay::is_candidate(&raw) {
            match l1_relay::decode(&raw) {
                Some(relay) => return Some(DecodedValue::L1Relay(self.expand_relay(relay).await)),
                None => debug!("sendToL1 selector without a proposal body"),
            }
        }
        None
    }

    async fn expand_relay(&self, mut relay: L1RelayCall) -> L1RelayCall {
        for op in &mut relay.operations {
            if let DecodedValue::Bytes(hex) = &op.calldata {
                op.calldata = self.nested.call_or_bytes(hex.clone(), 1).await;
            }
        }
        relay
    }
}

// ─── Struct blobs ────────────────────────────────────────────────────────────

/// Decode `abi.encode(s)` for a struct declared in `definitions`.
///
/// Without `name`, the single root struct is used.
///
/// # Errors
/// `NoStructs` when nothing is declared, `AmbiguousStruct` when several
/// roots exist and no name was given, any `ResolveError`, and ABI failures.
pub fn decode_struct_blob(
    definitions: &str,
    name: Option<&str>,
    data_hex: &str,
) -> Result<(String, DecodedValue), DecodeError> {
    let table = StructSymbolTable::parse(definitions);
    if table.structs.is_empty() {
        return Err(DecodeError::NoStructs);
    }

    let name = match name {
        Some(n) => n.to_string(),
        None => {
            let mut roots = detect_roots(&table);
            if roots.len() != 1 {
                return Err(DecodeError::AmbiguousStruct {
                    candidates: roots.join(", "),
                });
            }
            roots.remove(0)
        }
    };

    let desc = resolve(&name, &table)?;
    let value = decode_struct(&desc, &decode_hex(data_hex)?)?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode_call, encode_params};
    use abilens_core::types::TypeDescriptor;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    struct Known(HashMap<[u8; 4], Vec<String>>);

    #[async_trait]
    impl SignatureResolver for Known {
        async fn lookup(&self, selector: [u8; 4]) -> Vec<String> {
            self.0.get(&selector).cloned().unwrap_or_default()
        }

        fn name(&self) -> &str {
            "known"
        }
    }

    fn resolver(signatures: &[&str]) -> Arc<Known> {
        let mut map: HashMap<[u8; 4], Vec<String>> = HashMap::new();
        for s in signatures {
            map.entry(crate::selector::selector_of(s))
                .or_default()
                .push(s.to_string());
        }
        Arc::new(Known(map))
    }

    /// Sleeps before answering, to let a second request overtake.
    struct Slow(Duration);

    #[async_trait]
    impl SignatureResolver for Slow {
        async fn lookup(&self, _selector: [u8; 4]) -> Vec<String> {
            tokio::time::sleep(self.0).await;
            vec!["transfer(address,uint256)".into()]
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    const EXEC: &str =
        "execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)";

    fn transfer_hex() -> String {
        "0xa9059cbb000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045\
         00000000000000000000000000000000000000000000000000000000000f4240"
            .into()
    }

    #[tokio::test]
    async fn resolved_top_level_call() {
        let decoder = CalldataDecoder::new(resolver(&["transfer(address,uint256)"]));
        let value = decoder.decode(&transfer_hex()).await.unwrap();
        let call = value.as_nested_call().unwrap();
        assert_eq!(call.function_name(), "transfer");
        assert_eq!(call.parameter("param1").unwrap().as_number(), Some("1000000"));
        assert_eq!(call.raw, transfer_hex());
    }

    #[tokio::test]
    async fn unknown_top_level_selector_is_an_error() {
        let decoder = CalldataDecoder::new(resolver(&[]));
        let err = decoder.decode(&transfer_hex()).await.unwrap_err();
        assert_eq!(err.to_string(), "No signature found for selector 0xa9059cbb");

        let report = decoder.decode_report(&transfer_hex(), None, true).await;
        assert!(report.is_error());
    }

    #[tokio::test]
    async fn bad_input_is_an_error_not_a_panic() {
        let decoder = CalldataDecoder::new(resolver(&[]));
        assert!(matches!(decoder.decode("0xzz").await, Err(DecodeError::InvalidHex { .. })));
        assert!(matches!(
            decoder.decode("0xa905").await,
            Err(DecodeError::CalldataTooShort { len: 2, min: 4 })
        ));
    }

    #[tokio::test]
    async fn explicit_signature_with_and_without_selector() {
        let decoder = CalldataDecoder::new(resolver(&[]));
        let sig = "transfer(address to, uint256 amount)";

        let with = decoder.decode_with_signature(sig, &transfer_hex(), true).await.unwrap();
        let with = with.as_nested_call().unwrap();
        assert_eq!(with.parameter("amount").unwrap().as_number(), Some("1000000"));

        let full = transfer_hex();
        let without = decoder.decode_with_signature(sig, &full[10..], false).await.unwrap();
        assert_eq!(without.as_nested_call().unwrap().parameters, with.parameters);

        let err = decoder.decode_with_signature(sig, "0xa905", true).await.unwrap_err();
        assert!(matches!(err, DecodeError::CalldataTooShort { len: 2, min: 4 }));
    }

    #[tokio::test]
    async fn explicit_signature_skips_a_foreign_selector() {
        let decoder = CalldataDecoder::new(resolver(&[]));
        let value = decoder
            .decode_with_signature("send(address dst, uint256 wad)", &transfer_hex(), true)
            .await
            .unwrap();
        let call = value.as_nested_call().unwrap();
        assert_eq!(call.signature, "send(address,uint256)");
        assert_eq!(call.selector, FunctionSpec::parse("send(address,uint256)").unwrap().selector_hex());
        assert_eq!(call.parameter("wad").unwrap().as_number(), Some("1000000"));
        assert_eq!(call.raw, transfer_hex());
    }

    #[tokio::test]
    async fn explicit_signature_with_named_tuple_members() {
        let decoder = CalldataDecoder::new(resolver(&[]));
        let sig = "run((address target, uint256 value)[] ops)";
        let spec = FunctionSpec::parse(sig).unwrap();
        let op = |value: &str| {
            DecodedValue::Tuple(vec![
                ("target".into(), DecodedValue::Address(format!("0x{}", "cd".repeat(20)))),
                ("value".into(), DecodedValue::Number(value.into())),
            ])
        };
        let calldata = encode_call(&spec, &[DecodedValue::Array(vec![op("1"), op("2")])]).unwrap();

        let value = decoder.decode_with_signature(sig, &encode_hex(calldata), true).await.unwrap();
        let call = value.as_nested_call().unwrap();
        let DecodedValue::Array(ops) = call.parameter("ops").unwrap() else {
            panic!("ops should decode as an array");
        };
        assert_eq!(ops[1].field("value").and_then(|v| v.as_number()), Some("2"));
        assert!(ops[0].field("target").is_some());
    }

    #[tokio::test]
    async fn safe_transaction_expands_data_only() {
        let decoder = CalldataDecoder::new(resolver(&["transfer(address,uint256)", EXEC]));
        let spec = FunctionSpec::parse(EXEC).unwrap();
        let zero = DecodedValue::Address(format!("0x{}", "00".repeat(20)));
        let n = |v: &str| DecodedValue::Number(v.into());
        let calldata = encode_call(
            &spec,
            &[
                DecodedValue::Address(format!("0x{}", "aa".repeat(20))),
                n("0"),
                DecodedValue::Bytes(transfer_hex()),
                n("0"),
                n("0"),
                n("0"),
                n("0"),
                zero.clone(),
                zero,
                // a signature blob that happens to start with a known selector
                DecodedValue::Bytes(transfer_hex()),
            ],
        )
        .unwrap();

        let value = decoder.decode(&encode_hex(calldata)).await.unwrap();
        let call = value.as_nested_call().unwrap();
        assert!(call.parameter("param2").unwrap().as_nested_call().is_some());
        assert_eq!(call.parameter("param9"), Some(&DecodedValue::Bytes(transfer_hex())));
    }

    #[tokio::test]
    async fn safe_signatures_holding_a_batch_stay_bytes() {
        use crate::multisend::{pack, MultiSendRecord};
        use abilens_core::call::Operation;
        use alloy_primitives::U256;

        let decoder = CalldataDecoder::new(resolver(&["transfer(address,uint256)", EXEC]));
        let inner = decode_hex(&transfer_hex()).unwrap();
        let batch = encode_hex(pack(&[MultiSendRecord {
            operation: Operation::Call,
            to: [0x11; 20],
            value: U256::ZERO,
            data: &inner,
        }]));

        let spec = FunctionSpec::parse(EXEC).unwrap();
        let zero = DecodedValue::Address(format!("0x{}", "00".repeat(20)));
        let n = |v: &str| DecodedValue::Number(v.into());
        let calldata = encode_call(
            &spec,
            &[
                DecodedValue::Address(format!("0x{}", "aa".repeat(20))),
                n("0"),
                DecodedValue::Bytes(batch.clone()),
                n("0"),
                n("0"),
                n("0"),
                n("0"),
                zero.clone(),
                zero,
                DecodedValue::Bytes(batch.clone()),
            ],
        )
        .unwrap();

        let value = decoder.decode(&encode_hex(calldata)).await.unwrap();
        let call = value.as_nested_call().unwrap();
        let DecodedValue::MultiSend(expanded) = call.parameter("param2").unwrap() else {
            panic!("data should expand into a batch");
        };
        assert_eq!(expanded.transactions.len(), 1);
        assert_eq!(call.parameter("param9"), Some(&DecodedValue::Bytes(batch)));
    }

    #[tokio::test]
    async fn config_allowlist_extends_policy() {
        let sig = "relay(bytes,bytes)";
        let mut config = DecoderConfig::default();
        config.nested_allowlist.insert(sig.into(), vec![1]);
        let decoder = CalldataDecoder::from_config(resolver(&["transfer(address,uint256)", sig]), &config);

        let calldata = encode_call(
            &FunctionSpec::parse(sig).unwrap(),
            &[DecodedValue::Bytes(transfer_hex()), DecodedValue::Bytes(transfer_hex())],
        )
        .unwrap();
        let value = decoder.decode(&encode_hex(calldata)).await.unwrap();
        let call = value.as_nested_call().unwrap();
        assert!(matches!(call.parameter("param0"), Some(DecodedValue::Bytes(_))));
        assert!(call.parameter("param1").unwrap().as_nested_call().is_some());
    }

    #[tokio::test]
    async fn relay_operations_are_expanded() {
        let decoder = CalldataDecoder::new(resolver(&["transfer(address,uint256)"]));
        let fields = vec![
            TypeDescriptor::tuple(
                "operations",
                "[]",
                vec![
                    TypeDescriptor::new("target", "address"),
                    TypeDescriptor::new("value", "uint256"),
                    TypeDescriptor::new("calldata", "bytes"),
                ],
            ),
            TypeDescriptor::new("executor", "address"),
            TypeDescriptor::new("salt", "bytes32"),
        ];
        let message = encode_params(
            &fields,
            &[
                DecodedValue::Array(vec![DecodedValue::Tuple(vec![
                    ("target".into(), DecodedValue::Address(format!("0x{}", "ab".repeat(20)))),
                    ("value".into(), DecodedValue::Number("0".into())),
                    ("calldata".into(), DecodedValue::Bytes(transfer_hex())),
                ])]),
                DecodedValue::Address(format!("0x{}", "00".repeat(20))),
                DecodedValue::Bytes(format!("0x{}", "00".repeat(32))),
            ],
        )
        .unwrap();
        let mut calldata = l1_relay::SEND_TO_L1.to_vec();
        calldata.extend(
            encode_params(
                &[TypeDescriptor::new("message", "bytes")],
                &[DecodedValue::Bytes(encode_hex(message))],
            )
            .unwrap(),
        );

        let value = decoder.decode(&encode_hex(calldata)).await.unwrap();
        let DecodedValue::L1Relay(relay) = value else {
            panic!("expected a relay call");
        };
        assert_eq!(
            relay.operations[0].calldata.as_nested_call().unwrap().function_name(),
            "transfer"
        );
    }

    #[tokio::test]
    async fn superseded_request_yields_nothing() {
        let decoder = Arc::new(CalldataDecoder::new(Arc::new(Slow(Duration::from_millis(200)))));
        let slow = {
            let decoder = Arc::clone(&decoder);
            tokio::spawn(async move { decoder.decode_latest(&transfer_hex(), None, true).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        let fresh = decoder.decode_latest(&transfer_hex(), None, true).await;

        assert!(fresh.is_some());
        assert!(slow.await.unwrap().is_none());
    }

    #[test]
    fn struct_blob_with_single_root() {
        let defs = "struct Inner { uint256 a; } struct Outer { Inner inner; bool ok; }";
        let desc = resolve("Outer", &StructSymbolTable::parse(defs)).unwrap();
        let blob = encode_params(
            std::slice::from_ref(&desc),
            &[DecodedValue::Tuple(vec![
                ("inner".into(), DecodedValue::Tuple(vec![("a".into(), DecodedValue::Number("7".into()))])),
                ("ok".into(), DecodedValue::Bool(true)),
            ])],
        )
        .unwrap();

        let (name, value) = decode_struct_blob(defs, None, &encode_hex(&blob)).unwrap();
        assert_eq!(name, "Outer");
        assert_eq!(
            value.field("inner").and_then(|i| i.field("a")).and_then(|a| a.as_number()),
            Some("7")
        );
    }

    #[test]
    fn struct_blob_errors() {
        assert!(matches!(decode_struct_blob("", None, "0x"), Err(DecodeError::NoStructs)));
        assert!(matches!(
            decode_struct_blob("struct A { uint8 x; } struct B { uint8 y; }", None, "0x"),
            Err(DecodeError::AmbiguousStruct { .. })
        ));
        assert!(matches!(
            decode_struct_blob("struct A { uint8 x; }", Some("Z"), "0x"),
            Err(DecodeError::Resolve(_))
        ));
    }
}
