//! ABI encoder, the inverse of `call_decoder`.
//!
//! Takes `DecodedValue` arguments (decimal-string numbers, hex bytes) and
//! produces ABI-encoded parameters or full calldata. JSON arguments from the
//! command line are mapped onto `DecodedValue` first.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, FixedBytes, I256, U256};
use abilens_core::{
    error::DecodeError,
    hexutil::decode_hex,
    types::{DecodedValue, TypeDescriptor},
};
use serde_json::Value;
use std::str::FromStr;

use crate::{abi_type, signature::FunctionSpec};

/// Encode `args` as a parameter list for `inputs` (no selector).
pub fn encode_params(inputs: &[TypeDescriptor], args: &[DecodedValue]) -> Result<Vec<u8>, DecodeError> {
    if inputs.len() != args.len() {
        return Err(DecodeError::AbiEncodeFailed {
            reason: format!(
                "argument count mismatch: expected {}, got {}",
                inputs.len(),
                args.len()
            ),
        });
    }

    let mut values = Vec::with_capacity(args.len());
    for (desc, arg) in inputs.iter().zip(args) {
        let ty = abi_type::to_sol_type(desc)?;
        let val = to_dyn_value(arg, &ty).map_err(|reason| DecodeError::AbiEncodeFailed {
            reason: format!("param '{}': {reason}", desc.name),
        })?;
        values.push(val);
    }
    Ok(DynSolValue::Tuple(values).abi_encode_params())
}

/// Encode a call: `selector ++ encode_params(inputs, args)`.
pub fn encode_call(spec: &FunctionSpec, args: &[DecodedValue]) -> Result<Vec<u8>, DecodeError> {
    let mut calldata = spec.selector.to_vec();
    calldata.extend(encode_params(&spec.inputs, args)?);
    Ok(calldata)
}

/// Encode a call from a JSON array holding one entry per input.
pub fn encode_call_json(spec: &FunctionSpec, args: &Value) -> Result<Vec<u8>, DecodeError> {
    let items = args.as_array().ok_or_else(|| DecodeError::AbiEncodeFailed {
        reason: "arguments must be a JSON array".into(),
    })?;
    if items.len() != spec.inputs.len() {
        return Err(DecodeError::AbiEncodeFailed {
            reason: format!(
                "argument count mismatch: expected {}, got {}",
                spec.inputs.len(),
                items.len()
            ),
        });
    }
    let values = spec
        .inputs
        .iter()
        .zip(items)
        .map(|(desc, item)| {
            value_from_json(item, desc).map_err(|reason| DecodeError::AbiEncodeFailed {
                reason: format!("param '{}': {reason}", desc.name),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    encode_call(spec, &values)
}

/// Map one JSON argument onto the value shape `desc` expects.
///
/// Integers accept JSON numbers or strings (decimal or `0x` hex). Addresses,
/// `bytes` and `bytesN` are hex strings. Tuples take an array in member order
/// or an object keyed by member name.
pub fn value_from_json(json: &Value, desc: &TypeDescriptor) -> Result<DecodedValue, String> {
    if let Some(element) = desc.element() {
        let items = json
            .as_array()
            .ok_or_else(|| format!("expected an array for {}", desc.canonical_type()))?;
        return items
            .iter()
            .map(|item| value_from_json(item, &element))
            .collect::<Result<Vec<_>, _>>()
            .map(DecodedValue::Array);
    }

    if desc.is_tuple() {
        let fields = match json {
            Value::Array(items) if items.len() == desc.components.len() => desc
                .components
                .iter()
                .zip(items)
                .map(|(member, item)| -> Result<_, String> {
                    Ok((member.name.clone(), value_from_json(item, member)?))
                })
                .collect::<Result<Vec<_>, String>>()?,
            Value::Array(items) => {
                return Err(format!(
                    "tuple arity mismatch: expected {}, got {}",
                    desc.components.len(),
                    items.len()
                ))
            }
            Value::Object(map) => desc
                .components
                .iter()
                .map(|member| -> Result<_, String> {
                    let item = map
                        .get(&member.name)
                        .ok_or_else(|| format!("missing tuple member '{}'", member.name))?;
                    Ok((member.name.clone(), value_from_json(item, member)?))
                })
                .collect::<Result<Vec<_>, String>>()?,
            other => return Err(format!("expected an array or object for a tuple, got {other}")),
        };
        return Ok(DecodedValue::Tuple(fields));
    }

    let base = desc.base_kind();
    let integer = base.starts_with("uint") || base.starts_with("int");
    match json {
        Value::Bool(b) if base == "bool" => Ok(DecodedValue::Bool(*b)),
        Value::String(s) if base == "bool" => s
            .trim()
            .parse()
            .map(DecodedValue::Bool)
            .map_err(|_| format!("expected true or false, got '{s}'")),
        Value::Number(n) if integer => Ok(DecodedValue::Number(n.to_string())),
        Value::String(s) if integer => Ok(DecodedValue::Number(s.trim().to_string())),
        Value::String(s) if base == "address" => Ok(DecodedValue::Address(s.trim().to_string())),
        Value::String(s) if base == "string" => Ok(DecodedValue::String(s.clone())),
        Value::String(s) if base.starts_with("bytes") => Ok(DecodedValue::Bytes(s.trim().to_string())),
        other => Err(format!("cannot use {other} as {}", desc.canonical_type())),
    }
}

/// Convert a `DecodedValue` to the alloy value for the expected type.
///
/// A `NestedCall` stands in for its raw bytes, so decoded trees re-encode.
pub fn to_dyn_value(val: &DecodedValue, expected: &DynSolType) -> Result<DynSolValue, String> {
    match (val, expected) {
        (DecodedValue::Bool(b), DynSolType::Bool) => Ok(DynSolValue::Bool(*b)),

        (DecodedValue::Number(s), DynSolType::Uint(bits)) => {
            let u = U256::from_str(s).map_err(|e| format!("uint parse '{s}': {e}"))?;
            Ok(DynSolValue::Uint(u, *bits))
        }

        (DecodedValue::Number(s), DynSolType::Int(bits)) => {
            let i = I256::from_str(s).map_err(|e| format!("int parse '{s}': {e}"))?;
            Ok(DynSolValue::Int(i, *bits))
        }

        (DecodedValue::Address(s), DynSolType::Address) => {
            let addr = Address::from_str(s).map_err(|e| format!("address parse: {e}"))?;
            Ok(DynSolValue::Address(addr))
        }

        (DecodedValue::Bytes(s), DynSolType::Bytes) => {
            Ok(DynSolValue::Bytes(decode_hex(s).map_err(|e| e.to_string())?))
        }

        (DecodedValue::NestedCall(call), DynSolType::Bytes) => {
            Ok(DynSolValue::Bytes(decode_hex(&call.raw).map_err(|e| e.to_string())?))
        }

        (DecodedValue::Bytes(s), DynSolType::FixedBytes(n)) => {
            let b = decode_hex(s).map_err(|e| e.to_string())?;
            if b.len() != *n {
                return Err(format!("bytes{n}: got {} bytes", b.len()));
            }
            let mut word = [0u8; 32];
            word[..*n].copy_from_slice(&b);
            Ok(DynSolValue::FixedBytes(FixedBytes::from(word), *n))
        }

        (DecodedValue::String(s), DynSolType::String) => Ok(DynSolValue::String(s.clone())),

        (DecodedValue::Array(elems), DynSolType::Array(inner)) => {
            let dyn_elems: Result<Vec<_>, _> =
                elems.iter().map(|e| to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::Array(dyn_elems?))
        }

        (DecodedValue::Array(elems), DynSolType::FixedArray(inner, len)) => {
            if elems.len() != *len {
                return Err(format!(
                    "fixed array length mismatch: expected {len}, got {}",
                    elems.len()
                ));
            }
            let dyn_elems: Result<Vec<_>, _> =
                elems.iter().map(|e| to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::FixedArray(dyn_elems?))
        }

        (DecodedValue::Tuple(fields), DynSolType::Tuple(types)) => {
            if fields.len() != types.len() {
                return Err(format!(
                    "tuple arity mismatch: expected {}, got {}",
                    types.len(),
                    fields.len()
                ));
            }
            let dyn_elems: Result<Vec<_>, _> = fields
                .iter()
                .zip(types)
                .map(|((_, v), t)| to_dyn_value(v, t))
                .collect();
            Ok(DynSolValue::Tuple(dyn_elems?))
        }

        _ => Err(format!("cannot encode {val} as {expected:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_decoder::{decode_function_call, decode_values};

    #[test]
    fn transfer_roundtrip() {
        let spec = FunctionSpec::parse("transfer(address to, uint256 amount)").unwrap();
        let args = vec![
            DecodedValue::Address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045".into()),
            DecodedValue::Number("1000000".into()),
        ];
        let calldata = encode_call(&spec, &args).unwrap();
        assert_eq!(hex::encode(&calldata[..4]), "a9059cbb");
        assert_eq!(calldata.len(), 4 + 64);

        let call = decode_function_call(&spec, &calldata).unwrap();
        let decoded: Vec<DecodedValue> = call.parameters.into_iter().map(|(_, v)| v).collect();
        assert_eq!(decoded, args);
    }

    #[test]
    fn nested_types_roundtrip() {
        let spec = FunctionSpec::parse(
            "submit((string name, int24 tick, bytes32 salt)[] items, uint8[2] pair, bool flag, bytes extra)",
        )
        .unwrap();
        let item = |name: &str, tick: &str| {
            DecodedValue::Tuple(vec![
                ("name".into(), DecodedValue::String(name.into())),
                ("tick".into(), DecodedValue::Number(tick.into())),
                ("salt".into(), DecodedValue::Bytes(format!("0x{}", "ab".repeat(32)))),
            ])
        };
        let args = vec![
            DecodedValue::Array(vec![item("a", "-887272"), item("bee", "60")]),
            DecodedValue::Array(vec![DecodedValue::Number("1".into()), DecodedValue::Number("255".into())]),
            DecodedValue::Bool(true),
            DecodedValue::Bytes("0x".into()),
        ];
        let data = encode_params(&spec.inputs, &args).unwrap();
        assert_eq!(decode_values(&spec.inputs, &data).unwrap(), args);
    }

    #[test]
    fn json_arguments_match_typed_ones() {
        let spec = FunctionSpec::parse(
            "submit((address target, uint256 value)[] ops, bool flag, bytes4 tag, string note, int8 delta)",
        )
        .unwrap();
        let target = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";
        let args = serde_json::json!([
            [{ "target": target, "value": 1 }, [target, "0x10"]],
            "true",
            "0xdeadbeef",
            "hello",
            -3
        ]);
        let calldata = encode_call_json(&spec, &args).unwrap();

        let call = decode_function_call(&spec, &calldata).unwrap();
        let ops = call.parameter("ops").unwrap();
        let DecodedValue::Array(ops) = ops else {
            panic!("ops should be an array");
        };
        assert_eq!(ops[0].field("value").and_then(|v| v.as_number()), Some("1"));
        assert_eq!(ops[1].field("value").and_then(|v| v.as_number()), Some("16"));
        assert_eq!(call.parameter("flag"), Some(&DecodedValue::Bool(true)));
        assert_eq!(call.parameter("tag").and_then(|v| v.as_bytes_hex()), Some("0xdeadbeef"));
        assert_eq!(call.parameter("note"), Some(&DecodedValue::String("hello".into())));
        assert_eq!(call.parameter("delta").and_then(|v| v.as_number()), Some("-3"));
    }

    #[test]
    fn json_argument_errors() {
        let spec = FunctionSpec::parse("f((address a, uint256 b) pair, bool flag)").unwrap();
        let bad = [
            serde_json::json!({ "pair": [] }),
            serde_json::json!([[]]),
            serde_json::json!([{ "a": "0x00" }, true]),
            serde_json::json!([["0x00", 1, 2], true]),
            serde_json::json!([["0x00", 1], "maybe"]),
        ];
        for args in bad {
            assert!(
                matches!(encode_call_json(&spec, &args), Err(DecodeError::AbiEncodeFailed { .. })),
                "{args} should be rejected"
            );
        }
    }

    #[test]
    fn arity_and_shape_mismatch() {
        let spec = FunctionSpec::parse("f(uint256,bool)").unwrap();
        assert!(encode_call(&spec, &[DecodedValue::Bool(true)]).is_err());
        assert!(encode_call(&spec, &[DecodedValue::Bool(true), DecodedValue::Bool(true)]).is_err());
    }
}
