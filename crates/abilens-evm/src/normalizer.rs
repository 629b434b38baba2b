//! Converts alloy-core `DynSolValue` → abilens `DecodedValue`.
//!
//! Every integer, whatever its width, becomes a decimal string here, so
//! nothing downstream ever sees a native big integer.

use alloy_core::dyn_abi::DynSolValue;
use abilens_core::{hexutil::encode_hex, types::DecodedValue, types::TypeDescriptor};

/// Convert a decoded value, using `desc` to name tuple members.
pub fn normalize(val: DynSolValue, desc: &TypeDescriptor) -> DecodedValue {
    match val {
        DynSolValue::Bool(b) => DecodedValue::Bool(b),

        DynSolValue::Int(i, _bits) => DecodedValue::Number(i.to_string()),

        DynSolValue::Uint(u, _bits) => DecodedValue::Number(u.to_string()),

        DynSolValue::FixedBytes(word, size) => DecodedValue::Bytes(encode_hex(&word[..size])),

        DynSolValue::Bytes(b) => DecodedValue::Bytes(encode_hex(b)),

        DynSolValue::String(s) => DecodedValue::String(s),

        DynSolValue::Address(a) => DecodedValue::Address(encode_hex(a.as_slice())),

        DynSolValue::Array(vals) | DynSolValue::FixedArray(vals) => {
            let elem = desc.element().unwrap_or_else(|| desc.clone());
            DecodedValue::Array(vals.into_iter().map(|v| normalize(v, &elem)).collect())
        }

        DynSolValue::Tuple(fields) => {
            let unnamed = TypeDescriptor::new("", "");
            let named = fields
                .into_iter()
                .enumerate()
                .map(|(i, v)| {
                    let member = desc.components.get(i).unwrap_or(&unnamed);
                    let name = if member.name.is_empty() {
                        i.to_string()
                    } else {
                        member.name.clone()
                    };
                    (name, normalize(v, member))
                })
                .collect();
            DecodedValue::Tuple(named)
        }

        // Function pointers (address ++ selector) are shown as raw bytes
        DynSolValue::Function(f) => DecodedValue::Bytes(encode_hex(f.as_slice())),
    }
}
