//! Generic ABI decoding against a descriptor list.
//!
//! # How it works
//! - Function calldata = 4-byte selector ++ ABI-encoded parameter list
//! - An encoded struct (`abi.encode(s)`) is a parameter list of one tuple
//! - Every decoded value goes through the normalizer before it is returned

use alloy_core::dyn_abi::DynSolValue;
use abilens_core::{
    call::NestedCall,
    error::DecodeError,
    hexutil::encode_hex,
    types::{DecodedValue, TypeDescriptor},
};

use crate::{abi_type, normalizer, selector::selector_hex, signature::FunctionSpec};

/// Decode an ABI-encoded parameter list, pairing each value with its name.
///
/// # Errors
/// `DecodeError::AbiDecodeFailed` when the data does not fit the descriptors
/// (truncated data, offsets pointing outside the buffer, bad padding).
pub fn decode_params(
    inputs: &[TypeDescriptor],
    data: &[u8],
) -> Result<Vec<(String, DecodedValue)>, DecodeError> {
    if inputs.is_empty() {
        return Ok(vec![]);
    }

    let params_type = abi_type::to_params_type(inputs)?;
    let decoded = params_type
        .abi_decode_params(data)
        .map_err(|e| DecodeError::AbiDecodeFailed {
            reason: e.to_string(),
        })?;

    let values = match decoded {
        DynSolValue::Tuple(vals) => vals,
        other => vec![other],
    };
    if values.len() != inputs.len() {
        return Err(DecodeError::AbiDecodeFailed {
            reason: format!("expected {} values, decoded {}", inputs.len(), values.len()),
        });
    }

    Ok(inputs
        .iter()
        .zip(values)
        .map(|(desc, val)| (desc.name.clone(), normalizer::normalize(val, desc)))
        .collect())
}

/// Decode a parameter list and drop the names.
pub fn decode_values(
    inputs: &[TypeDescriptor],
    data: &[u8],
) -> Result<Vec<DecodedValue>, DecodeError> {
    Ok(decode_params(inputs, data)?
        .into_iter()
        .map(|(_, v)| v)
        .collect())
}

/// Decode full calldata (selector included) against a known function.
///
/// Nested `bytes` are left as raw hex; see `nested` for recursive decoding.
pub fn decode_function_call(spec: &FunctionSpec, calldata: &[u8]) -> Result<NestedCall, DecodeError> {
    let found: [u8; 4] = calldata
        .get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or(DecodeError::CalldataTooShort {
            len: calldata.len(),
            min: 4,
        })?;
    if found != spec.selector {
        return Err(DecodeError::SelectorMismatch {
            signature: spec.signature.clone(),
            expected: spec.selector_hex(),
            found: selector_hex(found),
        });
    }

    Ok(NestedCall {
        signature: spec.signature.clone(),
        selector: spec.selector_hex(),
        parameters: decode_params(&spec.inputs, &calldata[4..])?,
        raw: encode_hex(calldata),
    })
}

/// Decode an encoded struct blob against a resolved tuple descriptor.
pub fn decode_struct(desc: &TypeDescriptor, data: &[u8]) -> Result<DecodedValue, DecodeError> {
    decode_values(std::slice::from_ref(desc), data)?
        .pop()
        .ok_or_else(|| DecodeError::AbiDecodeFailed {
            reason: "struct decoded to no value".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(hex_str: &str) -> Vec<u8> {
        hex::decode(format!("{hex_str:0>64}")).unwrap()
    }

    #[test]
    fn decode_transfer_calldata() {
        let spec = FunctionSpec::parse("transfer(address to, uint256 amount)").unwrap();
        let mut calldata = hex::decode("a9059cbb").unwrap();
        calldata.extend(word("d8da6bf26964af9d7eed9e03e53415d37aa96045"));
        calldata.extend(word("f4240"));

        let call = decode_function_call(&spec, &calldata).unwrap();
        assert_eq!(call.signature, "transfer(address,uint256)");
        assert_eq!(call.selector, "0xa9059cbb");
        assert_eq!(
            call.parameter("to"),
            Some(&DecodedValue::Address("0xd8da6bf26964af9d7eed9e03e53415d37aa96045".into()))
        );
        assert_eq!(call.parameter("amount"), Some(&DecodedValue::Number("1000000".into())));
        assert!(call.raw.starts_with("0xa9059cbb"));
    }

    #[test]
    fn truncated_data_is_an_error() {
        let spec = FunctionSpec::parse("transfer(address,uint256)").unwrap();
        let mut calldata = hex::decode("a9059cbb").unwrap();
        calldata.extend(word("01"));
        assert!(matches!(
            decode_function_call(&spec, &calldata),
            Err(DecodeError::AbiDecodeFailed { .. })
        ));
    }

    #[test]
    fn selector_must_match() {
        let spec = FunctionSpec::parse("transfer(address,uint256)").unwrap();
        let calldata = hex::decode("095ea7b3").unwrap();
        assert!(matches!(
            decode_function_call(&spec, &calldata),
            Err(DecodeError::SelectorMismatch { .. })
        ));
        assert!(matches!(
            decode_function_call(&spec, &[0xa9]),
            Err(DecodeError::CalldataTooShort { len: 1, min: 4 })
        ));
    }

    #[test]
    fn zero_argument_call() {
        let spec = FunctionSpec::parse("pause()").unwrap();
        let call = decode_function_call(&spec, &spec.selector).unwrap();
        assert!(call.parameters.is_empty());
    }

    #[test]
    fn dynamic_bytes_param() {
        let inputs = vec![TypeDescriptor::new("data", "bytes")];
        let mut data = word("20");
        data.extend(word("3"));
        data.extend(hex::decode(format!("{:0<64}", "abcdef")).unwrap());
        let values = decode_values(&inputs, &data).unwrap();
        assert_eq!(values, vec![DecodedValue::Bytes("0xabcdef".into())]);
    }
}
