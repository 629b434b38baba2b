//! zkSync L2→L1 governance messages.
//!
//! `sendToL1(bytes message)` on the L1 messenger carries an upgrade
//! proposal: a list of calls, the executor allowed to run them, and a salt.
//! The message is normally `abi.encode(proposal)`, one tuple; a flat
//! three-value encoding is accepted as well.

use abilens_core::{
    call::{L1Operation, L1RelayCall},
    hexutil::leading_selector,
    types::{DecodedValue, TypeDescriptor},
};
use tracing::debug;

use crate::call_decoder::{decode_params, decode_values};

/// `sendToL1(bytes)`
pub const SEND_TO_L1: [u8; 4] = [0x62, 0xf8, 0x4b, 0x24];

/// The L1 messenger system contract on zkSync Era.
pub const L1_MESSENGER_ADDRESS: &str = "0x0000000000000000000000000000000000008008";

/// The proposal as a function signature, for display and lookups.
pub const PROPOSAL_SIGNATURE: &str = "execute(((address,uint256,bytes)[],address,bytes32))";

pub fn is_l1_messenger(address: &str) -> bool {
    L1_MESSENGER_ADDRESS.eq_ignore_ascii_case(address.trim())
}

/// Does the calldata start with the `sendToL1` selector?
pub fn is_candidate(calldata: &[u8]) -> bool {
    leading_selector(calldata) == Some(SEND_TO_L1)
}

fn proposal_fields() -> Vec<TypeDescriptor> {
    vec![
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
    ]
}

/// Decode `sendToL1` calldata. Operation calldata is left as raw bytes.
///
/// `None` when the selector differs or the message is not a proposal.
pub fn decode(calldata: &[u8]) -> Option<L1RelayCall> {
    if !is_candidate(calldata) {
        return None;
    }
    let message = decode_values(&[TypeDescriptor::new("message", "bytes")], &calldata[4..])
        .ok()?
        .pop()?;
    let message = hex::decode(message.as_bytes_hex()?.trim_start_matches("0x")).ok()?;

    decode_message(&message)
}

/// Decode the message payload of a `sendToL1` call.
pub fn decode_message(message: &[u8]) -> Option<L1RelayCall> {
    let proposal = TypeDescriptor::tuple("proposal", "", proposal_fields());
    if let Ok(mut values) = decode_values(std::slice::from_ref(&proposal), message) {
        if let Some(DecodedValue::Tuple(fields)) = values.pop() {
            if let Some(relay) = relay_from_fields(fields) {
                return Some(relay);
            }
        }
    }

    match decode_params(&proposal_fields(), message) {
        Ok(fields) => relay_from_fields(fields),
        Err(e) => {
            debug!(error = %e, "sendToL1 message is not a proposal");
            None
        }
    }
}

fn relay_from_fields(fields: Vec<(String, DecodedValue)>) -> Option<L1RelayCall> {
    let mut fields = fields.into_iter().map(|(_, v)| v);
    let (Some(DecodedValue::Array(ops)), Some(DecodedValue::Address(executor)), Some(DecodedValue::Bytes(salt))) =
        (fields.next(), fields.next(), fields.next())
    else {
        return None;
    };

    let operations = ops
        .into_iter()
        .map(|op| match op {
            DecodedValue::Tuple(members) => {
                let mut members = members.into_iter().map(|(_, v)| v);
                match (members.next(), members.next(), members.next()) {
                    (
                        Some(DecodedValue::Address(target)),
                        Some(DecodedValue::Number(value)),
                        Some(calldata),
                    ) => Some(L1Operation {
                        target,
                        value,
                        calldata,
                    }),
                    _ => None,
                }
            }
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    Some(L1RelayCall {
        operations,
        executor,
        salt,
    })
}
