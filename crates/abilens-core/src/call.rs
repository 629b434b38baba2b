//! Results of recognising a known payload inside calldata.
//!
//! A plain ABI decode produces `DecodedValue` trees. When a `bytes` value
//! (or the whole calldata) turns out to be a function call, a Safe
//! multi-send batch, a Universal Router command stream, or a zkSync
//! `sendToL1` message, the value is replaced by one of the types below.

use crate::error::DecodeError;
use crate::types::DecodedValue;
use serde::{Deserialize, Serialize};

/// A `bytes` value reinterpreted as an encoded function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedCall {
    /// Human-readable signature the call was decoded against
    pub signature: String,
    /// "0x" + 8 hex chars
    pub selector: String,
    /// Decoded arguments in declaration order
    pub parameters: Vec<(String, DecodedValue)>,
    /// The original hex the call was decoded from
    pub raw: String,
}

impl NestedCall {
    /// Look up a decoded argument by name
    pub fn parameter(&self, name: &str) -> Option<&DecodedValue> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Function name, the part of the signature before `(`
    pub fn function_name(&self) -> &str {
        self.signature
            .split('(')
            .next()
            .unwrap_or(&self.signature)
    }
}

// ─── Safe multi-send ─────────────────────────────────────────────────────────

/// Operation code of a multi-send record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Call,
    DelegateCall,
}

impl Operation {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Operation::Call),
            1 => Some(Operation::DelegateCall),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Operation::Call => 0,
            Operation::DelegateCall => 1,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Call => write!(f, "Call"),
            Operation::DelegateCall => write!(f, "DelegateCall"),
        }
    }
}

/// One packed record of a multi-send batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSendTransaction {
    pub operation: Operation,
    pub to: String,
    /// Wei value as a decimal string
    pub value: String,
    pub data_length: u64,
    /// Payload, either raw `Bytes` or a recognised nested call
    pub data: DecodedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSendBatch {
    pub transactions: Vec<MultiSendTransaction>,
}

// ─── Uniswap Universal Router ────────────────────────────────────────────────

/// One hop of a V3 path: two tokens joined by a fee tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolHop {
    pub first_address: String,
    pub tick_spacing: u32,
    pub second_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UniswapParamValue {
    Value(DecodedValue),
    /// A V3 packed path, split into hops
    Path(Vec<PoolHop>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniswapParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub description: String,
    pub value: UniswapParamValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniswapCommand {
    /// Command index (low 5 bits of the command byte)
    pub index: u8,
    pub name: String,
    pub params: Vec<UniswapParam>,
}

impl UniswapCommand {
    pub fn param(&self, name: &str) -> Option<&UniswapParam> {
        self.params.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniswapRouterCall {
    /// Decimal deadline, present only for `execute(bytes,bytes[],uint256)`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub commands: Vec<UniswapCommand>,
}

// ─── zkSync sendToL1 ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct L1Operation {
    pub target: String,
    /// Wei value as a decimal string
    pub value: String,
    pub calldata: DecodedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct L1RelayCall {
    pub operations: Vec<L1Operation>,
    pub executor: String,
    /// bytes32 salt, 0x-prefixed hex
    pub salt: String,
}

// ─── Presentation boundary ───────────────────────────────────────────────────

/// Outcome of a top-level decode, as handed to renderers.
///
/// A failed decode is a value, not a panic, so callers can show an error
/// state in place of a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecodeReport {
    Decoded { result: DecodedValue },
    Error { message: String },
}

impl DecodeReport {
    pub fn is_error(&self) -> bool {
        matches!(self, DecodeReport::Error { .. })
    }
}

impl From<Result<DecodedValue, DecodeError>> for DecodeReport {
    fn from(result: Result<DecodedValue, DecodeError>) -> Self {
        match result {
            Ok(result) => DecodeReport::Decoded { result },
            Err(e) => DecodeReport::Error {
                message: e.to_string(),
            },
        }
    }
}
