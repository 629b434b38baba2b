//! Type descriptors and decoded values.
//!
//! `TypeDescriptor` is the ABI shape consumed by the decoders: a primitive
//! type tag, `tuple`, or either of those with an array suffix. `DecodedValue`
//! is what comes out the other side.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::call::{L1RelayCall, MultiSendBatch, NestedCall, UniswapRouterCall};

/// One node of an ABI type tree.
///
/// `kind` carries the array suffix verbatim (`uint256[]`, `tuple[3]`,
/// `address[2][]`). Tuple nodes, and arrays of tuples, list their members
/// in `components`; the order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<TypeDescriptor>,
}

impl TypeDescriptor {
    /// A primitive (or array of primitive) descriptor.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            components: Vec::new(),
        }
    }

    /// A `tuple` descriptor, with `suffix` appended (`""`, `"[]"`, `"[4]"`).
    pub fn tuple(name: impl Into<String>, suffix: &str, components: Vec<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            kind: format!("tuple{suffix}"),
            components,
        }
    }

    /// The type without any array suffix.
    pub fn base_kind(&self) -> &str {
        split_array_suffix(&self.kind).0
    }

    /// The array suffix, empty for non-array types.
    pub fn array_suffix(&self) -> &str {
        split_array_suffix(&self.kind).1
    }

    pub fn is_array(&self) -> bool {
        !self.array_suffix().is_empty()
    }

    pub fn is_tuple(&self) -> bool {
        self.base_kind() == "tuple"
    }

    /// True only for dynamic `bytes`, the one type eligible for nested decoding.
    pub fn is_dynamic_bytes(&self) -> bool {
        self.kind == "bytes"
    }

    /// The element descriptor of an array type (outermost dimension removed).
    pub fn element(&self) -> Option<TypeDescriptor> {
        let open = self.kind.rfind('[')?;
        if !self.kind.ends_with(']') {
            return None;
        }
        Some(Self {
            name: self.name.clone(),
            kind: self.kind[..open].to_string(),
            components: self.components.clone(),
        })
    }

    /// Canonical ABI type string, e.g. `(address,uint256)[]`.
    ///
    /// Bare `uint` / `int` are widened to their 256-bit names.
    pub fn canonical_type(&self) -> String {
        let base = if self.is_tuple() {
            let inner: Vec<String> = self.components.iter().map(|c| c.canonical_type()).collect();
            format!("({})", inner.join(","))
        } else {
            match self.base_kind() {
                "uint" => "uint256".to_string(),
                "int" => "int256".to_string(),
                other => other.to_string(),
            }
        };
        format!("{base}{}", self.array_suffix())
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.canonical_type())
        } else {
            write!(f, "{} {}", self.canonical_type(), self.name)
        }
    }
}

/// Split `"Foo[2][]"` into `("Foo", "[2][]")`.
pub fn split_array_suffix(ty: &str) -> (&str, &str) {
    match ty.find('[') {
        Some(i) if ty.ends_with(']') => (&ty[..i], &ty[i..]),
        _ => (ty, ""),
    }
}

/// A decoded ABI value.
///
/// Integers of every width are carried as decimal strings. Byte strings and
/// fixed-size byte arrays are `0x`-prefixed lowercase hex. The last four
/// variants are the results of recognising a known payload inside a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DecodedValue {
    Address(String),
    Bool(bool),
    /// Any intN / uintN, as a decimal string
    Number(String),
    String(String),
    /// `bytes` or `bytesN`, as 0x-prefixed hex
    Bytes(String),
    Array(Vec<DecodedValue>),
    Tuple(Vec<(String, DecodedValue)>),
    NestedCall(Box<NestedCall>),
    MultiSend(MultiSendBatch),
    UniswapRouter(UniswapRouterCall),
    L1Relay(L1RelayCall),
}

impl DecodedValue {
    /// The hex text of a `Bytes` value.
    pub fn as_bytes_hex(&self) -> Option<&str> {
        match self {
            DecodedValue::Bytes(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The decimal text of a `Number` value.
    pub fn as_number(&self) -> Option<&str> {
        match self {
            DecodedValue::Number(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&str> {
        match self {
            DecodedValue::Address(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_nested_call(&self) -> Option<&NestedCall> {
        match self {
            DecodedValue::NestedCall(c) => Some(c),
            _ => None,
        }
    }

    /// Look up a field of a `Tuple` value by name.
    pub fn field(&self, name: &str) -> Option<&DecodedValue> {
        match self {
            DecodedValue::Tuple(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// True for the variants produced by recognising a known payload.
    pub fn is_recognised(&self) -> bool {
        match self {
            DecodedValue::NestedCall(_)
            | DecodedValue::MultiSend(_)
            | DecodedValue::UniswapRouter(_)
            | DecodedValue::L1Relay(_) => true,
            DecodedValue::Address(_)
            | DecodedValue::Bool(_)
            | DecodedValue::Number(_)
            | DecodedValue::String(_)
            | DecodedValue::Bytes(_)
            | DecodedValue::Array(_)
            | DecodedValue::Tuple(_) => false,
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Address(a) => write!(f, "{a}"),
            DecodedValue::Bool(b) => write!(f, "{b}"),
            DecodedValue::Number(n) => write!(f, "{n}"),
            DecodedValue::String(s) => write!(f, "{s}"),
            DecodedValue::Bytes(b) => write!(f, "{b}"),
            DecodedValue::Array(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            DecodedValue::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            DecodedValue::NestedCall(call) => write!(f, "{}", call.signature),
            DecodedValue::MultiSend(batch) => {
                write!(f, "multiSend[{} transactions]", batch.transactions.len())
            }
            DecodedValue::UniswapRouter(call) => {
                let names: Vec<&str> = call.commands.iter().map(|c| c.name.as_str()).collect();
                write!(f, "execute[{}]", names.join(", "))
            }
            DecodedValue::L1Relay(call) => {
                write!(f, "sendToL1[{} operations]", call.operations.len())
            }
        }
    }
}
