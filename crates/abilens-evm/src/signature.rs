//! Human-readable function signatures.
//!
//! Accepts the forms users paste and the forms 4byte.directory returns:
//! `transfer(address,uint256)`, `function transfer(address to, uint256 amount)`,
//! and tuple parameters with or without member names, such as
//! `execute((address target, uint256 value, bytes data)[] ops)`.
//!
//! The parameter list is walked here so member names survive. Type names
//! are then checked against alloy's type parser.

use alloy_json_abi::Function;
use abilens_core::{error::DecodeError, types::TypeDescriptor};

use crate::{
    abi_type,
    selector::{selector_hex, selector_of},
};

/// Words that may sit between a parameter's type and its name.
const MODIFIERS: &[&str] = &["memory", "calldata", "storage", "indexed", "payable"];

/// A parsed function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    /// Canonical form, e.g. `transfer(address,uint256)`
    pub signature: String,
    pub selector: [u8; 4],
    /// Inputs in declaration order; unnamed inputs are labelled `paramN`
    pub inputs: Vec<TypeDescriptor>,
}

impl FunctionSpec {
    /// Parse a signature string.
    ///
    /// Anything after the closing parenthesis (`external view returns (..)`)
    /// is ignored.
    ///
    /// # Errors
    /// `DecodeError::InvalidSignature` if the text is not a function signature.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let invalid = |reason: String| DecodeError::InvalidSignature {
            signature: text.to_string(),
            reason,
        };

        let body = text.trim();
        let body = body
            .strip_prefix("function")
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .map_or(body, str::trim_start);

        let open = body.find('(').ok_or_else(|| invalid("missing '('".into()))?;
        let name = body[..open].trim();
        if !is_identifier(name) {
            return Err(invalid(format!("invalid function name '{name}'")));
        }
        let close = matching_paren(body, open).ok_or_else(|| invalid("unbalanced parentheses".into()))?;
        let tail = &body[close + 1..];
        if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
            return Err(invalid(format!("unexpected text after parameters: '{tail}'")));
        }

        let inputs = parse_params(&body[open + 1..close])
            .map_err(invalid)?
            .into_iter()
            .enumerate()
            .map(|(i, mut p)| {
                if p.name.is_empty() {
                    p.name = format!("param{i}");
                }
                p
            })
            .collect();

        let spec = Self::from_parts(name, inputs);
        abi_type::to_params_type(&spec.inputs).map_err(|e| invalid(e.to_string()))?;
        Function::parse(&spec.signature).map_err(|e| invalid(e.to_string()))?;
        Ok(spec)
    }

    /// Build a spec from a name and input descriptors.
    pub fn from_parts(name: impl Into<String>, inputs: Vec<TypeDescriptor>) -> Self {
        let name = name.into();
        let types: Vec<String> = inputs.iter().map(|d| d.canonical_type()).collect();
        let signature = format!("{name}({})", types.join(","));
        Self {
            selector: selector_of(&signature),
            name,
            signature,
            inputs,
        }
    }

    pub fn selector_hex(&self) -> String {
        selector_hex(self.selector)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Index of the `)` closing the `(` at `open`.
fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a parameter list at commas outside parentheses.
fn split_top_level(list: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or("unbalanced ')'")?,
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced '('".into());
    }
    parts.push(&list[start..]);
    Ok(parts)
}

/// Parse a comma-separated parameter list. Unnamed entries keep an empty name.
fn parse_params(list: &str) -> Result<Vec<TypeDescriptor>, String> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(list)?.into_iter().map(parse_param).collect()
}

fn parse_param(text: &str) -> Result<TypeDescriptor, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty parameter".into());
    }

    let tuple_text = text
        .strip_prefix("tuple")
        .map(str::trim_start)
        .filter(|rest| rest.starts_with('('))
        .unwrap_or(text);

    if tuple_text.starts_with('(') {
        let close = matching_paren(tuple_text, 0).ok_or("unbalanced '('")?;
        let members = parse_params(&tuple_text[1..close])?
            .into_iter()
            .enumerate()
            .map(|(i, mut m)| {
                if m.name.is_empty() {
                    m.name = i.to_string();
                }
                m
            })
            .collect();
        let (suffix, rest) = split_suffix(tuple_text[close + 1..].trim_start());
        return Ok(TypeDescriptor::tuple(param_name(rest)?, suffix, members));
    }

    let (ty, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    Ok(TypeDescriptor::new(param_name(rest)?, ty))
}

/// Leading `[..]` groups of `s`, and what follows them.
fn split_suffix(s: &str) -> (&str, &str) {
    let mut end = 0;
    while s[end..].starts_with('[') {
        match s[end..].find(']') {
            Some(close) => end += close + 1,
            None => break,
        }
    }
    (&s[..end], &s[end..])
}

/// The name after a parameter's type, skipping data-location words.
fn param_name(rest: &str) -> Result<String, String> {
    let words: Vec<&str> = rest
        .split_whitespace()
        .filter(|w| !MODIFIERS.contains(w))
        .collect();
    match words.as_slice() {
        [] => Ok(String::new()),
        [name] if is_identifier(name) => Ok(name.to_string()),
        _ => Err(format!("unexpected tokens '{}'", rest.trim())),
    }
}
