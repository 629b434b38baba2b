//! `abilens encode`: build calldata from a signature and JSON arguments.

use anyhow::{Context, Result};
use abilens_core::hexutil::encode_hex;
use abilens_evm::{encoder::encode_call_json, FunctionSpec};
use tracing::info;

/// `0x`-prefixed calldata for `signature` called with the JSON array `args`.
pub fn calldata(signature: &str, args: &str) -> Result<String> {
    let spec = FunctionSpec::parse(signature)?;
    let args: serde_json::Value =
        serde_json::from_str(args).with_context(|| format!("parse --args as JSON: '{}'", args))?;
    let calldata = encode_call_json(&spec, &args)?;
    info!(signature = %spec.signature, len = calldata.len(), "encoded call");
    Ok(encode_hex(calldata))
}

pub fn run(signature: &str, args: &str) -> Result<()> {
    println!("{}", calldata(signature, args)?);
    Ok(())
}
