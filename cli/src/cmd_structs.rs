//! `abilens decode-struct`, `structs`, `roots`: work on Solidity struct definitions.

use anyhow::{Context, Result};
use abilens_core::TypeDescriptor;
use abilens_evm::{decode_struct_blob, detect_roots, render_value, resolve, StructSymbolTable};
use tracing::info;

fn read_definitions(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read definitions file '{}'", path))
}

pub fn decode(definitions: &str, name: Option<&str>, data: &str, as_json: bool) -> Result<()> {
    let text = read_definitions(definitions)?;
    let (name, value) = decode_struct_blob(&text, name, data)?;
    info!(%name, "decoded struct blob");

    if as_json {
        let out = serde_json::json!({ "struct": name, "value": value });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Struct:  {}", name);
        print!("{}", render_value(&value, 1));
    }
    Ok(())
}

/// Every declared struct, resolved to its type tree.
pub fn list(definitions: &str) -> Result<()> {
    let text = read_definitions(definitions)?;
    let table = StructSymbolTable::parse(&text);

    let descriptors = table
        .struct_names()
        .map(|name| resolve(name, &table).with_context(|| format!("resolve struct '{}'", name)))
        .collect::<Result<Vec<TypeDescriptor>>>()?;

    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}

pub fn roots(definitions: &str) -> Result<()> {
    let text = read_definitions(definitions)?;
    let table = StructSymbolTable::parse(&text);
    let roots = detect_roots(&table);

    if roots.is_empty() {
        println!("No root structs found");
    }
    for root in roots {
        println!("{}", root);
    }
    Ok(())
}
