//! Resolves parsed struct declarations into ABI type descriptors.
//!
//! - primitives pass through with their array suffix
//! - enums become `uint8` (with suffix)
//! - structs become `tuple` (with suffix) carrying the resolved members
//! - mappings, unknown names, and reference cycles are errors

use abilens_core::{
    error::ResolveError,
    types::{split_array_suffix, TypeDescriptor},
};
use std::collections::HashSet;

use crate::struct_parser::StructSymbolTable;

/// Is `base` (no array suffix) a built-in ABI type name?
pub fn is_primitive(base: &str) -> bool {
    match base {
        "address" | "bool" | "string" | "bytes" | "uint" | "int" => true,
        _ => {
            if let Some(n) = base.strip_prefix("bytes") {
                return parse_width(n).is_some_and(|n| (1..=32).contains(&n));
            }
            let bits = base
                .strip_prefix("uint")
                .or_else(|| base.strip_prefix("int"));
            bits.and_then(parse_width)
                .is_some_and(|n| (8..=256).contains(&n) && n % 8 == 0)
        }
    }
}

/// Digits only, no sign or leading zero.
fn parse_width(s: &str) -> Option<u32> {
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Resolve the struct `name` into a `tuple` descriptor named after the struct.
///
/// # Errors
/// Any `ResolveError`; each one names the offending struct or field.
pub fn resolve(name: &str, table: &StructSymbolTable) -> Result<TypeDescriptor, ResolveError> {
    let components = resolve_members(name, table, &HashSet::new())?;
    Ok(TypeDescriptor::tuple(name, "", components))
}

/// Resolve one field declaration. `visiting` holds the structs on the current path.
pub fn resolve_field(
    field_name: &str,
    field_type: &str,
    table: &StructSymbolTable,
    visiting: &HashSet<String>,
) -> Result<TypeDescriptor, ResolveError> {
    if field_type.contains("mapping") {
        return Err(ResolveError::MappingType {
            field: field_name.to_string(),
        });
    }

    let (base, suffix) = split_array_suffix(field_type);

    if is_primitive(base) {
        return Ok(TypeDescriptor::new(field_name, field_type));
    }
    if table.is_enum(base) {
        return Ok(TypeDescriptor::new(field_name, format!("uint8{suffix}")));
    }
    if table.is_struct(base) {
        let components = resolve_members(base, table, visiting)?;
        return Ok(TypeDescriptor::tuple(field_name, suffix, components));
    }

    Err(ResolveError::UnknownType {
        ty: base.to_string(),
        field: field_name.to_string(),
    })
}

fn resolve_members(
    name: &str,
    table: &StructSymbolTable,
    visiting: &HashSet<String>,
) -> Result<Vec<TypeDescriptor>, ResolveError> {
    if visiting.contains(name) {
        return Err(ResolveError::CircularReference {
            name: name.to_string(),
        });
    }
    let fields = table
        .fields(name)
        .ok_or_else(|| ResolveError::unknown_struct(name, table.struct_names()))?;

    // Each branch gets its own copy so siblings never see each other's path
    let mut path = visiting.clone();
    path.insert(name.to_string());

    fields
        .iter()
        .map(|f| resolve_field(&f.name, &f.ty, table, &path))
        .collect()
}

/// Structs not used as a field type anywhere, in declaration order.
///
/// Falls back to every struct when each one is referenced somewhere, so a
/// non-empty table always yields at least one candidate.
pub fn detect_roots(table: &StructSymbolTable) -> Vec<String> {
    let referenced: HashSet<&str> = table
        .structs
        .values()
        .flatten()
        .map(|f| split_array_suffix(&f.ty).0)
        .filter(|base| table.is_struct(base))
        .collect();

    let roots: Vec<String> = table
        .struct_names()
        .filter(|name| !referenced.contains(name))
        .map(str::to_string)
        .collect();

    if roots.is_empty() {
        table.struct_names().map(str::to_string).collect()
    } else {
        roots
    }
}
