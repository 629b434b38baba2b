//! Parser for Solidity-style `struct` and `enum` declarations.
//!
//! Only the declaration shapes are understood:
//!
//! ```text
//! struct Name { type name; type[] name; ... }
//! enum Name { A, B, C }
//! ```
//!
//! Comments, pragmas, license lines, and anything else are skipped. The
//! parser never fails; unrecognised text simply yields no declarations.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// One `type name;` entry of a struct body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructField {
    pub name: String,
    /// Type text with internal whitespace removed, array suffix kept verbatim
    #[serde(rename = "type")]
    pub ty: String,
}

/// Structs and enums found in a block of definitions, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructSymbolTable {
    pub structs: IndexMap<String, Vec<StructField>>,
    pub enums: IndexSet<String>,
}

impl StructSymbolTable {
    /// Parse every struct and enum declaration in `text`.
    ///
    /// A struct declared twice keeps its last body.
    pub fn parse(text: &str) -> Self {
        let source = strip_comments(text);
        let mut table = Self::default();

        for (name, body) in find_declarations(&source, "struct") {
            table.structs.insert(name.to_string(), parse_fields(body));
        }
        for (name, _) in find_declarations(&source, "enum") {
            table.enums.insert(name.to_string());
        }

        tracing::debug!(
            structs = table.structs.len(),
            enums = table.enums.len(),
            "parsed struct definitions"
        );
        table
    }

    pub fn fields(&self, name: &str) -> Option<&[StructField]> {
        self.structs.get(name).map(Vec::as_slice)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains(name)
    }

    pub fn is_struct(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    pub fn struct_names(&self) -> impl Iterator<Item = &str> {
        self.structs.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty() && self.enums.is_empty()
    }
}

/// Remove `// ...` and `/* ... */` comments. Block comments become a space.
fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    loop {
        let (start, is_block) = match (rest.find("//"), rest.find("/*")) {
            (None, None) => {
                out.push_str(rest);
                return out;
            }
            (Some(line), Some(block)) => {
                if block < line {
                    (block, true)
                } else {
                    (line, false)
                }
            }
            (Some(line), None) => (line, false),
            (None, Some(block)) => (block, true),
        };

        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        rest = if is_block {
            out.push(' ');
            after.find("*/").map_or("", |end| &after[end + 2..])
        } else {
            after.find('\n').map_or("", |nl| &after[nl..])
        };
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Find `<keyword> <Name> { <body> }` blocks, returning `(Name, body)` pairs.
fn find_declarations<'a>(src: &'a str, keyword: &str) -> Vec<(&'a str, &'a str)> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(rel) = src[cursor..].find(keyword) {
        let start = cursor + rel;
        cursor = start + keyword.len();

        if src[..start].chars().next_back().is_some_and(is_ident_char) {
            continue;
        }
        let after = &src[cursor..];
        let trimmed = after.trim_start();
        if trimmed.len() == after.len() {
            continue;
        }
        let name_len = trimmed
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(trimmed.len());
        if name_len == 0 {
            continue;
        }
        let name = &trimmed[..name_len];
        let Some(body_and_tail) = trimmed[name_len..].trim_start().strip_prefix('{') else {
            continue;
        };
        let Some(close) = body_and_tail.find('}') else {
            continue;
        };

        found.push((name, &body_and_tail[..close]));
        cursor = src.len() - body_and_tail.len() + close + 1;
    }
    found
}

/// Split a struct body into fields. Declarations with fewer than two tokens are dropped.
fn parse_fields(body: &str) -> Vec<StructField> {
    body.split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter_map(|decl| {
            let parts: Vec<&str> = decl.split_whitespace().collect();
            let (name, type_parts) = parts.split_last()?;
            if type_parts.is_empty() {
                return None;
            }
            Some(StructField {
                name: name.to_string(),
                ty: type_parts.concat(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITIONS: &str = r#"
        // SPDX-License-Identifier: MIT
        pragma solidity ^0.8.0;

        /// @notice A contact
        struct Contact {
            string name;    // display name
            string contact; /* email or handle */
        }

        /**
         * Severity levels
         */
        enum Severity { Low, Medium, High }

        struct Report {
            Contact[] contacts;
            Severity severity;
            uint256 [ ] ids;
            bytes32[3] hashes;
        }
    "#;

    #[test]
    fn finds_structs_and_enums_in_order() {
        let table = StructSymbolTable::parse(DEFINITIONS);
        assert_eq!(table.struct_names().collect::<Vec<_>>(), vec!["Contact", "Report"]);
        assert!(table.is_enum("Severity"));
        assert!(!table.is_struct("Severity"));
    }

    #[test]
    fn fields_keep_declaration_order_and_suffixes() {
        let table = StructSymbolTable::parse(DEFINITIONS);
        let report = table.fields("Report").unwrap();
        let pairs: Vec<(&str, &str)> = report.iter().map(|f| (f.name.as_str(), f.ty.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("contacts", "Contact[]"),
                ("severity", "Severity"),
                ("ids", "uint256[]"),
                ("hashes", "bytes32[3]"),
            ]
        );
    }

    #[test]
    fn comments_do_not_leak_into_fields() {
        let table = StructSymbolTable::parse(DEFINITIONS);
        let contact = table.fields("Contact").unwrap();
        assert_eq!(contact.len(), 2);
        assert_eq!(contact[1].name, "contact");
        assert_eq!(contact[1].ty, "string");
    }

    #[test]
    fn empty_body_and_duplicates() {
        let table = StructSymbolTable::parse(
            "struct Empty {} struct Dup { uint8 a; } struct Dup { bool b; address c; }",
        );
        assert_eq!(table.fields("Empty").unwrap().len(), 0);
        let dup = table.fields("Dup").unwrap();
        assert_eq!(dup.len(), 2);
        assert_eq!(dup[0].name, "b");
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(StructSymbolTable::parse("").is_empty());
        assert!(StructSymbolTable::parse("struct { uint a; } enum {").is_empty());
        assert!(StructSymbolTable::parse("contract X { function f() {} }").is_empty());
    }

    #[test]
    fn keyword_must_stand_alone() {
        let table = StructSymbolTable::parse("mystruct Foo { uint8 a; } struct Bar { uint8 b; }");
        assert!(!table.is_struct("Foo"));
        assert!(table.is_struct("Bar"));
    }

    #[test]
    fn mapping_fields_are_kept_for_the_resolver() {
        let table = StructSymbolTable::parse("struct S { mapping(address => uint256) balances; }");
        let f = &table.fields("S").unwrap()[0];
        assert_eq!(f.name, "balances");
        assert_eq!(f.ty, "mapping(address=>uint256)");
    }
}
