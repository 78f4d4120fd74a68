//! Namespace alias table.
//!
//! Built once per DSL block or typed interface from declarations of the form
//! `"text :as s"`. Never mutated afterwards.

use std::collections::HashMap;

use crate::runner::ds::error::{BridgeError, Result};

/// Separator token between namespace and alias.
pub const ALIAS_SEPARATOR: &str = ":as";

/// Upper-case spelling accepted in place of [`ALIAS_SEPARATOR`].
const ALIAS_SEPARATOR_UPPER: &str = "AS";

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        AliasTable {
            aliases: HashMap::new(),
        }
    }

    /// Parse every declaration; the first malformed one fails the whole table.
    pub fn parse<I, S>(declarations: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = AliasTable::new();
        for declaration in declarations {
            let (namespace, alias) = split_declaration(declaration.as_ref())?;
            if let Some(existing) = table.aliases.get(alias) {
                if existing != namespace {
                    return Err(malformed(
                        declaration.as_ref(),
                        format!("alias '{}' already names namespace '{}'", alias, existing),
                    ));
                }
            }
            table
                .aliases
                .insert(alias.to_string(), namespace.to_string());
        }
        Ok(table)
    }

    pub fn lookup(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(|ns| ns.as_str())
    }

    /// Like [`lookup`](Self::lookup) but an undeclared alias is an error.
    pub fn resolve(&self, alias: &str) -> Result<&str> {
        self.lookup(alias)
            .ok_or_else(|| BridgeError::unresolved(format!("{} (alias not declared)", alias)))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, n)| (a.as_str(), n.as_str()))
    }
}

fn split_declaration(declaration: &str) -> Result<(&str, &str)> {
    let tokens: Vec<&str> = declaration.split_whitespace().collect();
    let separators = tokens
        .iter()
        .filter(|t| **t == ALIAS_SEPARATOR || **t == ALIAS_SEPARATOR_UPPER)
        .count();
    if separators != 1 {
        return Err(malformed(
            declaration,
            format!("expected exactly one '{}' separator", ALIAS_SEPARATOR),
        ));
    }
    match tokens.as_slice() {
        [namespace, sep, alias] if *sep == ALIAS_SEPARATOR || *sep == ALIAS_SEPARATOR_UPPER => {
            Ok((*namespace, *alias))
        }
        _ => Err(malformed(
            declaration,
            "expected exactly two parts around the separator".to_string(),
        )),
    }
}

fn malformed(declaration: &str, reason: String) -> BridgeError {
    BridgeError::MalformedAlias {
        declaration: declaration.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_returns_paired_namespace() {
        let table = AliasTable::parse(&["text :as s", "io :as io", "core AS c"]).unwrap();
        assert_eq!(table.lookup("s"), Some("text"));
        assert_eq!(table.lookup("io"), Some("io"));
        assert_eq!(table.lookup("c"), Some("core"));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_undeclared_alias_is_a_miss() {
        let table = AliasTable::parse(&["text :as s"]).unwrap();
        assert_eq!(table.lookup("t"), None);
        assert!(matches!(
            table.resolve("t"),
            Err(BridgeError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_malformed_declarations_fail_at_construction() {
        for bad in &["text", "text :as", ":as s", "text s", "a :as b :as c", "a b :as c"] {
            match AliasTable::parse(&[*bad]) {
                Err(BridgeError::MalformedAlias { declaration, .. }) => assert_eq!(declaration, *bad),
                other => panic!("'{}' should be malformed, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_alias_bound_twice_is_malformed() {
        assert!(AliasTable::parse(&["text :as s", "text :as s"]).is_ok());
        assert!(matches!(
            AliasTable::parse(&["text :as s", "seq :as s"]),
            Err(BridgeError::MalformedAlias { .. })
        ));
    }

    #[test]
    fn test_empty_declarations() {
        let empty: [&str; 0] = [];
        assert!(AliasTable::parse(&empty).unwrap().is_empty());
    }
}
