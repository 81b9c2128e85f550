//! Rule registry: an explicit name → rule mapping, built once at startup
//! and passed by reference into the validator. No global state.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::rules::list_type::ListTypeMissing;
use crate::rules::Rule;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Registration under a name that is already taken.
    #[error("rule `{name}` is already registered")]
    Duplicate { name: String },
    /// Lookup of a name nothing was registered under.
    #[error("rule `{name}` not found")]
    Unknown { name: String },
}

/// Registered rules, keyed by name. The `BTreeMap` gives enumeration and
/// evaluation a stable lexical order independent of registration order.
#[derive(Default)]
pub struct RuleRegistry {
    rules: BTreeMap<String, Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: BTreeMap::new() }
    }

    /// Registry preloaded with every built-in rule.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(Box::new(ListTypeMissing));
        registry
    }

    // Built-in names are fixed and pairwise distinct; no duplicate check.
    fn insert(&mut self, rule: Box<dyn Rule>) {
        self.rules.insert(rule.name().to_owned(), rule);
    }

    /// Register a rule under its own name. Names are claimed first come,
    /// first served; a collision is an error at registration time, never a
    /// silent replacement discovered at validation time.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), RegistryError> {
        let name = rule.name().to_owned();
        if self.rules.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        self.rules.insert(name, rule);
        Ok(())
    }

    /// Look up a rule by name.
    pub fn get(&self, name: &str) -> Result<&dyn Rule, RegistryError> {
        self.rules
            .get(name)
            .map(|rule| &**rule)
            .ok_or_else(|| RegistryError::Unknown { name: name.to_owned() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered names, lexical order, stable across calls.
    pub fn names(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    /// Rules in lexical name order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> + '_ {
        self.rules.values().map(|rule| &**rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ------------------------------- Tests ------------------------------------ //
