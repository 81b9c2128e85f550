//! Rule contract for structural checks over declared types.
//!
//! Design goals:
//! - rules are stateless and deterministic: the same type always yields the
//!   same ordered findings
//! - a clean type is `Ok(vec![])`, never an error; `Err` is reserved for a
//!   rule's own internal failures
//! - adding a rule means implementing the trait and registering it, with no
//!   change to the validator

pub mod list_type;

use thiserror::Error;

use crate::model::TypeDecl;

/// One named structural check.
///
/// `Send + Sync` so the validator can evaluate independent (type, rule)
/// pairs on a thread pool.
pub trait Rule: Send + Sync {
    /// Stable identifier, unique within a registry.
    fn name(&self) -> &str;

    /// Inspect one declared type and return violating member names in
    /// declaration order. Must not mutate the model.
    fn validate(&self, ty: &TypeDecl) -> Result<Vec<String>, RuleError>;
}

/// Internal failure inside a rule. Not a finding: findings are the `Ok`
/// side of `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct RuleError(pub String);

impl RuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
