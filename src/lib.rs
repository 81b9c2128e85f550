//! Structural lint rules for declared API type models.
//!
//! A code-generation front end hands over descriptor JSON (declared types,
//! their members, and marker tags parsed from annotation comments); named
//! rules inspect each type and report violating members; a validator runs a
//! selection of registered rules over the whole set and aggregates the
//! findings in a deterministic order.

pub mod cli;
pub mod dryrun;
pub mod jq_exec;
pub mod loader;
pub mod model;
pub mod registry;
pub mod report;
pub mod rules;
pub mod tags;
pub mod validator;

pub use model::{Member, ModelFile, TagMap, TypeDecl, TypeKind};
pub use registry::{RegistryError, RuleRegistry};
pub use rules::{Rule, RuleError};
pub use validator::{RuleFailure, RuleSelection, RunReport, ValidateError, Validator, Violation};
