//! Orchestrates selected rules over a set of declared types.
//!
//! Design goals:
//! - deterministic output: input type order, then lexical rule order, then
//!   member declaration order, so runs over identical input are
//!   byte-for-byte identical
//! - a rule's internal failure is recorded against its (type, rule) pair
//!   and never aborts the rest of the run
//! - unknown rule names in a selection fail before anything is evaluated

use std::collections::BTreeSet;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::TypeDecl;
use crate::registry::RuleRegistry;
use crate::rules::Rule;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// One finding: this member of this type, flagged by this rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub type_name: String,
    pub rule: String,
    pub member: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} [{}]", self.type_name, self.member, self.rule)
    }
}

/// A rule's internal failure on one (type, rule) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFailure {
    #[serde(rename = "type")]
    pub type_name: String,
    pub rule: String,
    pub message: String,
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {} failed on {}: {}", self.rule, self.type_name, self.message)
    }
}

/// Aggregated outcome of one run. Failures sit beside the violations that
/// were still collected, so callers always see the partial signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub violations: Vec<Violation>,
    pub failures: Vec<RuleFailure>,
}

impl RunReport {
    /// No findings and every (type, rule) pair completed.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.failures.is_empty()
    }

    fn merge(&mut self, other: RunReport) {
        self.violations.extend(other.violations);
        self.failures.extend(other.failures);
    }
}

/// Which registered rules a run evaluates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RuleSelection {
    /// Every registered rule.
    #[default]
    All,
    /// Only the named rules. Order and duplicates are irrelevant: the set
    /// is resolved against the registry's lexical order before any
    /// evaluation happens.
    Named(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidateError {
    /// A selected rule name is not in the registry. Raised before any
    /// evaluation; a selection is never silently narrowed.
    #[error("rule `{name}` not found")]
    UnknownRule { name: String },
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATOR
// ————————————————————————————————————————————————————————————————————————————

/// Runs rules from a registry over declared types.
pub struct Validator<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Evaluate sequentially: types in input order, rules in lexical order.
    pub fn run(
        &self,
        types: &[TypeDecl],
        selection: &RuleSelection,
    ) -> Result<RunReport, ValidateError> {
        let rules = self.select(selection)?;
        let mut report = RunReport::default();
        for ty in types {
            for rule in &rules {
                apply(*rule, ty, &mut report);
            }
        }
        Ok(report)
    }

    /// Evaluate (type, rule) pairs on the rayon pool. Pairs are independent
    /// (rules are stateless, the model is immutable), and the indexed
    /// collect keeps pair order, so the report is identical to `run`'s.
    pub fn run_parallel(
        &self,
        types: &[TypeDecl],
        selection: &RuleSelection,
    ) -> Result<RunReport, ValidateError> {
        let rules = self.select(selection)?;
        let pairs: Vec<(&TypeDecl, &dyn Rule)> = types
            .iter()
            .flat_map(|ty| rules.iter().map(move |rule| (ty, *rule)))
            .collect();
        let partials: Vec<RunReport> = pairs
            .into_par_iter()
            .map(|(ty, rule)| {
                let mut part = RunReport::default();
                apply(rule, ty, &mut part);
                part
            })
            .collect();
        let mut report = RunReport::default();
        for part in partials {
            report.merge(part);
        }
        Ok(report)
    }

    // Resolve a selection against the registry, failing on the first
    // unknown name. The result is always in lexical registry order.
    fn select(&self, selection: &RuleSelection) -> Result<Vec<&'r dyn Rule>, ValidateError> {
        match selection {
            RuleSelection::All => Ok(self.registry.iter().collect()),
            RuleSelection::Named(names) => {
                for name in names {
                    if !self.registry.contains(name) {
                        return Err(ValidateError::UnknownRule { name: name.clone() });
                    }
                }
                let wanted: BTreeSet<&str> = names.iter().map(String::as_str).collect();
                Ok(self
                    .registry
                    .iter()
                    .filter(|rule| wanted.contains(rule.name()))
                    .collect())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn apply(rule: &dyn Rule, ty: &TypeDecl, report: &mut RunReport) {
    match rule.validate(ty) {
        Ok(members) => {
            for member in members {
                report.violations.push(Violation {
                    type_name: ty.name.clone(),
                    rule: rule.name().to_owned(),
                    member,
                });
            }
        }
        Err(err) => report.failures.push(RuleFailure {
            type_name: ty.name.clone(),
            rule: rule.name().to_owned(),
            message: err.to_string(),
        }),
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, TypeDecl};
    use crate::rules::RuleError;

    fn pod() -> TypeDecl {
        TypeDecl::structure(
            "Pod",
            vec![
                Member::new("Name", TypeDecl::primitive("string")),
                Member::new(
                    "Containers",
                    TypeDecl::slice("[]Container", TypeDecl::primitive("Container")),
                ),
                Member::new(
                    "Volumes",
                    TypeDecl::slice("[]Volume", TypeDecl::primitive("Volume")),
                )
                .with_tag("listType", "atomic"),
            ],
        )
    }

    struct Flaky;

    impl Rule for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }
        fn validate(&self, ty: &TypeDecl) -> Result<Vec<String>, RuleError> {
            if ty.name == "Bad" {
                Err(RuleError::new("boom"))
            } else {
                Ok(Vec::new())
            }
        }
    }

    struct FlagAll;

    impl Rule for FlagAll {
        fn name(&self) -> &str {
            "flag_all"
        }
        fn validate(&self, ty: &TypeDecl) -> Result<Vec<String>, RuleError> {
            Ok(ty.members.iter().map(|m| m.name.clone()).collect())
        }
    }

    #[test]
    fn pod_scenario_reports_containers_only() {
        let registry = RuleRegistry::builtin();
        let report = Validator::new(&registry)
            .run(&[pod()], &RuleSelection::All)
            .unwrap();
        assert_eq!(
            report.violations,
            vec![Violation {
                type_name: "Pod".to_owned(),
                rule: "list_type_missing".to_owned(),
                member: "Containers".to_owned(),
            }]
        );
        assert!(report.failures.is_empty());
    }

    #[test]
    fn unknown_selection_fails_before_evaluation() {
        let registry = RuleRegistry::builtin();
        let selection = RuleSelection::Named(vec![
            "list_type_missing".to_owned(),
            "no_such_rule".to_owned(),
        ]);
        let err = Validator::new(&registry).run(&[pod()], &selection).unwrap_err();
        assert_eq!(err, ValidateError::UnknownRule { name: "no_such_rule".to_owned() });
    }

    #[test]
    fn rule_failure_does_not_abort_other_pairs() {
        let mut registry = RuleRegistry::builtin();
        registry.register(Box::new(Flaky)).unwrap();
        let bad = TypeDecl::structure("Bad", vec![]);
        let report = Validator::new(&registry)
            .run(&[bad, pod()], &RuleSelection::All)
            .unwrap();
        // the flaky failure on Bad is recorded...
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].rule, "flaky");
        assert_eq!(report.failures[0].type_name, "Bad");
        assert_eq!(report.failures[0].message, "boom");
        // ...and Pod still got its violation
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].member, "Containers");
    }

    #[test]
    fn rules_run_in_lexical_order_not_request_order() {
        let mut registry = RuleRegistry::builtin();
        registry.register(Box::new(FlagAll)).unwrap();
        // flag_all < list_type_missing lexically, despite the request order
        let selection = RuleSelection::Named(vec![
            "list_type_missing".to_owned(),
            "flag_all".to_owned(),
        ]);
        let report = Validator::new(&registry).run(&[pod()], &selection).unwrap();
        let rules: Vec<&str> = report.violations.iter().map(|v| v.rule.as_str()).collect();
        assert_eq!(
            rules,
            vec!["flag_all", "flag_all", "flag_all", "list_type_missing"]
        );
    }

    #[test]
    fn duplicate_selection_names_do_not_duplicate_work() {
        let registry = RuleRegistry::builtin();
        let selection = RuleSelection::Named(vec![
            "list_type_missing".to_owned(),
            "list_type_missing".to_owned(),
        ]);
        let report = Validator::new(&registry).run(&[pod()], &selection).unwrap();
        assert_eq!(report.violations.len(), 1);
    }

    #[test]
    fn types_are_reported_in_input_order() {
        let registry = RuleRegistry::builtin();
        let a = TypeDecl::structure(
            "B",
            vec![Member::new("Xs", TypeDecl::slice("[]X", TypeDecl::primitive("X")))],
        );
        let b = TypeDecl::structure(
            "A",
            vec![Member::new("Ys", TypeDecl::slice("[]Y", TypeDecl::primitive("Y")))],
        );
        let report = Validator::new(&registry)
            .run(&[a, b], &RuleSelection::All)
            .unwrap();
        let types: Vec<&str> = report.violations.iter().map(|v| v.type_name.as_str()).collect();
        // input order, not name order
        assert_eq!(types, vec!["B", "A"]);
    }

    #[test]
    fn parallel_run_matches_sequential_run_exactly() {
        let mut registry = RuleRegistry::builtin();
        registry.register(Box::new(Flaky)).unwrap();
        registry.register(Box::new(FlagAll)).unwrap();
        let types: Vec<TypeDecl> = (0..24)
            .map(|i| {
                if i % 5 == 0 {
                    TypeDecl::structure("Bad", vec![])
                } else {
                    let mut ty = pod();
                    ty.name = format!("Pod{i}");
                    ty
                }
            })
            .collect();
        let validator = Validator::new(&registry);
        let sequential = validator.run(&types, &RuleSelection::All).unwrap();
        let parallel = validator.run_parallel(&types, &RuleSelection::All).unwrap();
        assert_eq!(sequential, parallel);
        // byte-for-byte once serialized, too
        assert_eq!(
            serde_json::to_string(&sequential).unwrap(),
            serde_json::to_string(&parallel).unwrap()
        );
    }

    #[test]
    fn clean_report_is_distinguishable_from_failures() {
        let registry = RuleRegistry::builtin();
        let clean = Validator::new(&registry)
            .run(&[TypeDecl::primitive("string")], &RuleSelection::All)
            .unwrap();
        assert!(clean.is_clean());

        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Flaky)).unwrap();
        let failed = Validator::new(&registry)
            .run(&[TypeDecl::structure("Bad", vec![])], &RuleSelection::All)
            .unwrap();
        assert!(!failed.is_clean());
        assert!(failed.violations.is_empty());
    }
}
