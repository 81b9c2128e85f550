use super::{Rule, RuleError};
use crate::model::{TypeDecl, TypeKind};

/// Tag every slice-typed struct member must carry to declare its merge
/// semantics (`atomic`, `set`, `map`) for downstream schema consumers.
pub const LIST_TYPE_TAG: &str = "listType";

/// Flags slice-typed members of a struct that carry no `listType` tag.
///
/// Presence is the whole check: any value, even an empty one, passes.
/// Whether the value names a real strategy is a separate rule's business.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListTypeMissing;

impl Rule for ListTypeMissing {
    fn name(&self) -> &str {
        "list_type_missing"
    }

    fn validate(&self, ty: &TypeDecl) -> Result<Vec<String>, RuleError> {
        let mut violations = Vec::new();
        if ty.kind != TypeKind::Struct {
            // Only struct members carry list semantics.
            return Ok(violations);
        }
        for member in &ty.members {
            if member.ty.kind != TypeKind::Slice {
                continue;
            }
            if member.tag(LIST_TYPE_TAG).is_none() {
                violations.push(member.name.clone());
            }
        }
        Ok(violations)
    }
}

// ------------------------------- Tests ------------------------------------ //
