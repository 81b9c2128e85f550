//! Read-only model of declared types, as handed over by a code-generation
//! front end. Rules inspect this; nothing in the engine mutates it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tag key → values, insertion order kept. Repeated keys accumulate, so an
/// absent key (`None`) stays distinguishable from a present-but-empty value.
pub type TagMap = IndexMap<String, Vec<String>>;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Structural kind of a declared type.
///
/// Front ends may emit kinds this engine has no opinion about (interfaces,
/// channels, aliases, ...); those decode as `Other` instead of failing the
/// whole descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TypeKind {
    Struct,
    Slice,
    Map,
    Primitive,
    Pointer,
    Other,
}

impl From<String> for TypeKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "struct" => Self::Struct,
            "slice" => Self::Slice,
            "map" => Self::Map,
            "primitive" => Self::Primitive,
            "pointer" => Self::Pointer,
            _ => Self::Other,
        }
    }
}

/// One declared data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Identifier used in violation reporting.
    pub name: String,
    pub kind: TypeKind,
    /// Members in declaration order. Populated for `Struct` kinds only;
    /// empty for everything else.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
    /// Element type for slice, map, and pointer kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elem: Option<Box<TypeDecl>>,
    /// Key type for map kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Box<TypeDecl>>,
}

/// One field of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique within the owning struct's member sequence.
    pub name: String,
    /// The member's own type; rules usually only read its `kind`.
    #[serde(rename = "type")]
    pub ty: TypeDecl,
    /// Raw annotation lines from the front end. The loader derives tags
    /// from these so rules never have to parse comment text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    /// Parsed marker tags (explicit plus comment-derived).
    #[serde(default, skip_serializing_if = "TagMap::is_empty")]
    pub tags: TagMap,
}

/// Top-level descriptor document: `{ "types": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFile {
    pub types: Vec<TypeDecl>,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl TypeDecl {
    pub fn structure(name: &str, members: Vec<Member>) -> Self {
        Self {
            name: name.to_owned(),
            kind: TypeKind::Struct,
            members,
            elem: None,
            key: None,
        }
    }

    pub fn slice(name: &str, elem: TypeDecl) -> Self {
        Self {
            name: name.to_owned(),
            kind: TypeKind::Slice,
            members: Vec::new(),
            elem: Some(Box::new(elem)),
            key: None,
        }
    }

    pub fn map(name: &str, key: TypeDecl, elem: TypeDecl) -> Self {
        Self {
            name: name.to_owned(),
            kind: TypeKind::Map,
            members: Vec::new(),
            elem: Some(Box::new(elem)),
            key: Some(Box::new(key)),
        }
    }

    pub fn primitive(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: TypeKind::Primitive,
            members: Vec::new(),
            elem: None,
            key: None,
        }
    }

    pub fn pointer(name: &str, elem: TypeDecl) -> Self {
        Self {
            name: name.to_owned(),
            kind: TypeKind::Pointer,
            members: Vec::new(),
            elem: Some(Box::new(elem)),
            key: None,
        }
    }
}

impl Member {
    pub fn new(name: &str, ty: TypeDecl) -> Self {
        Self {
            name: name.to_owned(),
            ty,
            comments: Vec::new(),
            tags: TagMap::new(),
        }
    }

    pub fn with_comments<I>(mut self, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.comments.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags
            .entry(key.to_owned())
            .or_default()
            .push(value.to_owned());
        self
    }

    /// Tag values for `key`; `None` when the key was never declared.
    pub fn tag(&self, key: &str) -> Option<&[String]> {
        self.tags.get(key).map(Vec::as_slice)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }
}

// ------------------------------- Tests ------------------------------------ //
