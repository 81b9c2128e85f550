//! Descriptor input: resolve path patterns, decode descriptor JSON, derive
//! member tags from comment lines.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::jq_exec::{self, JqError};
use crate::model::{ModelFile, TypeDecl};
use crate::tags::{extract_comment_tags, TAG_MARKER};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("bad input pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// A glob that matches nothing is an error, never an empty lint run.
    #[error("glob pattern matched no files: {pattern}")]
    NoMatches { pattern: String },
    #[error("failed to walk `{pattern}`: {source}")]
    Walk {
        pattern: String,
        #[source]
        source: glob::GlobError,
    },
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("jq filter failed on {}: {source}", path.display())]
    Filter {
        path: PathBuf,
        #[source]
        source: JqError,
    },
    #[error("failed to decode {}: {detail}", path.display())]
    Decode { path: PathBuf, detail: String },
}

// ————————————————————————————————————————————————————————————————————————————
// LOADING
// ————————————————————————————————————————————————————————————————————————————

/// Expand literal paths and glob patterns into a concrete file list,
/// keeping the caller's pattern order.
pub fn resolve_input_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, LoadError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if has_glob_chars(pattern) {
            let entries = glob::glob(pattern).map_err(|source| LoadError::Pattern {
                pattern: pattern.to_owned(),
                source,
            })?;
            let mut matched_any = false;
            for entry in entries {
                let path = entry.map_err(|source| LoadError::Walk {
                    pattern: pattern.to_owned(),
                    source,
                })?;
                matched_any = true;
                out.push(path);
            }
            if !matched_any {
                return Err(LoadError::NoMatches { pattern: pattern.to_owned() });
            }
        } else {
            // Literal path; existence is checked at read time.
            out.push(PathBuf::from(pattern));
        }
    }
    Ok(out)
}

/// Load every descriptor file, optionally reshaping each document with a jq
/// filter first. Types arrive in file order, then per-file declaration
/// order. Member tags are extended with tags derived from comment lines, so
/// rules see a single map either way.
pub fn load_models(
    paths: &[PathBuf],
    jq_filter: Option<&str>,
) -> Result<Vec<TypeDecl>, LoadError> {
    let mut types = Vec::new();
    for path in paths {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?;
        match jq_filter {
            None => {
                let file = decode_str(path, &source)?;
                types.extend(file.types);
            }
            Some(expr) => {
                let document: Value =
                    serde_json::from_str(&source).map_err(|err| LoadError::Decode {
                        path: path.clone(),
                        detail: err.to_string(),
                    })?;
                let outputs = jq_exec::apply_filter(expr, &document).map_err(|source| {
                    LoadError::Filter { path: path.clone(), source }
                })?;
                for output in outputs {
                    let file = decode_value(path, output)?;
                    types.extend(file.types);
                }
            }
        }
    }
    for ty in &mut types {
        derive_member_tags(ty);
    }
    Ok(types)
}

/// `resolve_input_patterns` + `load_models` in one call.
pub fn load_from_patterns<I>(
    patterns: I,
    jq_filter: Option<&str>,
) -> Result<Vec<TypeDecl>, LoadError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let paths = resolve_input_patterns(patterns)?;
    load_models(&paths, jq_filter)
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

// Decode with JSON-path context so deep failures name their location.
fn decode_str(path: &Path, src: &str) -> Result<ModelFile, LoadError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let json_path = err.path().to_string();
        LoadError::Decode {
            path: path.to_owned(),
            detail: format!("at JSON path {json_path} → {}", err.into_inner()),
        }
    })
}

fn decode_value(path: &Path, value: Value) -> Result<ModelFile, LoadError> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let json_path = err.path().to_string();
        LoadError::Decode {
            path: path.to_owned(),
            detail: format!("at JSON path {json_path} → {}", err.into_inner()),
        }
    })
}

// Extend each member's explicit tags with tags extracted from its comment
// lines, recursing through nested struct/element types. Explicit entries
// stay first so front ends that pre-parse keep their value order.
fn derive_member_tags(ty: &mut TypeDecl) {
    for member in &mut ty.members {
        if !member.comments.is_empty() {
            let derived = extract_comment_tags(TAG_MARKER, &member.comments);
            for (key, values) in derived {
                member.tags.entry(key).or_default().extend(values);
            }
        }
        derive_member_tags(&mut member.ty);
    }
    if let Some(elem) = ty.elem.as_deref_mut() {
        derive_member_tags(elem);
    }
    if let Some(key) = ty.key.as_deref_mut() {
        derive_member_tags(key);
    }
}

// ------------------------------- Tests ------------------------------------ //
