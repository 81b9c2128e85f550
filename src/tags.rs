//! Marker-tag extraction from annotation comment lines.
//!
//! Convention: a line whose trimmed form starts with the marker declares a
//! tag, `+key=value`. The part before the first `=` is the key, the rest is
//! the value; no `=` means an empty value. Repeated keys accumulate values
//! in encounter order. Prose that merely starts with the marker (`+ some
//! note`) is not a tag: keys must look like identifiers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::TagMap;

/// Marker that opens a tag line.
pub const TAG_MARKER: &str = "+";

// Identifier-ish keys; dots, colons, and dashes show up in generator tags
// like `k8s:validation-gen`.
static TAG_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.:-]*$").unwrap());

/// Collect marker tags from `lines` into a tag map.
pub fn extract_comment_tags<I>(marker: &str, lines: I) -> TagMap
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = TagMap::new();
    for raw in lines {
        let line = raw.as_ref().trim();
        let rest = match line.strip_prefix(marker) {
            Some(rest) => rest,
            None => continue,
        };
        let (key, value) = match rest.split_once('=') {
            Some((key, value)) => (key, value),
            None => (rest, ""),
        };
        if !TAG_KEY.is_match(key) {
            continue;
        }
        out.entry(key.to_owned()).or_default().push(value.to_owned());
    }
    out
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_key_value_pairs() {
        let tags = extract_comment_tags("+", ["Items holds the list.", "+listType=atomic"]);
        assert_eq!(tags.get("listType"), Some(&vec!["atomic".to_owned()]));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn splits_on_first_equals_only() {
        let tags = extract_comment_tags("+", ["+default=a=b"]);
        assert_eq!(tags.get("default"), Some(&vec!["a=b".to_owned()]));
    }

    #[test]
    fn missing_equals_yields_empty_value() {
        let tags = extract_comment_tags("+", ["+optional"]);
        assert_eq!(tags.get("optional"), Some(&vec![String::new()]));
    }

    #[test]
    fn repeated_keys_accumulate_in_encounter_order() {
        let tags = extract_comment_tags("+", ["+k=first", "+k=second"]);
        assert_eq!(
            tags.get("k"),
            Some(&vec!["first".to_owned(), "second".to_owned()])
        );
    }

    #[test]
    fn leading_whitespace_is_trimmed_before_matching() {
        let tags = extract_comment_tags("+", ["   +listType=set"]);
        assert_eq!(tags.get("listType"), Some(&vec!["set".to_owned()]));
    }

    #[test]
    fn prose_bullets_are_not_tags() {
        // `+ one` looks like a markdown bullet, not a tag key.
        let tags = extract_comment_tags("+", ["+ one of the following", "+not a tag either"]);
        assert!(tags.is_empty());
    }

    #[test]
    fn namespaced_keys_are_accepted() {
        let tags = extract_comment_tags("+", ["+k8s:openapi-gen=true"]);
        assert_eq!(tags.get("k8s:openapi-gen"), Some(&vec!["true".to_owned()]));
    }

    #[test]
    fn empty_lines_are_skipped() {
        let tags = extract_comment_tags("+", ["", "   ", "+listType=map"]);
        assert_eq!(tags.len(), 1);
    }
}
