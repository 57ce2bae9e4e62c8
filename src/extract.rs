//! Variable reference extraction from template text.
//!
//! A reference is written `{{name}}`. The accepted grammar is:
//!
//! - exactly two opening braces, optional whitespace, an identifier, optional whitespace, exactly
//!   two closing braces;
//! - an identifier is `[A-Za-z_$][A-Za-z0-9_$]*`: ASCII letters, digits, underscore or dollar sign,
//!   not starting with a digit.
//!
//! Anything else is not a reference: an unterminated `{{`, a nested marker such as `{{{a}}}`
//! (brace runs longer than two on either side), empty braces, or content that is not a single
//! identifier (`{{a b}}`, `{{1a}}`). Scanning never fails; malformed markers are skipped.
//!
//! ```rust
//! use pipeline_graph::extract::extract_references;
//!
//! let refs = extract_references("{{a}} and {{ b }} and {{a}}");
//! assert_eq!(refs, vec!["a", "b"]);
//! ```

use crate::properties::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::{collections::BTreeSet, ops::Range};

/// Brace runs are captured whole so that nested markers can be rejected after matching.
static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\{+)\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*(\}+)")
        .expect("reference pattern is a valid regex")
});

/// A single well-formed reference occurrence within a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The referenced identifier, whitespace trimmed.
    pub name: NodeId,
    /// Byte range of the whole `{{ ... }}` marker.
    pub span: Range<usize>,
    /// 1-based line of the opening braces.
    pub line: usize,
    /// 1-based column (in chars) of the opening braces.
    pub column: usize,
}

/// Every well-formed reference in `text`, in order of appearance, duplicates included.
pub fn scan_references(text: &str) -> Vec<Reference> {
    REFERENCE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let open = caps.get(1)?;
            let name = caps.get(2)?;
            let close = caps.get(3)?;
            if open.len() != 2 || close.len() != 2 {
                return None;
            }
            let (line, column) = line_column(text, open.start());
            Some(Reference {
                name: NodeId::from(name.as_str()),
                span: open.start()..close.end(),
                line,
                column,
            })
        })
        .collect()
}

/// The identifiers referenced by `text`, duplicates removed, in first-occurrence order.
pub fn extract_references(text: &str) -> Vec<NodeId> {
    let mut seen = BTreeSet::new();
    scan_references(text)
        .into_iter()
        .filter_map(|reference| {
            if seen.insert(reference.name.clone()) {
                Some(reference.name)
            } else {
                None
            }
        })
        .collect()
}

fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
