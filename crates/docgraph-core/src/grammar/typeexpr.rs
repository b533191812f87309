//! Generic-aware type-expression parsing
//!
//! Splits a type expression on top-level `|` without splitting inside
//! `<...>` generic groups. Generic spans are masked with opaque placeholder
//! tokens (iterated to a fixpoint, which handles arbitrary nesting), the
//! split and trim happen on the generic-free string, and the placeholders
//! are expanded back afterwards.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Result of parsing one type expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeExpression {
    /// Union members, in original text order.
    pub types: Vec<String>,
    /// Trailing `= <expr>` assignment clause, if present.
    pub assignment: Option<String>,
}

fn generic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

fn part_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@@@PART\[(\d+)\]@@@").expect("valid regex"))
}

fn assignment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"=\s+(.*)$").expect("valid regex"))
}

/// Mask every match of `pattern` with a placeholder token, repeating until
/// no matches remain. Matched spans are appended to `parts`.
pub(crate) fn substitute(input: &str, pattern: &Regex, parts: &mut Vec<String>) -> String {
    let mut current = input.to_string();
    loop {
        let replaced = pattern
            .replace_all(&current, |caps: &Captures| {
                parts.push(caps[0].to_string());
                format!("@@@PART[{}]@@@", parts.len() - 1)
            })
            .into_owned();
        if replaced == current {
            return current;
        }
        current = replaced;
    }
}

/// Expand placeholder tokens back into their original spans, repeating
/// until no tokens remain.
pub(crate) fn expand(input: &str, parts: &[String]) -> String {
    let mut current = input.to_string();
    loop {
        let replaced = part_token_re()
            .replace_all(&current, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| parts.get(idx).cloned())
                    .unwrap_or_default()
            })
            .into_owned();
        if replaced == current {
            return current;
        }
        current = replaced;
    }
}

/// Parse a type expression into its union members and optional trailing
/// assignment clause. Empty or whitespace-only input yields an empty type
/// list and no assignment.
pub fn parse_types(input: &str) -> TypeExpression {
    if input.trim().is_empty() {
        return TypeExpression::default();
    }

    let mut parts = Vec::new();
    let masked = substitute(input, generic_re(), &mut parts);

    let mut assignment = None;
    let masked = assignment_re()
        .replace(&masked, |caps: &Captures| {
            assignment = Some(expand(caps[1].trim(), &parts));
            String::new()
        })
        .trim()
        .to_string();

    let types = masked
        .split('|')
        .map(|segment| expand(segment, &parts).trim().to_string())
        .filter(|segment| !segment.is_empty())
        .collect();

    TypeExpression { types, assignment }
}
