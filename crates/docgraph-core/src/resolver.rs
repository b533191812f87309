//! Cross-reference resolution
//!
//! Turns author-written reference strings (`Scope`, `Scope.Member`,
//! `Scope:Member`) into a concrete page, and optionally the matching
//! artifact on that page. Resolution failure is never fatal: the caller
//! renders the literal reference text and a [`ResolveWarning`] records the
//! event.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::artifact::{Artifact, SeeRef};
use crate::page::{Page, PageSet};

/// Scope-key candidates, probed in priority order; the empty prefix tries
/// the bare name last.
const SCOPE_PREFIXES: [&str; 6] = ["namespace-", "class-", "property-", "method-", "alias-", ""];

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```.*?```").expect("valid regex"))
}

fn see_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<see(?:\s+name="([^"]*)")?\s*>([^<]*)</see>"#).expect("valid regex")
    })
}

/// A reference that resolved to no page. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveWarning {
    pub reference: String,
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unresolved cross-reference `{}`", self.reference)
    }
}

/// A successful resolution: the page, its lookup key, and the matched
/// member's artifact-table index when the member part was found.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub page_key: &'a str,
    pub page: &'a Page,
    pub artifact: Option<usize>,
}

/// An inline `<see>` tag found in description text, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSeeTag {
    pub reference: String,
    /// Display label from `<see name="...">`, when written.
    pub label: Option<String>,
    pub start: usize,
    pub end: usize,
}

/// Split a reference into its scope part and optional member part.
fn split_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.find(['.', ':']) {
        Some(at) => {
            let member = reference[at + 1..].trim();
            (&reference[..at], (!member.is_empty()).then_some(member))
        }
        None => (reference, None),
    }
}

/// Extract inline `<see>` tags from description text.
///
/// Tags inside fenced code spans are skipped so code samples showing the
/// markup are left alone. Spans index the original text.
pub fn extract_inline_see(text: &str) -> Vec<InlineSeeTag> {
    let fences: Vec<(usize, usize)> = fence_re()
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    see_tag_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let fenced = fences
                .iter()
                .any(|&(start, end)| start <= whole.start() && whole.end() <= end);
            if fenced {
                return None;
            }
            Some(InlineSeeTag {
                reference: caps.get(2).map_or(String::new(), |m| m.as_str().trim().to_string()),
                label: caps.get(1).map(|m| m.as_str().to_string()),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Reference resolver over one run's pages and artifact table.
///
/// Warnings accumulate on the resolver; they never change control flow.
pub struct Resolver<'a> {
    pages: &'a PageSet,
    artifacts: &'a [Artifact],
    warnings: Vec<ResolveWarning>,
}

impl<'a> Resolver<'a> {
    pub fn new(pages: &'a PageSet, artifacts: &'a [Artifact]) -> Self {
        Self {
            pages,
            artifacts,
            warnings: Vec::new(),
        }
    }

    /// Pure lookup: no warning is recorded on a miss.
    ///
    /// The scope part is tried against the prefix candidates in priority
    /// order; the first registered page wins. A member part that matches no
    /// artifact on that page still returns the page-level match.
    pub fn lookup(&self, reference: &str) -> Option<Resolved<'a>> {
        let (scope, member) = split_reference(reference);

        for prefix in SCOPE_PREFIXES {
            let candidate = format!("{prefix}{scope}");
            let Some((page_key, page)) = self.pages.entry(&candidate) else {
                continue;
            };

            let artifact = member.and_then(|wanted| {
                page.artifacts
                    .iter()
                    .copied()
                    .find(|&i| {
                        self.artifacts
                            .get(i)
                            .and_then(|a| a.name.as_deref())
                            == Some(wanted)
                    })
            });

            return Some(Resolved {
                page_key,
                page,
                artifact,
            });
        }

        None
    }

    /// Resolve a reference, recording a warning when nothing matches.
    pub fn resolve(&mut self, reference: &str) -> Option<Resolved<'a>> {
        let found = self.lookup(reference);
        if found.is_none() {
            self.warnings.push(ResolveWarning {
                reference: reference.to_string(),
            });
        }
        found
    }

    /// Resolve a parsed `see` section entry. Static member references
    /// resolve through their collapsed alternate spelling.
    pub fn resolve_see(&mut self, see: &SeeRef) -> Option<Resolved<'a>> {
        let reference = see.alt_name.as_deref().unwrap_or(&see.name);
        self.resolve(reference)
    }

    pub fn warnings(&self) -> &[ResolveWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ResolveWarning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactData, ClassData, ParentClass, PropertyData};
    use crate::page::PageSet;

    fn table() -> Vec<Artifact> {
        let class = Artifact::new("ClassDeclaration", 0, 100)
            .with_name("Animal")
            .with_data(ArtifactData::Class(ClassData {
                properties: vec![1],
                ..Default::default()
            }));
        let mut property = Artifact::new("PropertyDeclaration", 10, 12)
            .with_name("feetCount")
            .with_data(ArtifactData::Property(PropertyData::default()));
        property.set_parent_class(ParentClass {
            index: 0,
            name: "Animal".to_string(),
        });
        vec![class, property]
    }

    #[test]
    fn test_resolve_class_by_bare_scope() {
        let artifacts = table();
        let pages = PageSet::build(&artifacts);
        let resolver = Resolver::new(&pages, &artifacts);

        let found = resolver.lookup("Animal").unwrap();
        assert_eq!(found.page_key, "class-Animal");
        assert_eq!(found.page.name, "Animal");
        assert!(found.artifact.is_none());
    }

    #[test]
    fn test_resolve_member_by_dot_and_colon() {
        let artifacts = table();
        let pages = PageSet::build(&artifacts);
        let resolver = Resolver::new(&pages, &artifacts);

        let dot = resolver.lookup("Animal.feetCount").unwrap();
        assert_eq!(dot.artifact, Some(1));
        let colon = resolver.lookup("Animal:feetCount").unwrap();
        assert_eq!(colon.artifact, Some(1));
    }

    #[test]
    fn test_member_miss_returns_page_match() {
        let artifacts = table();
        let pages = PageSet::build(&artifacts);
        let resolver = Resolver::new(&pages, &artifacts);

        let found = resolver.lookup("Animal.noSuchMember").unwrap();
        assert_eq!(found.page.name, "Animal");
        assert!(found.artifact.is_none());
    }

    #[test]
    fn test_unresolved_reference_records_warning() {
        let artifacts = table();
        let pages = PageSet::build(&artifacts);
        let mut resolver = Resolver::new(&pages, &artifacts);

        assert!(resolver.resolve("Vegetable").is_none());
        assert_eq!(resolver.warnings().len(), 1);
        assert_eq!(resolver.warnings()[0].reference, "Vegetable");
    }

    #[test]
    fn test_resolve_see_uses_alternate_spelling() {
        let artifacts = table();
        let pages = PageSet::build(&artifacts);
        let mut resolver = Resolver::new(&pages, &artifacts);

        let see = SeeRef {
            name: "Animal.static feetCount".to_string(),
            alt_name: Some("Animal.feetCount".to_string()),
            is_static: true,
        };
        let found = resolver.resolve_see(&see).unwrap();
        assert_eq!(found.artifact, Some(1));
        assert!(resolver.warnings().is_empty());
    }

    #[test]
    fn test_extract_inline_see_tags() {
        let text = "Walks like <see>Animal.feetCount</see> and also \
                    <see name=\"the class\">Animal</see>.";
        let tags = extract_inline_see(text);

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].reference, "Animal.feetCount");
        assert!(tags[0].label.is_none());
        assert_eq!(&text[tags[0].start..tags[0].end], "<see>Animal.feetCount</see>");
        assert_eq!(tags[1].reference, "Animal");
        assert_eq!(tags[1].label.as_deref(), Some("the class"));
    }

    #[test]
    fn test_inline_see_ignored_inside_fenced_code() {
        let text = "Before\n```\n<see>Animal</see>\n```\nAfter <see>Animal</see>";
        let tags = extract_inline_see(text);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].start, text.rfind("<see>").unwrap());
    }
}
