//! Scope assignment and page grouping
//!
//! Every enriched artifact belongs to exactly one documentation scope; the
//! artifacts of a scope become one [`Page`]. Pages are registered under a
//! lookup key (`class-Animal`, an explicit scope name, `global`) that the
//! cross-reference resolver probes with its prefix list.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::artifact::{Artifact, ArtifactKind};

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w-]").expect("valid regex"))
}

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\W+").expect("valid regex"))
}

/// What a page documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// Defined by a class declaration.
    Class,
    /// A named scope with no defining class.
    Namespace,
    /// A whole-file pseudo-artifact rendered as a single page.
    Page,
}

/// A named bucket of artifacts sharing a documentation scope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub name: String,
    /// Sanitized slug for the rendered output file.
    pub file_name: String,
    pub kind: PageKind,
    /// Indices into the artifact table, in table order.
    pub artifacts: Vec<usize>,
    /// Set on alias entries only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_page_name: Option<String>,
}

/// The documentation scope name of one artifact.
///
/// Priority: an explicit `docScope` in the parsed definition, then a class
/// declaration's own name, then `class-{parent}` for class members, then
/// `global`.
pub fn scope_name(artifact: &Artifact) -> String {
    if let Some(scope) = artifact.definition().and_then(|d| d.doc_scope.clone()) {
        return scope;
    }
    match artifact.generic_kind {
        ArtifactKind::ClassDeclaration | ArtifactKind::Page => artifact
            .name
            .clone()
            .unwrap_or_else(|| "global".to_string()),
        _ => artifact
            .parent_class()
            .map_or_else(|| "global".to_string(), |p| format!("class-{}", p.name)),
    }
}

/// The page lookup key for one artifact.
///
/// Class declarations without an explicit scope register under
/// `class-{name}` so their members (whose scope name already carries that
/// prefix) land on the same page; every other scope name keys as-is.
fn lookup_key(artifact: &Artifact) -> String {
    let name = scope_name(artifact);
    let explicit_scope = artifact
        .definition()
        .is_some_and(|d| d.doc_scope.is_some());
    if artifact.generic_kind == ArtifactKind::ClassDeclaration && !explicit_scope {
        format!("class-{name}")
    } else {
        name
    }
}

/// Strip a page name down to the characters allowed in an output file name.
pub fn page_file_name(name: &str) -> String {
    slug_re().replace_all(name, "").into_owned()
}

/// Intra-page anchor id for one artifact, e.g. `method-push` or
/// `class-Animal`. Non-word runs in the name collapse to a single dash.
pub fn artifact_anchor(artifact: &Artifact) -> String {
    let category = match artifact.generic_kind {
        ArtifactKind::ClassDeclaration => "class",
        ArtifactKind::FunctionDeclaration => {
            if artifact.parent_class().is_some() {
                "method"
            } else {
                "function"
            }
        }
        ArtifactKind::PropertyDeclaration => "property",
        ArtifactKind::Page => "page",
        _ => "artifact",
    };
    let name = artifact.name.as_deref().unwrap_or_default();
    format!("{category}-{}", anchor_re().replace_all(name, "-"))
}

/// Case-insensitive stable sort by name, for page content ordering.
pub fn sort_by_name(artifacts: &[Artifact]) -> Vec<Artifact> {
    let mut sorted = artifacts.to_vec();
    sorted.sort_by_cached_key(|a| a.name.clone().unwrap_or_default().to_lowercase());
    sorted
}

/// The pages of one documentation run, keyed for resolver lookup.
///
/// Backed by an ordered map so iteration (and therefore rendering order) is
/// deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageSet {
    pages: BTreeMap<String, Page>,
}

impl PageSet {
    /// Group an enriched artifact table into pages.
    ///
    /// Plain comments are consumed by association and never carry a page of
    /// their own; the file-global pseudo-comment is kept so renderers can
    /// read its defaults off its scope page. Declared `alias` sections
    /// register shallow copies of the canonical page under `alias-{name}`
    /// with an `original_page_name` back-reference.
    pub fn build(artifacts: &[Artifact]) -> Self {
        let mut pages: BTreeMap<String, Page> = BTreeMap::new();
        let mut aliases: Vec<(String, String)> = Vec::new();

        for (index, artifact) in artifacts.iter().enumerate() {
            if artifact.generic_kind == ArtifactKind::DocComment {
                continue;
            }

            let key = lookup_key(artifact);
            let display = key
                .strip_prefix("class-")
                .unwrap_or(key.as_str())
                .to_string();
            let page = pages.entry(key.clone()).or_insert_with(|| Page {
                file_name: page_file_name(&display),
                name: display,
                kind: PageKind::Namespace,
                artifacts: Vec::new(),
                alias: None,
                original_page_name: None,
            });
            page.artifacts.push(index);

            match artifact.generic_kind {
                ArtifactKind::ClassDeclaration => page.kind = PageKind::Class,
                ArtifactKind::Page if page.kind != PageKind::Class => {
                    page.kind = PageKind::Page;
                }
                _ => {}
            }

            if let Some(definition) = artifact.definition() {
                for alias in &definition.aliases {
                    aliases.push((alias.clone(), key.clone()));
                }
            }
        }

        for (alias, canonical) in aliases {
            let Some(page) = pages.get(&canonical) else {
                continue;
            };
            let mut copy = page.clone();
            copy.original_page_name = Some(copy.name.clone());
            copy.file_name = page_file_name(&alias);
            copy.name.clone_from(&alias);
            copy.alias = Some(alias.clone());
            pages.insert(format!("alias-{alias}"), copy);
        }

        Self { pages }
    }

    pub fn get(&self, key: &str) -> Option<&Page> {
        self.pages.get(key)
    }

    /// Lookup returning the stored key alongside the page.
    pub fn entry(&self, key: &str) -> Option<(&str, &Page)> {
        self.pages
            .get_key_value(key)
            .map(|(k, page)| (k.as_str(), page))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Page)> {
        self.pages.iter().map(|(k, page)| (k.as_str(), page))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{
        ArtifactData, ClassData, CommentAttachment, ParentClass, ParsedDefinition, PropertyData,
    };

    fn with_definition(mut artifact: Artifact, definition: ParsedDefinition) -> Artifact {
        artifact.comment = Some(CommentAttachment {
            value: String::new(),
            definition,
        });
        artifact
    }

    fn class(name: &str, start: usize, end: usize) -> Artifact {
        Artifact::new("ClassDeclaration", start, end)
            .with_name(name)
            .with_data(ArtifactData::Class(ClassData::default()))
    }

    fn member(name: &str, parent: &str, start: usize, end: usize) -> Artifact {
        let mut artifact = Artifact::new("PropertyDeclaration", start, end)
            .with_name(name)
            .with_data(ArtifactData::Property(PropertyData::default()));
        artifact.set_parent_class(ParentClass {
            index: 0,
            name: parent.to_string(),
        });
        artifact
    }

    #[test]
    fn test_scope_name_priority() {
        let scoped = with_definition(
            Artifact::new("FunctionDeclaration", 0, 10).with_name("f"),
            ParsedDefinition {
                doc_scope: Some("Widgets".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(scope_name(&scoped), "Widgets");

        assert_eq!(scope_name(&class("Animal", 0, 100)), "Animal");
        assert_eq!(scope_name(&member("feetCount", "Animal", 10, 12)), "class-Animal");
        assert_eq!(
            scope_name(&Artifact::new("FunctionDeclaration", 0, 10).with_name("loose")),
            "global"
        );
    }

    #[test]
    fn test_class_and_members_share_one_page() {
        let table = vec![class("Animal", 0, 100), member("feetCount", "Animal", 10, 12)];
        let pages = PageSet::build(&table);

        assert_eq!(pages.len(), 1);
        let page = pages.get("class-Animal").unwrap();
        assert_eq!(page.name, "Animal");
        assert_eq!(page.kind, PageKind::Class);
        assert_eq!(page.artifacts, [0, 1]);
    }

    #[test]
    fn test_explicit_scope_makes_namespace_page() {
        let artifact = with_definition(
            Artifact::new("FunctionDeclaration", 0, 10).with_name("f"),
            ParsedDefinition {
                doc_scope: Some("Widgets".to_string()),
                ..Default::default()
            },
        );
        let pages = PageSet::build(&[artifact]);

        let page = pages.get("Widgets").unwrap();
        assert_eq!(page.kind, PageKind::Namespace);
        assert_eq!(page.name, "Widgets");
    }

    #[test]
    fn test_alias_registers_shallow_copy() {
        let aliased = with_definition(
            class("Animal", 0, 100),
            ParsedDefinition {
                aliases: vec!["Beast".to_string()],
                ..Default::default()
            },
        );
        let pages = PageSet::build(&[aliased]);

        assert_eq!(pages.len(), 2);
        let alias = pages.get("alias-Beast").unwrap();
        assert_eq!(alias.name, "Beast");
        assert_eq!(alias.alias.as_deref(), Some("Beast"));
        assert_eq!(alias.original_page_name.as_deref(), Some("Animal"));
        assert_eq!(alias.artifacts, pages.get("class-Animal").unwrap().artifacts);
    }

    #[test]
    fn test_comments_carry_no_page() {
        let table = vec![Artifact::doc_comment("/ text", 0, 6)];
        assert!(PageSet::build(&table).is_empty());
    }

    #[test]
    fn test_global_comment_lands_on_its_scope_page() {
        let scoped = with_definition(
            Artifact::new("GlobalDocComment", 0, 8),
            ParsedDefinition {
                doc_scope: Some("Widgets".to_string()),
                ..Default::default()
            },
        );
        let pages = PageSet::build(&[scoped]);
        assert_eq!(pages.get("Widgets").unwrap().artifacts, [0]);

        let unscoped = with_definition(
            Artifact::new("GlobalDocComment", 0, 8),
            ParsedDefinition::default(),
        );
        let pages = PageSet::build(&[unscoped]);
        assert_eq!(pages.get("global").unwrap().artifacts, [0]);
    }

    #[test]
    fn test_file_name_sanitized() {
        assert_eq!(page_file_name("My Page (v2)!"), "MyPagev2");
        assert_eq!(page_file_name("class-Animal"), "class-Animal");
    }

    #[test]
    fn test_artifact_anchor() {
        assert_eq!(artifact_anchor(&class("Animal", 0, 100)), "class-Animal");
        assert_eq!(
            artifact_anchor(&member("feet count", "Animal", 10, 12)),
            "property-feet-count"
        );
        let method = {
            let mut a = Artifact::new("ClassMethod", 20, 30)
                .with_name("walk")
                .with_data(ArtifactData::Function(Default::default()));
            a.set_parent_class(ParentClass {
                index: 0,
                name: "Animal".to_string(),
            });
            a
        };
        assert_eq!(artifact_anchor(&method), "method-walk");
        assert_eq!(
            artifact_anchor(&Artifact::new("FunctionDeclaration", 0, 10).with_name("free")),
            "function-free"
        );
    }

    #[test]
    fn test_sort_by_name_case_insensitive_stable() {
        let table = vec![
            Artifact::new("FunctionDeclaration", 0, 1).with_name("beta"),
            Artifact::new("FunctionDeclaration", 2, 3).with_name("Alpha"),
            Artifact::new("FunctionDeclaration", 4, 5).with_name("BETA"),
        ];
        let sorted = sort_by_name(&table);
        let names: Vec<_> = sorted.iter().filter_map(|a| a.name.as_deref()).collect();
        assert_eq!(names, ["Alpha", "beta", "BETA"]);
    }
}
