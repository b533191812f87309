//! Doc-comment grammar engine
//!
//! A comment body is a sequence of lines. A line matching `marker? name :
//! rest` opens a new section; anything else is body text appended
//! (marker-stripped) to the currently open section. The first section,
//! before any header is seen, is implicitly `description`. At root level a
//! header is only recognized after a blank line (or at the start), so a
//! `label: text` pattern inside prose is never misread as a section.
//!
//! Each section name maps to a handler registered in a [`SectionRegistry`];
//! handlers receive an explicit [`ParseContext`] carrying the target
//! artifact and the definition built so far. Unknown section names are not
//! errors: they accumulate under their lowercase name so custom annotations
//! survive the round trip. Malformed text never aborts parsing; it folds
//! into the open section as body text.

pub mod sections;
pub mod typeexpr;

pub use typeexpr::{parse_types, TypeExpression};

use std::sync::OnceLock;

use regex::Regex;

use crate::artifact::{Artifact, ArtifactKind, ParsedDefinition, SectionBlock};

fn root_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(/!?)?[ \t]?([\w$]+)\s*:(.*)$").expect("valid regex"))
}

fn blank_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(/!?)?\s*$").expect("valid regex"))
}

fn marker_strip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*/!?(\s*)").expect("valid regex"))
}

// Argument names never contain spaces; a colon inside prose ("for
// example: this") must not open a new entry.
pub(crate) fn arg_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([\w$.]+)\s*(\?)?\s*:(.*)$").expect("valid regex"))
}

// Property names additionally admit a `static ` prefix.
pub(crate) fn prop_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*((?:static\s+)?[\w$.]+)\s*(\?)?\s*:(.*)$").expect("valid regex")
    })
}

/// Execution context passed to every section handler.
pub struct ParseContext<'a> {
    /// The artifact being documented.
    pub target: &'a Artifact,
    /// The full artifact table of the file, for member lookups.
    pub table: &'a [Artifact],
    /// The definition built so far.
    pub definition: ParsedDefinition,
}

/// Parses one explicitly written section into the definition.
pub type SectionParseFn = fn(&mut ParseContext, &SectionBlock);
/// Synthesizes a section from structural data when it was not written.
pub type SectionDefaultFn = fn(&mut ParseContext);
/// Reports whether the section's output key is already populated.
pub type SectionIsSetFn = fn(&ParsedDefinition) -> bool;

/// A registered section parser.
pub struct SectionHandler {
    /// Lowercase section name this handler answers to.
    pub name: &'static str,
    pub parse: SectionParseFn,
    pub default: Option<SectionDefaultFn>,
    pub is_set: SectionIsSetFn,
    /// When false, the default handler is never injected (the section only
    /// exists when written explicitly).
    pub inject_default: bool,
}

/// Explicit registry of section handlers.
///
/// Registration order is preserved; lookups resolve the most recently
/// registered handler for a name, so callers can shadow built-ins.
pub struct SectionRegistry {
    handlers: Vec<SectionHandler>,
}

impl SectionRegistry {
    /// An empty registry with no handlers.
    pub fn empty() -> Self {
        Self { handlers: Vec::new() }
    }

    /// A registry populated with the built-in section parsers.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        sections::register_builtin(&mut registry);
        registry
    }

    pub fn register(&mut self, handler: SectionHandler) {
        self.handlers.push(handler);
    }

    /// Resolve a lowercase section name; most recent registration wins.
    pub fn lookup(&self, name: &str) -> Option<&SectionHandler> {
        self.handlers.iter().rev().find(|h| h.name == name)
    }

    /// Run default handlers for every registered section that was not
    /// explicitly written, in registration order.
    fn apply_defaults(&self, ctx: &mut ParseContext) {
        for (i, handler) in self.handlers.iter().enumerate() {
            let shadowed = self.handlers[i + 1..].iter().any(|h| h.name == handler.name);
            if shadowed || !handler.inject_default {
                continue;
            }
            if (handler.is_set)(&ctx.definition) {
                continue;
            }
            if let Some(default) = handler.default {
                default(ctx);
            }
        }
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

struct LexedComment {
    blocks: Vec<SectionBlock>,
    global: bool,
}

fn finalize(blocks: &mut Vec<SectionBlock>, open: Option<(String, String)>, body: &[String]) {
    if let Some((name, extra)) = open {
        blocks.push(SectionBlock {
            name,
            extra,
            optional: false,
            body: body.join("\n").trim().to_string(),
        });
    }
}

/// Single-pass root-level lexer: split the comment into sections.
fn lex_root(value: &str) -> LexedComment {
    let lines: Vec<&str> = value.split('\n').filter(|l| !l.is_empty()).collect();

    let mut blocks = Vec::new();
    let mut global = false;
    let mut open = Some(("description".to_string(), String::new()));
    let mut body: Vec<String> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let at_boundary = i == 0 || blank_line_re().is_match(lines[i - 1]);
        if at_boundary {
            if let Some(caps) = root_header_re().captures(line) {
                if caps.get(1).is_some_and(|m| m.as_str() == "/!") {
                    global = true;
                }
                finalize(&mut blocks, open.take(), &body);
                body.clear();
                open = Some((caps[2].to_string(), caps[3].trim().to_string()));
                continue;
            }
        }
        body.push(marker_strip_re().replace(line, "$1").into_owned());
    }

    finalize(&mut blocks, open, &body);
    LexedComment { blocks, global }
}

/// Re-parse a section body with the stricter `name? : rest` sub-grammar,
/// producing one entry per parameter/property in declaration order. The
/// caller picks the header shape (arguments vs. properties). Lines before
/// the first entry header carry no entry and are skipped.
pub(crate) fn lex_sub(body: &str, header: &Regex) -> Vec<SectionBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<(String, String, bool)> = None;
    let mut entry_body: Vec<String> = Vec::new();

    for line in body.split('\n').filter(|l| !l.is_empty()) {
        if let Some(caps) = header.captures(line) {
            if let Some((name, extra, optional)) = open.take() {
                blocks.push(SectionBlock {
                    name,
                    extra,
                    optional,
                    body: entry_body.join("\n").trim().to_string(),
                });
                entry_body.clear();
            }
            open = Some((
                caps[1].trim().to_string(),
                caps[3].trim().to_string(),
                caps.get(2).is_some(),
            ));
            continue;
        }
        entry_body.push(line.to_string());
    }

    if let Some((name, extra, optional)) = open {
        blocks.push(SectionBlock {
            name,
            extra,
            optional,
            body: entry_body.join("\n").trim().to_string(),
        });
    }

    blocks
}

/// Parse one comment's text into a structured definition.
///
/// Sections dispatch to the registered handler; a section named after the
/// target artifact itself is read as a self-entry (types + description);
/// anything else accumulates under `unknown`. Afterwards, default handlers
/// fill in sections derivable from structural data.
pub fn parse_comment(
    value: &str,
    target: &Artifact,
    table: &[Artifact],
    registry: &SectionRegistry,
) -> ParsedDefinition {
    let lexed = lex_root(value);
    let mut ctx = ParseContext {
        target,
        table,
        definition: ParsedDefinition {
            global: lexed.global,
            ..Default::default()
        },
    };

    for block in &lexed.blocks {
        let key = block.name.to_lowercase();
        if let Some(handler) = registry.lookup(&key) {
            (handler.parse)(&mut ctx, block);
        } else if target.name.as_deref() == Some(block.name.as_str()) {
            sections::parse_self_entry(&mut ctx, block);
        } else {
            ctx.definition.unknown.entry(key).or_default().push(block.clone());
        }
    }

    registry.apply_defaults(&mut ctx);
    ctx.definition
}

/// Parse every attached comment in the sequence into its definition,
/// merging the global comment's defaults underneath each artifact's own
/// values. Returns a new sequence; relative order is unchanged.
pub fn parse_definitions(artifacts: Vec<Artifact>, registry: &SectionRegistry) -> Vec<Artifact> {
    let mut global_def: Option<ParsedDefinition> = None;
    let mut parsed: Vec<(usize, ParsedDefinition)> = Vec::new();

    // The associator guarantees the global comment, if any, sits at index 0,
    // so its definition is available before any other artifact merges it.
    for (i, artifact) in artifacts.iter().enumerate() {
        let Some(attachment) = &artifact.comment else {
            continue;
        };
        let mut definition = parse_comment(&attachment.value, artifact, &artifacts, registry);
        if artifact.generic_kind == ArtifactKind::GlobalDocComment {
            definition.global = true;
            global_def = Some(definition.clone());
        } else if let Some(global) = &global_def {
            definition.merge_global_defaults(global);
        }
        parsed.push((i, definition));
    }

    let mut artifacts = artifacts;
    for (i, definition) in parsed {
        if let Some(attachment) = artifacts[i].comment.as_mut() {
            attachment.definition = definition;
        }
    }
    artifacts
}

/// Apply `syntaxType` construct-kind overrides.
///
/// The override always rewrites the artifact's own kind. When it
/// reclassifies a class property as a function, the member is moved from the
/// owning class's `properties` into `methods`; without a resolvable parent
/// class the migration is skipped and only the kind changes.
pub fn apply_syntax_overrides(artifacts: &mut [Artifact]) {
    for i in 0..artifacts.len() {
        let Some(syntax_type) = artifacts[i]
            .definition()
            .and_then(|d| d.syntax_type.clone())
        else {
            continue;
        };

        let was = artifacts[i].generic_kind;
        let now = ArtifactKind::normalize(&syntax_type);
        artifacts[i].kind = syntax_type;
        artifacts[i].generic_kind = now;

        if was == ArtifactKind::PropertyDeclaration && now == ArtifactKind::FunctionDeclaration {
            let Some(parent) = artifacts[i].parent_class().cloned() else {
                continue;
            };
            if let Some(class) = artifacts
                .get_mut(parent.index)
                .and_then(|a| a.class_data_mut())
            {
                class.properties.retain(|&member| member != i);
                if !class.methods.contains(&i) {
                    class.methods.push(i);
                }
            }
        }
    }
}
