//! Built-in section parsers and their default handlers.

use std::sync::OnceLock;

use regex::Regex;

use super::{
    arg_header_re, lex_sub, parse_types, prop_header_re, ParseContext, SectionBlock,
    SectionHandler, SectionRegistry,
};
use crate::artifact::{
    ArgDef, Artifact, ArtifactKind, Description, PropDef, ReturnDef, SeeRef,
};

fn static_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^static\s+").expect("valid regex"))
}

fn static_see_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.static\s+").expect("valid regex"))
}

pub(crate) fn register_builtin(registry: &mut SectionRegistry) {
    let handlers = [
        SectionHandler {
            name: "description",
            parse: parse_description,
            default: None,
            is_set: |d| d.description.is_some(),
            inject_default: true,
        },
        SectionHandler {
            name: "desc",
            parse: parse_description,
            default: None,
            is_set: |d| d.description.is_some(),
            inject_default: false,
        },
        SectionHandler {
            name: "arguments",
            parse: parse_arguments,
            default: Some(default_arguments),
            is_set: |d| d.arguments.is_some(),
            inject_default: true,
        },
        SectionHandler {
            name: "return",
            parse: parse_return,
            default: Some(default_return),
            is_set: |d| d.return_def.is_some(),
            inject_default: true,
        },
        SectionHandler {
            name: "properties",
            parse: parse_properties,
            default: Some(default_properties),
            is_set: |d| d.properties.is_some(),
            inject_default: true,
        },
        SectionHandler {
            name: "type",
            parse: parse_type,
            default: Some(default_type),
            is_set: |d| d.types.is_some(),
            inject_default: true,
        },
        SectionHandler {
            name: "see",
            parse: parse_see,
            default: None,
            is_set: |d| !d.see.is_empty(),
            inject_default: true,
        },
        SectionHandler {
            name: "note",
            parse: parse_note,
            default: None,
            is_set: |d| !d.notes.is_empty(),
            inject_default: true,
        },
        SectionHandler {
            name: "example",
            parse: parse_example,
            default: None,
            is_set: |d| !d.examples.is_empty(),
            inject_default: true,
        },
        SectionHandler {
            name: "interface",
            parse: parse_interface,
            default: None,
            is_set: |d| !d.interfaces.is_empty(),
            inject_default: true,
        },
        SectionHandler {
            name: "alias",
            parse: parse_alias,
            default: None,
            is_set: |d| !d.aliases.is_empty(),
            inject_default: true,
        },
        SectionHandler {
            name: "docscope",
            parse: parse_docscope,
            default: None,
            is_set: |d| d.doc_scope.is_some(),
            inject_default: false,
        },
        SectionHandler {
            name: "extends",
            parse: parse_extends,
            default: None,
            is_set: |d| d.extends.is_some(),
            inject_default: false,
        },
        SectionHandler {
            name: "syntaxtype",
            parse: parse_syntaxtype,
            default: None,
            is_set: |d| d.syntax_type.is_some(),
            inject_default: false,
        },
    ];

    for handler in handlers {
        registry.register(handler);
    }
}

/// Join a section's header remainder and indented body into one text.
fn combined_text(block: &SectionBlock) -> String {
    match (block.extra.is_empty(), block.body.is_empty()) {
        (false, false) => format!("{}\n{}", block.extra, block.body),
        (false, true) => block.extra.clone(),
        (true, _) => block.body.clone(),
    }
}

fn parse_description(ctx: &mut ParseContext, block: &SectionBlock) {
    let text = combined_text(block);
    if text.is_empty() {
        return;
    }
    let body = match &ctx.definition.description {
        Some(existing) if !existing.body.is_empty() => {
            format!("{}\n{}", existing.body, text)
        }
        _ => text,
    };
    ctx.definition.description = Some(Description { body });
}

fn parse_arguments(ctx: &mut ParseContext, block: &SectionBlock) {
    let entries = lex_sub(&block.body, arg_header_re());
    if entries.is_empty() {
        return;
    }

    let target = ctx.target;
    let structural = target.arguments();
    let parsed = entries.iter().enumerate().map(|(i, entry)| {
        let fallback = structural.get(i);
        let (types, assignment) = if entry.extra.is_empty() {
            (
                fallback.map(|a| a.types.clone()).unwrap_or_default(),
                fallback.and_then(|a| a.assignment.clone()),
            )
        } else {
            let expr = parse_types(&entry.extra);
            let assignment = expr
                .assignment
                .or_else(|| fallback.and_then(|a| a.assignment.clone()));
            (expr.types, assignment)
        };
        ArgDef {
            name: entry.name.clone(),
            description: entry.body.clone(),
            optional: entry.optional || fallback.is_some_and(|a| a.optional),
            types,
            assignment,
        }
    });

    ctx.definition
        .arguments
        .get_or_insert_with(Vec::new)
        .extend(parsed);
}

fn default_arguments(ctx: &mut ParseContext) {
    let target = ctx.target;
    if target.generic_kind != ArtifactKind::FunctionDeclaration {
        return;
    }
    let structural = target.arguments();
    if structural.is_empty() {
        return;
    }
    ctx.definition.arguments = Some(
        structural
            .iter()
            .map(|arg| ArgDef {
                name: arg.name.clone(),
                description: arg.description.clone(),
                optional: arg.optional,
                types: arg.types.clone(),
                assignment: arg.assignment.clone(),
            })
            .collect(),
    );
}

fn parse_return(ctx: &mut ParseContext, block: &SectionBlock) {
    let target = ctx.target;
    let types = if block.extra.is_empty() {
        target.return_info().map(|r| r.types.clone()).unwrap_or_default()
    } else {
        parse_types(&block.extra).types
    };
    ctx.definition.return_def = Some(ReturnDef {
        types,
        description: block.body.clone(),
    });
}

fn default_return(ctx: &mut ParseContext) {
    let target = ctx.target;
    let Some(function) = target.function_data() else {
        return;
    };

    if let Some(ret) = &function.return_type {
        ctx.definition.return_def = Some(ReturnDef {
            types: ret.types.clone(),
            description: ret.description.clone(),
        });
        return;
    }

    // Constructors implicitly return an instance of the owning class.
    if function.is_constructor {
        if let Some(parent) = &function.parent_class {
            ctx.definition.return_def = Some(ReturnDef {
                types: vec![parent.name.clone()],
                description: String::new(),
            });
        }
    }
}

/// Structural property members of a class target, in link order.
fn class_members<'a>(target: &Artifact, table: &'a [Artifact]) -> Vec<&'a Artifact> {
    target
        .class_data()
        .map(|class| {
            class
                .properties
                .iter()
                .filter_map(|&index| table.get(index))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_properties(ctx: &mut ParseContext, block: &SectionBlock) {
    let entries = lex_sub(&block.body, prop_header_re());
    if entries.is_empty() {
        return;
    }

    let structural = class_members(ctx.target, ctx.table);
    let parsed = entries.iter().enumerate().map(|(i, entry)| {
        let (is_static, name) = match static_prefix_re().find(&entry.name) {
            Some(m) => (true, entry.name[m.end()..].to_string()),
            None => (false, entry.name.clone()),
        };
        let fallback = structural.get(i);
        let (types, assignment) = if entry.extra.is_empty() {
            (
                fallback.map(|p| p.types().to_vec()).unwrap_or_default(),
                fallback.and_then(|p| {
                    p.property_data().and_then(|d| d.assignment.clone())
                }),
            )
        } else {
            let expr = parse_types(&entry.extra);
            (expr.types, expr.assignment)
        };
        PropDef {
            name,
            is_static,
            description: entry.body.clone(),
            types,
            assignment,
        }
    });

    ctx.definition
        .properties
        .get_or_insert_with(Vec::new)
        .extend(parsed);
}

fn default_properties(ctx: &mut ParseContext) {
    if ctx.target.generic_kind != ArtifactKind::ClassDeclaration {
        return;
    }
    let structural = class_members(ctx.target, ctx.table);
    if structural.is_empty() {
        return;
    }
    ctx.definition.properties = Some(
        structural
            .iter()
            .map(|member| PropDef {
                name: member.name.clone().unwrap_or_default(),
                is_static: member.property_data().is_some_and(|p| p.is_static),
                description: String::new(),
                types: member.types().to_vec(),
                assignment: member
                    .property_data()
                    .and_then(|p| p.assignment.clone()),
            })
            .collect(),
    );
}

fn push_unique_types(definition_types: &mut Vec<String>, types: Vec<String>) {
    for t in types {
        if !definition_types.contains(&t) {
            definition_types.push(t);
        }
    }
}

fn parse_type(ctx: &mut ParseContext, block: &SectionBlock) {
    let target = ctx.target;
    let types = if block.extra.is_empty() {
        target.types().to_vec()
    } else {
        parse_types(&block.extra).types
    };
    push_unique_types(ctx.definition.types.get_or_insert_with(Vec::new), types);
}

fn default_type(ctx: &mut ParseContext) {
    let structural = ctx.target.types();
    if !structural.is_empty() {
        ctx.definition.types = Some(structural.to_vec());
    }
}

fn parse_see(ctx: &mut ParseContext, block: &SectionBlock) {
    // Only the header remainder names the reference; indented body lines are
    // commentary and would poison resolver lookup.
    let name = block.extra.trim().to_string();
    if name.is_empty() {
        return;
    }

    // `Class.static member` marks a static member reference; the alternate
    // spelling collapses the marker into a plain dot for display.
    let (alt_name, is_static) = match static_see_re().find(&name) {
        Some(m) => {
            let collapsed = format!("{}.{}", &name[..m.start()], &name[m.end()..]);
            (Some(collapsed), true)
        }
        None => (None, false),
    };

    ctx.definition.see.push(SeeRef {
        name,
        alt_name,
        is_static,
    });
}

fn parse_note(ctx: &mut ParseContext, block: &SectionBlock) {
    let text = combined_text(block);
    if !text.is_empty() {
        ctx.definition.notes.push(text);
    }
}

fn parse_example(ctx: &mut ParseContext, block: &SectionBlock) {
    let text = combined_text(block);
    if !text.is_empty() {
        ctx.definition.examples.push(text);
    }
}

fn parse_interface(ctx: &mut ParseContext, block: &SectionBlock) {
    let text = combined_text(block);
    if !text.is_empty() {
        ctx.definition.interfaces.push(text);
    }
}

fn parse_alias(ctx: &mut ParseContext, block: &SectionBlock) {
    let text = combined_text(block);
    if !text.is_empty() {
        ctx.definition.aliases.push(text);
    }
}

fn parse_docscope(ctx: &mut ParseContext, block: &SectionBlock) {
    ctx.definition.doc_scope = Some(if block.extra.is_empty() {
        "global".to_string()
    } else {
        block.extra.clone()
    });
}

fn parse_extends(ctx: &mut ParseContext, block: &SectionBlock) {
    if !block.extra.is_empty() {
        ctx.definition.extends = Some(block.extra.clone());
    }
}

fn parse_syntaxtype(ctx: &mut ParseContext, block: &SectionBlock) {
    if !block.extra.is_empty() {
        ctx.definition.syntax_type = Some(block.extra.clone());
    }
}

/// A section named after the target artifact itself: its header remainder is
/// a type expression, its body a description.
pub(crate) fn parse_self_entry(ctx: &mut ParseContext, block: &SectionBlock) {
    if !block.extra.is_empty() {
        let expr = parse_types(&block.extra);
        if !expr.types.is_empty() {
            push_unique_types(
                ctx.definition.types.get_or_insert_with(Vec::new),
                expr.types,
            );
        }
    }
    if !block.body.is_empty() && ctx.definition.description.is_none() {
        ctx.definition.description = Some(Description {
            body: block.body.clone(),
        });
    }
}
