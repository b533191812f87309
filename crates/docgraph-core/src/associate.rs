//! Comment classification and association
//!
//! Separates doc comments from declarations, attaches the nearest qualifying
//! preceding comment to each declaration, lifts out the single file-level
//! global comment, and links class members to their owning class. All of this
//! works purely from source offsets; no AST shape is assumed.

use crate::artifact::{
    Artifact, ArtifactData, ArtifactKind, CommentAttachment, CommentData, ParentClass,
};

/// A comment qualifies as documentation only if every line, stripped of
/// leading whitespace, begins with the marker (the triple-slash convention
/// leaves a leading `/` on each line once the front end strips `//`).
pub fn is_meaningful(value: &str) -> bool {
    let mut lines = value.lines().filter(|l| !l.trim().is_empty());
    let mut any = false;
    for line in lines.by_ref() {
        any = true;
        if !line.trim_start().starts_with('/') {
            return false;
        }
    }
    any
}

/// True when the comment's first content after the marker begins with the
/// bang marker, making it the file-level global comment.
pub fn is_global(value: &str) -> bool {
    value.trim_start().starts_with("/!")
}

/// Merge raw single-line comment artifacts into doc-comment blocks.
///
/// Consecutive comment lines separated only by whitespace in the source form
/// one block; any non-whitespace gap closes the current block. The input is
/// expected in position order.
pub fn coalesce_comment_lines(source: &str, lines: &[Artifact]) -> Vec<Artifact> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut block_start = 0;
    let mut block_end = 0;

    for line in lines {
        let Some(data) = line.comment_data() else {
            continue;
        };

        if !current.is_empty() {
            let gap_is_code = source
                .get(block_end..line.start)
                .map_or(true, |gap| !gap.trim().is_empty());
            if gap_is_code {
                blocks.push(Artifact::doc_comment(current.join("\n"), block_start, block_end));
                current.clear();
            }
        }

        if current.is_empty() {
            block_start = line.start;
        }
        current.push(&data.value);
        block_end = line.end;
    }

    if !current.is_empty() {
        blocks.push(Artifact::doc_comment(current.join("\n"), block_start, block_end));
    }

    blocks
}

/// Attach each qualifying comment to the immediately following declaration.
///
/// Input is the deduplicated, sorted artifact sequence with comments
/// interleaved by position. The steps, in order:
///
/// 1. Non-meaningful comments are discarded.
/// 2. Meaningful comments nested inside a function body are discarded.
/// 3. The first bang-marked comment is lifted out as a synthetic
///    `GlobalDocComment` at position 0 of the output.
/// 4. Every remaining declaration whose immediately preceding element is a
///    comment takes ownership of it; orphaned comments are dropped.
///
/// Never fails; given the same input ordering the comment-to-artifact mapping
/// is identical on every run.
pub fn attach_comments(artifacts: Vec<Artifact>) -> Vec<Artifact> {
    let function_ranges: Vec<(usize, usize)> = artifacts
        .iter()
        .filter(|a| a.generic_kind == ArtifactKind::FunctionDeclaration)
        .map(|a| (a.start, a.end))
        .collect();

    let mut global: Option<Artifact> = None;
    let mut kept = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        if artifact.generic_kind != ArtifactKind::DocComment {
            kept.push(artifact);
            continue;
        }

        let Some(data) = artifact.comment_data() else {
            continue;
        };

        if !is_meaningful(&data.value) {
            continue;
        }

        // Inline comments inside a function body are never documentation.
        let inside_function = function_ranges
            .iter()
            .any(|&(start, end)| start < artifact.start && artifact.end < end);
        if inside_function {
            continue;
        }

        if global.is_none() && is_global(&data.value) {
            global = Some(make_global(&artifact, data.value.clone()));
            continue;
        }

        kept.push(artifact);
    }

    let mut out = Vec::with_capacity(kept.len());
    let mut pending: Option<String> = None;

    for mut artifact in kept {
        if artifact.generic_kind == ArtifactKind::DocComment {
            // A newer comment supersedes an unclaimed one.
            pending = artifact.comment_data().map(|d| d.value.clone());
            continue;
        }

        if let Some(value) = pending.take() {
            artifact.comment = Some(CommentAttachment {
                value,
                definition: Default::default(),
            });
        }
        out.push(artifact);
    }

    if let Some(global) = global {
        out.insert(0, global);
    }

    out
}

fn make_global(comment: &Artifact, value: String) -> Artifact {
    let mut global = Artifact::new("GlobalDocComment", comment.start, comment.end).with_data(
        ArtifactData::Comment(CommentData {
            value: value.clone(),
            global: true,
        }),
    );
    global.comment = Some(CommentAttachment {
        value,
        definition: Default::default(),
    });
    global
}

/// Populate each class's `properties`/`methods` collections and set the
/// lookup-only `parent_class` back-reference on members.
///
/// A function or property nested inside a class range becomes a member of
/// the innermost such class. Indices refer to the sequence returned here, so
/// this must run after any pass that reorders or removes artifacts.
pub fn link_members(mut artifacts: Vec<Artifact>) -> Vec<Artifact> {
    let class_indices: Vec<usize> = artifacts
        .iter()
        .enumerate()
        .filter(|(_, a)| a.generic_kind == ArtifactKind::ClassDeclaration)
        .map(|(i, _)| i)
        .collect();

    for member in 0..artifacts.len() {
        let member_kind = artifacts[member].generic_kind;
        if !matches!(
            member_kind,
            ArtifactKind::FunctionDeclaration | ArtifactKind::PropertyDeclaration
        ) {
            continue;
        }

        let mut owner: Option<usize> = None;
        for &class in &class_indices {
            if class != member && artifacts[class].encloses(&artifacts[member]) {
                let closer = owner.map_or(true, |o| artifacts[class].start > artifacts[o].start);
                if closer {
                    owner = Some(class);
                }
            }
        }

        let Some(class) = owner else {
            continue;
        };

        let parent = ParentClass {
            index: class,
            name: artifacts[class].name.clone().unwrap_or_default(),
        };
        artifacts[member].set_parent_class(parent);

        if let Some(class_data) = artifacts[class].class_data_mut() {
            match member_kind {
                ArtifactKind::FunctionDeclaration => class_data.methods.push(member),
                ArtifactKind::PropertyDeclaration => class_data.properties.push(member),
                _ => {}
            }
        }
    }

    artifacts
}
