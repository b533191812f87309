//! Per-file pipeline and batch driver
//!
//! One file's pipeline is synchronous and pure: front-end parse, comment
//! coalescing, dedup, sort, association, grammar parsing, kind overrides,
//! page grouping. Files share no mutable state, so the batch driver fans
//! out with a task per file and joins all results before reporting.

use rayon::prelude::*;
use serde::Serialize;

use crate::artifact::{Artifact, ArtifactData};
use crate::error::{BatchError, ConfigError, FileFailure, PipelineError, RunError};
use crate::frontend::{Frontend, FrontendRegistry, RawArtifact};
use crate::grammar::{self, SectionRegistry};
use crate::page::PageSet;
use crate::resolver::{self, ResolveWarning, Resolver};
use crate::{associate, position};

/// One file to document.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub path: String,
    /// Registry name of the front end to parse with.
    pub frontend: String,
    pub source: String,
}

/// The documentation model of one processed file.
#[derive(Debug, Serialize)]
pub struct FileDoc {
    pub path: String,
    pub artifacts: Vec<Artifact>,
    pub pages: PageSet,
    /// Advisory cross-reference warnings; never fatal.
    pub warnings: Vec<ResolveWarning>,
}

/// The merged documentation model of a whole run.
#[derive(Debug, Serialize)]
pub struct ProjectDoc {
    pub artifacts: Vec<Artifact>,
    pub pages: PageSet,
    pub warnings: Vec<ResolveWarning>,
}

/// Run the core pipeline over one file's raw artifacts.
pub fn process_raw(
    path: impl Into<String>,
    raws: Vec<RawArtifact>,
    source: &str,
    sections: &SectionRegistry,
) -> FileDoc {
    let converted: Vec<Artifact> = raws.into_iter().map(Into::into).collect();

    // The front end may deliver artifacts in any order; coalescing needs
    // position order to judge the gaps between comment lines.
    let ordered = position::sort_artifacts(&converted);

    // Raw comment lines collapse into blocks before anything else looks at
    // them; the originals are replaced by the blocks.
    let comments = associate::coalesce_comment_lines(source, &ordered);
    let mut combined: Vec<Artifact> = ordered
        .into_iter()
        .filter(|a| !a.generic_kind.is_comment())
        .collect();
    combined.extend(comments);

    let deduped = position::remove_duplicates(combined);
    let sorted = position::sort_artifacts(&deduped);
    let attached = associate::attach_comments(sorted);
    let linked = associate::link_members(attached);
    let mut enriched = grammar::parse_definitions(linked, sections);
    grammar::apply_syntax_overrides(&mut enriched);

    let pages = PageSet::build(&enriched);
    let warnings = see_warnings(&pages, &enriched);

    FileDoc {
        path: path.into(),
        artifacts: enriched,
        pages,
        warnings,
    }
}

/// Resolve every written cross-reference once, collecting the misses.
fn see_warnings(pages: &PageSet, artifacts: &[Artifact]) -> Vec<ResolveWarning> {
    let mut resolver = Resolver::new(pages, artifacts);
    for artifact in artifacts {
        let Some(definition) = artifact.definition() else {
            continue;
        };
        for see in &definition.see {
            let _ = resolver.resolve_see(see);
        }
        if let Some(description) = &definition.description {
            for tag in resolver::extract_inline_see(&description.body) {
                let _ = resolver.resolve(&tag.reference);
            }
        }
    }
    resolver.into_warnings()
}

/// Process one file end to end with an already-resolved front end.
pub fn process_file(
    input: &FileInput,
    frontend: &dyn Frontend,
    sections: &SectionRegistry,
) -> Result<FileDoc, PipelineError> {
    let raws = frontend.parse(&input.source)?;
    Ok(process_raw(input.path.clone(), raws, &input.source, sections))
}

/// Process a batch of files, one task per file.
///
/// Front-end names are validated before any file is touched; an unknown
/// name is a configuration error, not a file failure. A failing file never
/// aborts the batch: every file finishes, then all failures are raised as
/// one aggregate error.
pub fn process_batch(
    inputs: &[FileInput],
    frontends: &FrontendRegistry,
    sections: &SectionRegistry,
) -> Result<Vec<FileDoc>, RunError> {
    let jobs = inputs
        .iter()
        .map(|input| Ok((input, frontends.require(&input.frontend)?)))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let results: Vec<Result<FileDoc, FileFailure>> = jobs
        .into_par_iter()
        .map(|(input, frontend)| {
            process_file(input, frontend, sections).map_err(|error| FileFailure {
                file: input.path.clone(),
                error,
            })
        })
        .collect();

    let mut docs = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(doc) => docs.push(doc),
            Err(failure) => failures.push(failure),
        }
    }

    if failures.is_empty() {
        Ok(docs)
    } else {
        Err(BatchError { failures }.into())
    }
}

/// Merge per-file documents into one project-wide model.
///
/// Artifact tables are concatenated with member indices rebased, then pages
/// and cross-reference warnings are rebuilt over the merged table so
/// references across files resolve.
pub fn collect(docs: Vec<FileDoc>) -> ProjectDoc {
    let mut artifacts: Vec<Artifact> = Vec::new();
    for doc in docs {
        let offset = artifacts.len();
        for mut artifact in doc.artifacts {
            rebase_indices(&mut artifact, offset);
            artifacts.push(artifact);
        }
    }

    let pages = PageSet::build(&artifacts);
    let warnings = see_warnings(&pages, &artifacts);
    ProjectDoc {
        artifacts,
        pages,
        warnings,
    }
}

fn rebase_indices(artifact: &mut Artifact, offset: usize) {
    match &mut artifact.data {
        ArtifactData::Class(class) => {
            for index in class.properties.iter_mut().chain(class.methods.iter_mut()) {
                *index += offset;
            }
        }
        ArtifactData::Function(function) => {
            if let Some(parent) = &mut function.parent_class {
                parent.index += offset;
            }
        }
        ArtifactData::Property(property) => {
            if let Some(parent) = &mut property.parent_class {
                parent.index += offset;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrontendError;

    /// Front end that fails on sources containing "boom".
    struct FlakyFrontend;

    impl Frontend for FlakyFrontend {
        fn name(&self) -> &str {
            "flaky"
        }

        fn parse(&self, source: &str) -> Result<Vec<RawArtifact>, FrontendError> {
            if source.contains("boom") {
                return Err(FrontendError::Parse {
                    frontend: "flaky".to_string(),
                    message: "boom".to_string(),
                });
            }
            Ok(Vec::new())
        }
    }

    fn registry() -> FrontendRegistry {
        let mut frontends = FrontendRegistry::builtin();
        frontends.register(Box::new(FlakyFrontend));
        frontends
    }

    fn input(path: &str, frontend: &str, source: &str) -> FileInput {
        FileInput {
            path: path.to_string(),
            frontend: frontend.to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_unknown_frontend_fails_before_any_file() {
        let inputs = vec![
            input("a.js", "flaky", "boom"),
            input("b.js", "missing", ""),
        ];
        let result = process_batch(&inputs, &registry(), &SectionRegistry::builtin());
        assert!(matches!(
            result,
            Err(RunError::Config(ConfigError::UnknownFrontend(name))) if name == "missing"
        ));
    }

    #[test]
    fn test_batch_collects_all_failures() {
        let inputs = vec![
            input("a.js", "flaky", "boom one"),
            input("b.js", "flaky", "fine"),
            input("c.js", "flaky", "boom two"),
        ];
        let result = process_batch(&inputs, &registry(), &SectionRegistry::builtin());

        let Err(RunError::Batch(batch)) = result else {
            panic!("expected batch error");
        };
        let files: Vec<_> = batch.failures.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(files, ["a.js", "c.js"]);
    }

    #[test]
    fn test_batch_success_preserves_input_order() {
        let inputs = vec![
            input("z.js", "flaky", ""),
            input("a.js", "flaky", ""),
        ];
        let docs = process_batch(&inputs, &registry(), &SectionRegistry::builtin()).unwrap();
        let paths: Vec<_> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["z.js", "a.js"]);
    }

    #[test]
    fn test_collect_rebases_member_indices() {
        let sections = SectionRegistry::builtin();
        let raw = serde_json::json!([
            {"kind": "ClassDeclaration", "name": "Animal", "start": 0, "end": 100},
            {"kind": "ClassProperty", "name": "feetCount", "start": 10, "end": 12}
        ]);
        let raws: Vec<RawArtifact> = serde_json::from_value(raw).expect("valid raw artifacts");

        let first = process_raw("a.js", raws.clone(), "", &sections);
        let second = process_raw("b.js", raws, "", &sections);
        let shift = first.artifacts.len();
        let project = collect(vec![first, second]);

        let classes: Vec<usize> = project
            .artifacts
            .iter()
            .enumerate()
            .filter(|(_, a)| a.class_data().is_some())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(classes.len(), 2);

        let second_class = project.artifacts[classes[1]].class_data().unwrap();
        let member = second_class.properties[0];
        assert!(member >= shift);
        assert_eq!(
            project.artifacts[member].name.as_deref(),
            Some("feetCount")
        );
        assert_eq!(
            project.artifacts[member].parent_class().unwrap().index,
            classes[1]
        );
    }
}
