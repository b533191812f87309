//! Docgraph Core - documentation model and doc-comment parsing engine
//!
//! This crate provides the core functionality:
//! - Artifact: canonical shapes for declarations, comments, and parsed definitions
//! - Position: deterministic ordering and deduplication by source offset
//! - Associate: comment classification and nearest-declaration attachment
//! - Grammar: the doc-comment section grammar and type-expression parser
//! - Page: scope assignment and page grouping
//! - Resolver: cross-reference resolution for link generation
//! - Pipeline: the per-file pipeline and the batch driver

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Documentation artifact model - declarations, comments, parsed definitions
pub mod artifact;

/// Position utilities - offset-based ordering and deduplication
pub mod position;

/// Comment classifier and associator - attaches comments to declarations
pub mod associate;

/// Doc-comment grammar engine - sections, sub-grammars, type expressions
pub mod grammar;

/// Scope assignment and page grouping
pub mod page;

/// Cross-reference resolver
pub mod resolver;

/// Per-file pipeline and batch driver
pub mod pipeline;

/// Front-end interface and registry
pub mod frontend;

/// Error taxonomy
pub mod error;

/// Convenience re-export of the artifact model
pub use artifact::{Artifact, ArtifactKind, ParsedDefinition};

/// Convenience re-export of the grammar engine entry points
pub use grammar::{parse_comment, parse_types, SectionRegistry};

/// Convenience re-export of page grouping
pub use page::{Page, PageKind, PageSet};

/// Convenience re-export of the resolver
pub use resolver::{Resolver, ResolveWarning};

/// Convenience re-export of the pipeline
pub use pipeline::{process_batch, process_file, FileDoc, FileInput};

/// Convenience re-export of the front-end interface
pub use frontend::{Frontend, FrontendRegistry, RawArtifact};

/// Convenience re-export of the error taxonomy
pub use error::{BatchError, ConfigError, PipelineError, RunError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
