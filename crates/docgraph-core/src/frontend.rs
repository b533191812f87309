//! Front-end interface and registry
//!
//! A front end turns one file's source text into raw artifacts: positions
//! plus coarse structural facts. It owns the offset semantics for its files;
//! the core only ever compares offsets within one file. Real language front
//! ends live outside this crate; the built-in [`JsonFrontend`] accepts
//! pre-extracted raw artifacts as JSON, which is also what the tests use.

use serde::Deserialize;

use crate::artifact::{
    Access, Artifact, ArtifactData, ArtifactKind, ClassData, FunctionArgument, FunctionData,
    PropertyData, ReturnType,
};
use crate::error::{ConfigError, FrontendError};

/// One raw artifact as reported by a front end.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawArtifact {
    pub kind: String,
    pub start: usize,
    pub end: usize,
    pub name: Option<String>,
    /// Raw comment text, for comment kinds.
    pub value: Option<String>,
    pub extends_from_class: Option<String>,
    pub is_constructor: bool,
    #[serde(rename = "static")]
    pub is_static: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    #[serde(rename = "generator")]
    pub is_generator: bool,
    pub access: Access,
    pub arguments: Vec<FunctionArgument>,
    #[serde(rename = "return")]
    pub return_type: Option<ReturnType>,
    pub types: Vec<String>,
    pub assignment: Option<String>,
}

impl From<RawArtifact> for Artifact {
    fn from(raw: RawArtifact) -> Self {
        let data = match ArtifactKind::normalize(&raw.kind) {
            ArtifactKind::ClassDeclaration => ArtifactData::Class(ClassData {
                extends_from_class: raw.extends_from_class,
                properties: Vec::new(),
                methods: Vec::new(),
            }),
            ArtifactKind::FunctionDeclaration => ArtifactData::Function(FunctionData {
                is_constructor: raw.is_constructor,
                is_static: raw.is_static,
                is_async: raw.is_async,
                is_generator: raw.is_generator,
                access: raw.access,
                parent_class: None,
                arguments: raw.arguments,
                return_type: raw.return_type,
            }),
            ArtifactKind::PropertyDeclaration => ArtifactData::Property(PropertyData {
                is_static: raw.is_static,
                access: raw.access,
                types: raw.types,
                assignment: raw.assignment,
                parent_class: None,
            }),
            ArtifactKind::DocComment => {
                let mut artifact =
                    Artifact::doc_comment(raw.value.unwrap_or_default(), raw.start, raw.end);
                artifact.kind = raw.kind;
                return artifact;
            }
            _ => ArtifactData::None,
        };

        let mut artifact = Artifact::new(raw.kind, raw.start, raw.end).with_data(data);
        artifact.name = raw.name;
        artifact
    }
}

/// A language front end.
pub trait Frontend: Send + Sync {
    /// Registry name, matched against `FileInput::frontend`.
    fn name(&self) -> &str;

    /// Extract raw artifacts and raw comment ranges from one file's source.
    fn parse(&self, source: &str) -> Result<Vec<RawArtifact>, FrontendError>;
}

/// Front end accepting pre-extracted raw artifacts as a JSON array.
#[derive(Debug, Default)]
pub struct JsonFrontend;

impl Frontend for JsonFrontend {
    fn name(&self) -> &str {
        "json"
    }

    fn parse(&self, source: &str) -> Result<Vec<RawArtifact>, FrontendError> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Explicit front-end registry.
///
/// Populated at startup and read-only during processing; unknown names are
/// a configuration error, not a data error.
#[derive(Default)]
pub struct FrontendRegistry {
    frontends: Vec<Box<dyn Frontend>>,
}

impl FrontendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in JSON front end.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(JsonFrontend));
        registry
    }

    pub fn register(&mut self, frontend: Box<dyn Frontend>) {
        self.frontends.push(frontend);
    }

    /// Resolve a front end by name; most recent registration wins.
    pub fn lookup(&self, name: &str) -> Option<&dyn Frontend> {
        self.frontends
            .iter()
            .rev()
            .find(|f| f.name() == name)
            .map(AsRef::as_ref)
    }

    pub fn require(&self, name: &str) -> Result<&dyn Frontend, ConfigError> {
        self.lookup(name)
            .ok_or_else(|| ConfigError::UnknownFrontend(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_artifact_conversion() {
        let json = r#"[
            {"kind": "ClassDeclaration", "name": "Animal", "start": 0, "end": 100,
             "extendsFromClass": "Creature"},
            {"kind": "ClassMethod", "name": "walk", "start": 20, "end": 40,
             "static": true, "async": true,
             "arguments": [{"name": "speed", "types": ["number"], "optional": true}],
             "return": {"types": ["void"]}},
            {"kind": "CommentLine", "start": 1, "end": 9, "value": "/ feetCount: number"}
        ]"#;

        let raws = JsonFrontend.parse(json).unwrap();
        let artifacts: Vec<Artifact> = raws.into_iter().map(Into::into).collect();

        assert_eq!(
            artifacts[0].class_data().unwrap().extends_from_class.as_deref(),
            Some("Creature")
        );

        let method = artifacts[1].function_data().unwrap();
        assert!(method.is_static);
        assert!(method.is_async);
        assert_eq!(method.arguments[0].name, "speed");
        assert_eq!(
            artifacts[1].generic_kind,
            ArtifactKind::FunctionDeclaration
        );

        assert_eq!(artifacts[2].generic_kind, ArtifactKind::DocComment);
        assert_eq!(artifacts[2].kind, "CommentLine");
        assert_eq!(
            artifacts[2].comment_data().unwrap().value,
            "/ feetCount: number"
        );
    }

    #[test]
    fn test_malformed_json_is_frontend_error() {
        let result = JsonFrontend.parse("not json");
        assert!(matches!(result, Err(FrontendError::Input(_))));
    }

    #[test]
    fn test_registry_unknown_name() {
        let registry = FrontendRegistry::builtin();
        assert!(registry.lookup("json").is_some());
        assert!(matches!(
            registry.require("cobol"),
            Err(ConfigError::UnknownFrontend(name)) if name == "cobol"
        ));
    }
}
