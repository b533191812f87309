//! Types for the documentation artifact model
//!
//! An artifact is one parsed unit of source structure or documentation: a
//! declaration, a comment, or a derived sub-entity such as a function
//! argument. Artifacts are created once per file-processing pass, mutated in
//! place while comments and children are attached, and handed to the
//! renderer immutable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Coarse classification of an artifact, used for matching.
///
/// Front ends report fine-grained kinds as strings (e.g. both
/// `FunctionDeclaration` and `FunctionExpression`); those normalize to the
/// same generic kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    ClassDeclaration,
    FunctionDeclaration,
    PropertyDeclaration,
    FunctionArgument,
    ReturnType,
    Type,
    DocComment,
    GlobalDocComment,
    Page,
    Other,
}

impl ArtifactKind {
    /// Normalize a front-end kind tag to its generic classification.
    pub fn normalize(kind: &str) -> Self {
        match kind {
            "ClassDeclaration" | "DeclareClass" => ArtifactKind::ClassDeclaration,
            "FunctionDeclaration"
            | "FunctionExpression"
            | "ArrowFunctionExpression"
            | "ClassMethod"
            | "ObjectMethod"
            | "DeclareFunction" => ArtifactKind::FunctionDeclaration,
            "PropertyDeclaration" | "ClassProperty" => ArtifactKind::PropertyDeclaration,
            "FunctionArgument" | "Identifier" => ArtifactKind::FunctionArgument,
            "ReturnType" => ArtifactKind::ReturnType,
            "Type" => ArtifactKind::Type,
            "DocComment" | "CommentLine" | "CommentBlock" => ArtifactKind::DocComment,
            "GlobalDocComment" => ArtifactKind::GlobalDocComment,
            "Page" => ArtifactKind::Page,
            _ => ArtifactKind::Other,
        }
    }

    /// True for the kinds that can carry a doc comment attachment.
    pub fn is_comment(self) -> bool {
        matches!(self, ArtifactKind::DocComment | ArtifactKind::GlobalDocComment)
    }
}

/// Member access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

/// Lookup-only reference from a class member to its owning class.
///
/// Holds an index into the file's artifact table plus the cached class name;
/// never an owning reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentClass {
    pub index: usize,
    pub name: String,
}

/// A declared function parameter as reported by the front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionArgument {
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub assignment: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub description: String,
}

/// Structural return-type facts for a function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReturnType {
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// Class-specific structural data.
///
/// `properties` and `methods` are owned collections of indices into the
/// file's artifact table, populated post-hoc by member linking.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassData {
    pub extends_from_class: Option<String>,
    pub properties: Vec<usize>,
    pub methods: Vec<usize>,
}

/// Function-specific structural data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FunctionData {
    pub is_constructor: bool,
    pub is_static: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub access: Access,
    pub parent_class: Option<ParentClass>,
    pub arguments: Vec<FunctionArgument>,
    pub return_type: Option<ReturnType>,
}

/// Property-specific structural data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PropertyData {
    pub is_static: bool,
    pub access: Access,
    pub types: Vec<String>,
    pub assignment: Option<String>,
    pub parent_class: Option<ParentClass>,
}

/// Raw comment payload, still containing sentinel markers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentData {
    pub value: String,
    pub global: bool,
}

/// Variant-specific artifact data.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactData {
    Class(ClassData),
    Function(FunctionData),
    Property(PropertyData),
    Comment(CommentData),
    #[default]
    None,
}

/// A doc comment attached to a declaration.
///
/// Owned exclusively by the artifact it documents; `definition` is filled in
/// by the grammar engine after association.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentAttachment {
    pub value: String,
    pub definition: ParsedDefinition,
}

/// One parsed unit of source structure or documentation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Fine-grained kind tag as reported by the front end.
    pub kind: String,
    /// Coarse classification used for matching.
    pub generic_kind: ArtifactKind,
    /// Half-open offset range into the source (front end owns the offset
    /// semantics; offsets are only ever compared within one file).
    pub start: usize,
    pub end: usize,
    /// Declaration name; comments have none.
    pub name: Option<String>,
    pub data: ArtifactData,
    /// The single applicable doc comment, set during association.
    pub comment: Option<CommentAttachment>,
}

impl Artifact {
    /// Create an artifact with no variant-specific data.
    pub fn new(kind: impl Into<String>, start: usize, end: usize) -> Self {
        let kind = kind.into();
        let generic_kind = ArtifactKind::normalize(&kind);
        Self {
            kind,
            generic_kind,
            start,
            end,
            name: None,
            data: ArtifactData::None,
            comment: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_data(mut self, data: ArtifactData) -> Self {
        self.data = data;
        self
    }

    /// Create a loose doc-comment artifact from raw comment text.
    pub fn doc_comment(value: impl Into<String>, start: usize, end: usize) -> Self {
        Artifact::new("DocComment", start, end).with_data(ArtifactData::Comment(CommentData {
            value: value.into(),
            global: false,
        }))
    }

    /// Identity key used by duplicate removal.
    pub fn identity_key(&self) -> String {
        format!("{}:{}:{}", self.kind, self.start, self.end)
    }

    /// True when `other` lies strictly inside this artifact's range.
    pub fn encloses(&self, other: &Artifact) -> bool {
        self.start < other.start && other.end < self.end
    }

    pub fn class_data(&self) -> Option<&ClassData> {
        match &self.data {
            ArtifactData::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn class_data_mut(&mut self) -> Option<&mut ClassData> {
        match &mut self.data {
            ArtifactData::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn function_data(&self) -> Option<&FunctionData> {
        match &self.data {
            ArtifactData::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn property_data(&self) -> Option<&PropertyData> {
        match &self.data {
            ArtifactData::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn comment_data(&self) -> Option<&CommentData> {
        match &self.data {
            ArtifactData::Comment(c) => Some(c),
            _ => None,
        }
    }

    /// Structural arguments, empty for non-functions.
    pub fn arguments(&self) -> &[FunctionArgument] {
        self.function_data().map_or(&[], |f| f.arguments.as_slice())
    }

    /// Structural return facts, if the front end reported any.
    pub fn return_info(&self) -> Option<&ReturnType> {
        self.function_data().and_then(|f| f.return_type.as_ref())
    }

    /// Structural type list, empty for non-properties.
    pub fn types(&self) -> &[String] {
        self.property_data().map_or(&[], |p| p.types.as_slice())
    }

    /// Owning-class reference for class members.
    pub fn parent_class(&self) -> Option<&ParentClass> {
        match &self.data {
            ArtifactData::Function(f) => f.parent_class.as_ref(),
            ArtifactData::Property(p) => p.parent_class.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn set_parent_class(&mut self, parent: ParentClass) {
        match &mut self.data {
            ArtifactData::Function(f) => f.parent_class = Some(parent),
            ArtifactData::Property(p) => p.parent_class = Some(parent),
            _ => {}
        }
    }

    /// The parsed definition of the attached comment, if any.
    pub fn definition(&self) -> Option<&ParsedDefinition> {
        self.comment.as_ref().map(|c| &c.definition)
    }
}

/// Body of a `description` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Description {
    pub body: String,
}

/// One documented argument entry in a parsed definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgDef {
    pub name: String,
    pub description: String,
    pub optional: bool,
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<String>,
}

/// One documented property entry in a parsed definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropDef {
    pub name: String,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub description: String,
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<String>,
}

/// Parsed `return` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReturnDef {
    pub types: Vec<String>,
    pub description: String,
}

/// An author-written cross-reference produced by the `see` section parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeeRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_name: Option<String>,
    #[serde(rename = "static")]
    pub is_static: bool,
}

/// An accumulated raw section as lexed from comment text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionBlock {
    pub name: String,
    pub extra: String,
    pub optional: bool,
    pub body: String,
}

/// The structured result of parsing one doc comment.
///
/// Every populated field was either parsed from an explicit section or
/// synthesized by that section's default handler from structural data on the
/// target artifact; absent sections stay `None`/empty rather than being
/// null-padded.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<ArgDef>>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_def: Option<ReturnDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<PropDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub see: Vec<SeeRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax_type: Option<String>,
    pub global: bool,
    /// Unrecognized sections, preserved by lowercase name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub unknown: BTreeMap<String, Vec<SectionBlock>>,
}

impl ParsedDefinition {
    /// Merge scalar defaults from the file-level global comment underneath
    /// this definition. Artifact-specific values always win.
    pub fn merge_global_defaults(&mut self, global: &ParsedDefinition) {
        if self.doc_scope.is_none() {
            self.doc_scope.clone_from(&global.doc_scope);
        }
    }
}
