//! Language-neutral data model shared by every parser tier (`ast_parser`,
//! `regex_parsers`), the import resolver, and the module graph:
//! `SourceFile`, `ParseResult`, `ImportRef`, `ExportDecl`, and friends.
//! Every parser, regardless of tier, produces the same `ParseResult`
//! shape so that downstream consumers (the resolver, the graph) can't
//! tell which tier ran.

pub mod language;

pub use language::Language;

use ahashmap::AHashMap;
use serde::{Deserialize, Serialize};

/// What kind of module reference an [`ImportRef`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    Static,
    Dynamic,
    Glob,
    SideEffect,
    Reexport,
    ReexportAll,
    Require,
    RequireContext,
    Include,
    Part,
    Use,
    Mod,
}

/// A single named symbol pulled out of an import, with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedSymbol {
    pub name: String,
    pub alias: Option<String>,
}

/// A textual reference to another module, as extracted by a parser.
///
/// `raw_module` is the literal spelling from source (`None` for a dynamic
/// import whose argument isn't a string literal — that case is emitted
/// with `kind = Dynamic` and `raw_module = None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRef {
    pub raw_module: Option<String>,
    pub kind: ImportKind,
    pub line: u32,
    pub is_dynamic: bool,
    pub is_glob: bool,
    pub named_symbols: Option<Vec<NamedSymbol>>,
}

impl ImportRef {
    pub fn is_side_effect_only(&self) -> bool {
        matches!(self.kind, ImportKind::SideEffect) && self.named_symbols.is_none()
    }
}

/// What kind of declaration an [`ExportDecl`] exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    Function,
    Class,
    Variable,
    Type,
    Interface,
    Enum,
    Default,
    Reexport,
    ReexportAll,
    Macro,
    Namespace,
    Module,
}

/// Sentinel export name used for `export * from 'x'`.
pub const REEXPORT_ALL_SENTINEL: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDecl {
    pub name: String,
    pub kind: ExportKind,
    pub line: u32,
    pub is_default: bool,
    /// Index into `ParseResult.imports`, present for re-exports: the
    /// `ImportRef` whose module this export is re-exporting from.
    pub source_import: Option<usize>,
    pub is_type_only: bool,
    /// True when an ignore-file allow marker applies directly to this
    /// declaration.
    pub allow_unused: bool,
}

/// A top-level function, class, struct, trait, or type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub line: u32,
    pub end_line: u32,
    pub public: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DeclarationKind {
    Function,
    Class,
    Struct,
    Trait,
    Interface,
    Type,
    Enum,
    Module,
}

/// A decorator / attribute occurrence: `@Component(...)`, `#[derive(...)]`,
/// Python `@app.route(...)`, etc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    /// Raw argument text, only populated when the argument is a simple
    /// object/literal expression the parser can stringify cheaply.
    pub arguments: Option<String>,
    pub target_line: u32,
}

/// Language-specific flags a parser reports about a file, where
/// applicable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseMetadata {
    pub has_main_entry: bool,
    pub is_test_file: bool,
    pub is_vue_sfc: bool,
    pub is_django_model: bool,
    pub is_fast_api: bool,
    pub is_spring: bool,
    pub uses_wire: bool,
    pub parse_error: Option<String>,
    /// Free-form framework flags that don't warrant their own field; keyed
    /// by flag name (`"isNestController"`, `"isAngularComponent"`, ...).
    pub extra_flags: AHashMap<String, bool>,
}

/// The output of parsing a single file.
///
/// Every parser (AST tier or regex tier) returns this same shape. A
/// parser must never panic/throw on malformed input: on failure it
/// returns a `ParseResult` with `metadata.parse_error` set and whatever
/// partial data it managed to extract, rather than propagating an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub imports: Vec<ImportRef>,
    pub exports: Vec<ExportDecl>,
    pub declarations: Vec<Declaration>,
    pub annotations: Vec<Annotation>,
    pub metadata: ParseMetadata,
}

impl ParseResult {
    pub fn with_parse_error(reason: impl Into<String>) -> Self {
        let mut result = Self::default();
        result.metadata.parse_error = Some(reason.into());
        result
    }
}

/// A walked, parsed source file. `parse_result` is set once at parse time
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub language: Language,
    pub bytes: u64,
    pub line_count: u32,
    pub parse_result: ParseResult,
}
