//! Per-language regex grammars. Each [`LanguageRules`] is a small data table —
//! import patterns, top-level declaration patterns, a decorator/attribute
//! pattern, main-entry and test-framework signals, and framework markers —
//! compiled once (`std::sync::OnceLock`) and reused across every file of
//! that language.
//!
//! This is the regex-tier analogue of the AST tier's `ExportsVisitor`: same
//! contract (never panics, reports partial data, classifies by the closed
//! `ImportKind`/`ExportKind`/`DeclarationKind` enums from `source_model`),
//! different mechanism. Patterns are deliberately approximate, since a
//! regex grammar cannot fully track a language's scoping rules: this
//! tier is heuristic-but-principled, not a real parser.

use std::sync::OnceLock;

use language_router::Language;
use regex::Regex;
use source_model::{DeclarationKind, ExportKind, ImportKind};

/// How a language's source expresses nesting, which determines what counts
/// as a "top-level" declaration eligible for export/dead-function reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthStyle {
    /// Brace-delimited blocks; top-level means brace depth zero before the
    /// line starts.
    Brace,
    /// Indentation-significant (Python, Haskell, F#, Nim); top-level means
    /// zero leading whitespace.
    Indent,
    /// Neither braces nor significant indentation reliably bound a "nested"
    /// declaration for these grammars (shell scripts, Fortran fixed-form,
    /// Lisp-family top-level forms, …); every match counts as top-level.
    Flat,
}

/// Decides whether a matched declaration counts as public/exported.
/// Takes the declared name and, when the pattern captured one, the raw
/// visibility marker text (`pub`, `public`, `private`, …).
pub type VisibilityFn = fn(name: &str, marker: Option<&str>) -> bool;

pub fn always_public(_name: &str, _marker: Option<&str>) -> bool {
    true
}

/// Python/Ruby convention: a single leading underscore marks "private".
pub fn underscore_is_private(name: &str, _marker: Option<&str>) -> bool {
    !name.starts_with('_')
}

/// Go convention: the exported/unexported distinction is the identifier's
/// capitalization, full stop.
pub fn capitalized_is_public(name: &str, _marker: Option<&str>) -> bool {
    name.chars().next().map_or(false, |c| c.is_uppercase())
}

/// Rust: an item is public only if it carries an explicit `pub` (or
/// `pub(...)`) marker.
pub fn marker_is_pub(_name: &str, marker: Option<&str>) -> bool {
    matches!(marker, Some(m) if m == "pub" || m.starts_with("pub("))
}

/// Java/C#/PHP/Dart/C++ convention: explicit `public` marker required; the
/// absence of any marker (package-private/internal) is not public.
pub fn marker_contains_public(_name: &str, marker: Option<&str>) -> bool {
    matches!(marker, Some(m) if m.contains("public"))
}

/// Kotlin/Swift/Scala convention: public unless explicitly narrowed.
pub fn marker_absent_means_public(_name: &str, marker: Option<&str>) -> bool {
    !matches!(marker, Some(m) if m.contains("private") || m.contains("internal") || m.contains("protected") || m.contains("fileprivate"))
}

/// A single `ParseMetadata` framework flag a language's rules can set when a
/// marker substring is found in the file.
#[derive(Debug, Clone, Copy)]
pub enum FrameworkFlag {
    Django,
    FastApi,
    Spring,
    Wire,
    Extra(&'static str),
}

impl FrameworkFlag {
    pub fn apply(self, metadata: &mut source_model::ParseMetadata) {
        match self {
            FrameworkFlag::Django => metadata.is_django_model = true,
            FrameworkFlag::FastApi => metadata.is_fast_api = true,
            FrameworkFlag::Spring => metadata.is_spring = true,
            FrameworkFlag::Wire => metadata.uses_wire = true,
            FrameworkFlag::Extra(name) => {
                metadata.extra_flags.insert(name.to_string(), true);
            }
        }
    }
}

pub struct ImportRule {
    pub regex: Regex,
    pub kind: ImportKind,
    /// Whether the regex captures a `names` group of comma-separated
    /// symbols (optionally `orig as alias`), populating `named_symbols`.
    pub names_group: bool,
}

pub struct DeclRule {
    pub regex: Regex,
    pub kind: DeclarationKind,
    pub visibility: VisibilityFn,
}

/// A re-export pattern (currently only Rust's `pub use path::Name;`):
/// matching produces both an `ImportRef` (the `use` target) and an
/// `ExportDecl` (the re-exported name), linked via `source_import`.
pub struct ReexportRule {
    pub regex: Regex,
}

pub struct LanguageRules {
    pub depth_style: DepthStyle,
    pub imports: Vec<ImportRule>,
    pub reexports: Vec<ReexportRule>,
    pub declarations: Vec<DeclRule>,
    pub annotation: Option<Regex>,
    pub main_markers: Vec<&'static str>,
    pub test_signals: Vec<&'static str>,
    pub test_filename_markers: Vec<&'static str>,
    pub framework_markers: Vec<(&'static str, FrameworkFlag)>,
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid regex_parsers pattern {pattern:?}: {e}"))
}

fn import_rule(pattern: &str, kind: ImportKind) -> ImportRule {
    ImportRule {
        regex: re(pattern),
        kind,
        names_group: false,
    }
}

fn import_rule_names(pattern: &str, kind: ImportKind) -> ImportRule {
    ImportRule {
        regex: re(pattern),
        kind,
        names_group: true,
    }
}

fn decl_rule(pattern: &str, kind: DeclarationKind, visibility: VisibilityFn) -> DeclRule {
    DeclRule {
        regex: re(pattern),
        kind,
        visibility,
    }
}

macro_rules! rules {
    (
        depth: $depth:expr,
        imports: [$($imp:expr),* $(,)?],
        reexports: [$($reexp:expr),* $(,)?],
        decls: [$($decl:expr),* $(,)?],
        annotation: $ann:expr,
        main: [$($main:expr),* $(,)?],
        test_signals: [$($ts:expr),* $(,)?],
        test_files: [$($tf:expr),* $(,)?],
        frameworks: [$($fw:expr),* $(,)?] $(,)?
    ) => {
        LanguageRules {
            depth_style: $depth,
            imports: vec![$($imp),*],
            reexports: vec![$($reexp),*],
            declarations: vec![$($decl),*],
            annotation: $ann,
            main_markers: vec![$($main),*],
            test_signals: vec![$($ts),*],
            test_filename_markers: vec![$($tf),*],
            framework_markers: vec![$($fw),*],
        }
    };
}

fn python_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Indent,
        imports: [
            import_rule_names(r#"^\s*from\s+(?P<module>[\w.]+)\s+import\s+(?P<names>.+)$"#, ImportKind::Static),
            import_rule(r#"^\s*import\s+(?P<module>[\w.]+(?:\s*,\s*[\w.]+)*)"#, ImportKind::Static),
            import_rule(r#"importlib\.import_module\(\s*['"](?P<module>[^'"]*)['"]"#, ImportKind::Dynamic),
            import_rule(r#"importlib\.import_module\(\s*[^'"\s)]"#, ImportKind::Dynamic),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*def\s+(?P<name>\w+)\s*\("#, DeclarationKind::Function, underscore_is_private),
            decl_rule(r#"^\s*async\s+def\s+(?P<name>\w+)\s*\("#, DeclarationKind::Function, underscore_is_private),
            decl_rule(r#"^\s*class\s+(?P<name>\w+)"#, DeclarationKind::Class, underscore_is_private),
        ],
        annotation: Some(re(r#"^\s*@(?P<name>[\w.]+)(?:\((?P<args>.*)\))?\s*$"#)),
        main: [r#"if __name__ == "__main__""#, r#"if __name__ == '__main__'"#],
        test_signals: ["import pytest", "import unittest", "from pytest", "from unittest"],
        test_files: ["test_", "_test.py", "/tests/", "conftest.py"],
        frameworks: [
            ("django.db.models.Model", FrameworkFlag::Django),
            ("models.Model", FrameworkFlag::Django),
            ("fastapi.FastAPI", FrameworkFlag::FastApi),
            ("from fastapi import", FrameworkFlag::FastApi),
            ("APIRouter(", FrameworkFlag::FastApi),
        ],
    }
}

fn go_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*\w*\s*"(?P<module>[^"]+)"\s*$"#, ImportKind::Static),
            import_rule(r#"^\s*import\s+"(?P<module>[^"]+)""#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^func\s+(?:\([^)]*\)\s*)?(?P<name>\w+)\s*\("#, DeclarationKind::Function, capitalized_is_public),
            decl_rule(r#"^type\s+(?P<name>\w+)\s+struct\b"#, DeclarationKind::Struct, capitalized_is_public),
            decl_rule(r#"^type\s+(?P<name>\w+)\s+interface\b"#, DeclarationKind::Interface, capitalized_is_public),
            decl_rule(r#"^type\s+(?P<name>\w+)\s+"#, DeclarationKind::Type, capitalized_is_public),
        ],
        annotation: None,
        main: ["func main("],
        test_signals: [r#""testing""#],
        test_files: ["_test.go"],
        frameworks: [
            ("wire.Bind", FrameworkFlag::Wire),
            ("wire.NewSet", FrameworkFlag::Wire),
            ("google/wire", FrameworkFlag::Wire),
        ],
    }
}

fn rust_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule_names(r#"^\s*use\s+(?P<module>[\w:]+)::\{(?P<names>[^}]*)\}\s*;"#, ImportKind::Use),
            import_rule(r#"^\s*use\s+(?P<module>[\w:]+)\s*;"#, ImportKind::Use),
            import_rule(r#"^\s*mod\s+(?P<module>\w+)\s*;"#, ImportKind::Mod),
        ],
        reexports: [
            ReexportRule { regex: re(r#"^\s*pub\s+use\s+(?P<module>[\w:]+)::(?P<name>\w+|\*)\s*;"#) },
        ],
        decls: [
            decl_rule(r#"^\s*(?P<vis>pub(?:\([^)]*\))?)?\s*fn\s+(?P<name>\w+)"#, DeclarationKind::Function, marker_is_pub),
            decl_rule(r#"^\s*(?P<vis>pub(?:\([^)]*\))?)?\s*struct\s+(?P<name>\w+)"#, DeclarationKind::Struct, marker_is_pub),
            decl_rule(r#"^\s*(?P<vis>pub(?:\([^)]*\))?)?\s*enum\s+(?P<name>\w+)"#, DeclarationKind::Enum, marker_is_pub),
            decl_rule(r#"^\s*(?P<vis>pub(?:\([^)]*\))?)?\s*trait\s+(?P<name>\w+)"#, DeclarationKind::Trait, marker_is_pub),
            decl_rule(r#"^\s*(?P<vis>pub(?:\([^)]*\))?)?\s*type\s+(?P<name>\w+)"#, DeclarationKind::Type, marker_is_pub),
            decl_rule(r#"^\s*(?P<vis>pub(?:\([^)]*\))?)?\s*mod\s+(?P<name>\w+)\s*\{"#, DeclarationKind::Module, marker_is_pub),
        ],
        annotation: Some(re(r#"^\s*#!?\[(?P<name>[\w:]+)(?:\((?P<args>.*)\))?\]\s*$"#)),
        main: ["fn main("],
        test_signals: ["#[test]", "#[cfg(test)]"],
        test_files: ["/tests/", "_test.rs"],
        frameworks: [],
    }
}

fn c_like_import(include_keyword: &str) -> String {
    format!(r#"^\s*{include_keyword}\s*[<"](?P<module>[^">]+)[">]"#)
}

fn java_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*import\s+(?:static\s+)?(?P<module>[\w.]+(?:\.\*)?)\s*;"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>[\w\s]*?)\bclass\s+(?P<name>\w+)"#, DeclarationKind::Class, marker_contains_public),
            decl_rule(r#"^\s*(?P<vis>[\w\s]*?)\binterface\s+(?P<name>\w+)"#, DeclarationKind::Interface, marker_contains_public),
            decl_rule(r#"^\s*(?P<vis>[\w\s]*?)\benum\s+(?P<name>\w+)"#, DeclarationKind::Enum, marker_contains_public),
        ],
        annotation: Some(re(r#"^\s*@(?P<name>[\w.]+)(?:\((?P<args>.*)\))?\s*$"#)),
        main: ["static void main(", "public static void main"],
        test_signals: ["org.junit", "import junit"],
        test_files: ["Test.java", "/test/"],
        frameworks: [
            ("@SpringBootApplication", FrameworkFlag::Spring),
            ("@RestController", FrameworkFlag::Spring),
            ("@Service", FrameworkFlag::Spring),
            ("@Component", FrameworkFlag::Spring),
            ("org.springframework", FrameworkFlag::Spring),
        ],
    }
}

fn kotlin_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*import\s+(?P<module>[\w.]+(?:\.\*)?)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>private|internal|protected)?\s*fun\s+(?P<name>\w+)\s*\("#, DeclarationKind::Function, marker_absent_means_public),
            decl_rule(r#"^\s*(?P<vis>private|internal|protected)?\s*(?:data\s+|sealed\s+|open\s+|abstract\s+)*class\s+(?P<name>\w+)"#, DeclarationKind::Class, marker_absent_means_public),
            decl_rule(r#"^\s*(?P<vis>private|internal|protected)?\s*object\s+(?P<name>\w+)"#, DeclarationKind::Class, marker_absent_means_public),
            decl_rule(r#"^\s*(?P<vis>private|internal|protected)?\s*interface\s+(?P<name>\w+)"#, DeclarationKind::Interface, marker_absent_means_public),
        ],
        annotation: Some(re(r#"^\s*@(?P<name>[\w.]+)(?:\((?P<args>.*)\))?\s*$"#)),
        main: ["fun main("],
        test_signals: ["org.junit", "kotlin.test"],
        test_files: ["Test.kt", "/test/"],
        frameworks: [
            ("@SpringBootApplication", FrameworkFlag::Spring),
            ("@RestController", FrameworkFlag::Spring),
            ("org.springframework", FrameworkFlag::Spring),
        ],
    }
}

fn csharp_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*using\s+(?P<module>[\w.]+)\s*;"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>[\w\s]*?)\bclass\s+(?P<name>\w+)"#, DeclarationKind::Class, marker_contains_public),
            decl_rule(r#"^\s*(?P<vis>[\w\s]*?)\binterface\s+(?P<name>\w+)"#, DeclarationKind::Interface, marker_contains_public),
            decl_rule(r#"^\s*(?P<vis>[\w\s]*?)\benum\s+(?P<name>\w+)"#, DeclarationKind::Enum, marker_contains_public),
        ],
        annotation: Some(re(r#"^\s*\[(?P<name>\w+)(?:\((?P<args>.*)\))?\]\s*$"#)),
        main: ["static void Main(", "static int Main("],
        test_signals: ["[TestMethod]", "[Fact]", "NUnit.Framework"],
        test_files: ["Tests.cs", "Test.cs"],
        frameworks: [],
    }
}

fn php_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*use\s+(?P<module>[\w\\]+)\s*;"#, ImportKind::Use),
            import_rule(r#"^\s*require(?:_once)?\s*\(?['"](?P<module>[^'"]+)['"]"#, ImportKind::Static),
            import_rule(r#"^\s*include(?:_once)?\s*\(?['"](?P<module>[^'"]+)['"]"#, ImportKind::Include),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>public|private|protected)?\s*function\s+(?P<name>\w+)\s*\("#, DeclarationKind::Function, marker_contains_public),
            decl_rule(r#"^\s*(?P<vis>abstract\s+)?class\s+(?P<name>\w+)"#, DeclarationKind::Class, always_public),
        ],
        annotation: None,
        main: [],
        test_signals: ["PHPUnit\\Framework", "use PHPUnit"],
        test_files: ["Test.php"],
        frameworks: [],
    }
}

fn ruby_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Indent,
        imports: [
            import_rule(r#"^\s*require(?:_relative)?\s+['"](?P<module>[^'"]+)['"]"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*def\s+(?:self\.)?(?P<name>[\w?!=]+)"#, DeclarationKind::Function, underscore_is_private),
            decl_rule(r#"^\s*class\s+(?P<name>\w+)"#, DeclarationKind::Class, underscore_is_private),
            decl_rule(r#"^\s*module\s+(?P<name>\w+)"#, DeclarationKind::Module, underscore_is_private),
        ],
        annotation: None,
        main: ["if __FILE__ == $0"],
        test_signals: ["require 'rspec'", "require \"rspec\"", "require 'minitest'"],
        test_files: ["_spec.rb", "_test.rb"],
        frameworks: [],
    }
}

fn dart_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*import\s+['"](?P<module>[^'"]+)['"]"#, ImportKind::Static),
            import_rule(r#"^\s*part\s+['"](?P<module>[^'"]+)['"]"#, ImportKind::Part),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>_)?class\s+(?P<name>\w+)"#, DeclarationKind::Class, |n, _| !n.starts_with('_')),
            decl_rule(r#"^\s*\w[\w<>, ]*\s+(?P<name>_?\w+)\s*\([^)]*\)\s*\{"#, DeclarationKind::Function, underscore_is_private),
        ],
        annotation: Some(re(r#"^\s*@(?P<name>[\w.]+)(?:\((?P<args>.*)\))?\s*$"#)),
        main: ["void main("],
        test_signals: ["package:test/test.dart", "package:flutter_test"],
        test_files: ["_test.dart"],
        frameworks: [],
    }
}

fn swift_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*import\s+(?P<module>\w+)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>private|fileprivate|internal)?\s*(?:final\s+)?func\s+(?P<name>\w+)"#, DeclarationKind::Function, marker_absent_means_public),
            decl_rule(r#"^\s*(?P<vis>private|fileprivate|internal)?\s*(?:final\s+)?class\s+(?P<name>\w+)"#, DeclarationKind::Class, marker_absent_means_public),
            decl_rule(r#"^\s*(?P<vis>private|fileprivate|internal)?\s*struct\s+(?P<name>\w+)"#, DeclarationKind::Struct, marker_absent_means_public),
            decl_rule(r#"^\s*(?P<vis>private|fileprivate|internal)?\s*protocol\s+(?P<name>\w+)"#, DeclarationKind::Interface, marker_absent_means_public),
        ],
        annotation: Some(re(r#"^\s*@(?P<name>\w+)(?:\((?P<args>.*)\))?\s*$"#)),
        main: ["@main", "func main("],
        test_signals: ["import XCTest"],
        test_files: ["Tests.swift"],
        frameworks: [],
    }
}

fn scala_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*import\s+(?P<module>[\w.]+(?:\._)?)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>private|protected)?\s*def\s+(?P<name>\w+)"#, DeclarationKind::Function, marker_absent_means_public),
            decl_rule(r#"^\s*(?P<vis>private|protected)?\s*(?:case\s+)?class\s+(?P<name>\w+)"#, DeclarationKind::Class, marker_absent_means_public),
            decl_rule(r#"^\s*(?P<vis>private|protected)?\s*object\s+(?P<name>\w+)"#, DeclarationKind::Class, marker_absent_means_public),
            decl_rule(r#"^\s*(?P<vis>private|protected)?\s*trait\s+(?P<name>\w+)"#, DeclarationKind::Trait, marker_absent_means_public),
        ],
        annotation: Some(re(r#"^\s*@(?P<name>[\w.]+)(?:\((?P<args>.*)\))?\s*$"#)),
        main: ["def main("],
        test_signals: ["org.scalatest", "munit."],
        test_files: ["Spec.scala", "Test.scala"],
        frameworks: [],
    }
}

fn groovy_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*import\s+(?P<module>[\w.]+(?:\.\*)?)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>[\w\s]*?)\bclass\s+(?P<name>\w+)"#, DeclarationKind::Class, marker_contains_public),
            decl_rule(r#"^\s*def\s+(?P<name>\w+)\s*\("#, DeclarationKind::Function, always_public),
        ],
        annotation: Some(re(r#"^\s*@(?P<name>[\w.]+)(?:\((?P<args>.*)\))?\s*$"#)),
        main: ["static void main("],
        test_signals: ["spock.lang"],
        test_files: ["Spec.groovy", "Test.groovy"],
        frameworks: [],
    }
}

fn crystal_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Indent,
        imports: [
            import_rule(r#"^\s*require\s+['"](?P<module>[^'"]+)['"]"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*def\s+(?:self\.)?(?P<name>[\w?!=]+)"#, DeclarationKind::Function, underscore_is_private),
            decl_rule(r#"^\s*class\s+(?P<name>\w+)"#, DeclarationKind::Class, underscore_is_private),
            decl_rule(r#"^\s*module\s+(?P<name>\w+)"#, DeclarationKind::Module, underscore_is_private),
        ],
        annotation: None,
        main: [],
        test_signals: ["require \"spec\""],
        test_files: ["_spec.cr"],
        frameworks: [],
    }
}

fn v_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*import\s+(?P<module>[\w.]+)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>pub\s+)?fn\s+(?P<name>\w+)"#, DeclarationKind::Function, |_, m| m.is_some()),
            decl_rule(r#"^\s*(?P<vis>pub\s+)?struct\s+(?P<name>\w+)"#, DeclarationKind::Struct, |_, m| m.is_some()),
        ],
        annotation: None,
        main: ["fn main("],
        test_signals: [],
        test_files: ["_test.v"],
        frameworks: [],
    }
}

fn objective_c_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(&c_like_import("#import"), ImportKind::Include),
            import_rule(&c_like_import("#include"), ImportKind::Include),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*@interface\s+(?P<name>\w+)"#, DeclarationKind::Class, always_public),
            decl_rule(r#"^\s*@implementation\s+(?P<name>\w+)"#, DeclarationKind::Class, always_public),
            decl_rule(r#"^\s*@protocol\s+(?P<name>\w+)"#, DeclarationKind::Interface, always_public),
        ],
        annotation: None,
        main: ["int main("],
        test_signals: ["XCTest/XCTest.h"],
        test_files: ["Tests.m"],
        frameworks: [],
    }
}

fn c_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(&c_like_import("#include"), ImportKind::Include),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?:static\s+)?\w[\w\s*]*\b(?P<name>\w+)\s*\([^;{]*\)\s*\{"#, DeclarationKind::Function, |_, m| !matches!(m, Some("static"))),
            decl_rule(r#"^\s*typedef\s+struct\s+\w*\s*\{[^}]*\}\s*(?P<name>\w+)\s*;"#, DeclarationKind::Struct, always_public),
        ],
        annotation: None,
        main: ["int main("],
        test_signals: ["greatest.h", "unity.h"],
        test_files: ["_test.c", "test_"],
        frameworks: [],
    }
}

fn cpp_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(&c_like_import("#include"), ImportKind::Include),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?:static\s+)?\w[\w\s*&<>:,]*\b(?P<name>\w+)\s*\([^;{]*\)\s*\{"#, DeclarationKind::Function, |_, m| !matches!(m, Some("static"))),
            decl_rule(r#"^\s*class\s+(?P<name>\w+)"#, DeclarationKind::Class, always_public),
            decl_rule(r#"^\s*struct\s+(?P<name>\w+)"#, DeclarationKind::Struct, always_public),
            decl_rule(r#"^\s*namespace\s+(?P<name>\w+)"#, DeclarationKind::Module, always_public),
        ],
        annotation: None,
        main: ["int main("],
        test_signals: ["gtest/gtest.h", "catch2/catch.hpp"],
        test_files: ["_test.cpp", "_test.cc"],
        frameworks: [],
    }
}

fn perl_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Flat,
        imports: [
            import_rule(r#"^\s*use\s+(?P<module>[\w:]+)"#, ImportKind::Use),
            import_rule(r#"^\s*require\s+(?P<module>[\w:]+)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*sub\s+(?P<name>\w+)"#, DeclarationKind::Function, |n, _| !n.starts_with('_')),
        ],
        annotation: None,
        main: [],
        test_signals: ["Test::More", "Test::Simple"],
        test_files: [".t"],
        frameworks: [],
    }
}

fn r_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Flat,
        imports: [
            import_rule(r#"^\s*library\(\s*(?P<module>\w+)\s*\)"#, ImportKind::Static),
            import_rule(r#"^\s*source\(\s*['"](?P<module>[^'"]+)['"]"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<name>[\w.]+)\s*(?:<-|=)\s*function\s*\("#, DeclarationKind::Function, always_public),
        ],
        annotation: None,
        main: [],
        test_signals: ["library(testthat)"],
        test_files: ["test-", "_test.R"],
        frameworks: [],
    }
}

fn clojure_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Flat,
        imports: [
            import_rule(r#"\(:require\s+\[(?P<module>[\w.-]+)"#, ImportKind::Use),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*\(defn-?\s+(?P<name>[\w*+!?<>=-]+)"#, DeclarationKind::Function, |_, _| true),
            decl_rule(r#"^\s*\(ns\s+(?P<name>[\w.-]+)"#, DeclarationKind::Module, always_public),
        ],
        annotation: None,
        main: [],
        test_signals: ["clojure.test"],
        test_files: ["_test.clj"],
        frameworks: [],
    }
}

fn fsharp_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Indent,
        imports: [
            import_rule(r#"^\s*open\s+(?P<module>[\w.]+)"#, ImportKind::Use),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>private\s+|internal\s+)?let\s+(?P<name>\w+)"#, DeclarationKind::Function, marker_absent_means_public),
            decl_rule(r#"^\s*(?P<vis>private\s+|internal\s+)?type\s+(?P<name>\w+)"#, DeclarationKind::Type, marker_absent_means_public),
            decl_rule(r#"^\s*module\s+(?P<name>[\w.]+)"#, DeclarationKind::Module, always_public),
        ],
        annotation: Some(re(r#"^\s*\[<(?P<name>\w+)(?:\((?P<args>.*)\))?>\]\s*$"#)),
        main: ["[<EntryPoint>]"],
        test_signals: ["NUnit.Framework", "Xunit"],
        test_files: ["Tests.fs"],
        frameworks: [],
    }
}

fn ocaml_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Flat,
        imports: [
            import_rule(r#"^\s*open\s+(?P<module>\w+)"#, ImportKind::Use),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*let\s+(?:rec\s+)?(?P<name>\w+)"#, DeclarationKind::Function, always_public),
            decl_rule(r#"^\s*module\s+(?P<name>\w+)"#, DeclarationKind::Module, always_public),
            decl_rule(r#"^\s*type\s+(?P<name>\w+)"#, DeclarationKind::Type, always_public),
        ],
        annotation: None,
        main: [],
        test_signals: ["OUnit"],
        test_files: ["_test.ml"],
        frameworks: [],
    }
}

fn julia_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Flat,
        imports: [
            import_rule(r#"^\s*using\s+(?P<module>[\w.]+)"#, ImportKind::Use),
            import_rule(r#"^\s*import\s+(?P<module>[\w.]+)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*function\s+(?P<name>\w+)"#, DeclarationKind::Function, |n, _| !n.starts_with('_')),
            decl_rule(r#"^\s*(?:mutable\s+)?struct\s+(?P<name>\w+)"#, DeclarationKind::Struct, |n, _| !n.starts_with('_')),
        ],
        annotation: None,
        main: [],
        test_signals: ["using Test"],
        test_files: ["_test.jl", "runtests.jl"],
        frameworks: [],
    }
}

fn zig_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"@import\(\s*"(?P<module>[^"]+)"\s*\)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>pub\s+)?fn\s+(?P<name>\w+)"#, DeclarationKind::Function, |_, m| m.is_some()),
            decl_rule(r#"^\s*(?P<vis>pub\s+)?const\s+(?P<name>\w+)\s*=\s*struct"#, DeclarationKind::Struct, |_, m| m.is_some()),
        ],
        annotation: None,
        main: ["pub fn main("],
        test_signals: ["test \""],
        test_files: ["_test.zig"],
        frameworks: [],
    }
}

fn nim_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Indent,
        imports: [
            import_rule(r#"^\s*import\s+(?P<module>[\w/]+)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*proc\s+(?P<name>[\w*`]+)"#, DeclarationKind::Function, |n, _| n.ends_with('*')),
            decl_rule(r#"^\s*type\s+(?P<name>[\w*]+)"#, DeclarationKind::Type, |n, _| n.ends_with('*')),
        ],
        annotation: None,
        main: [],
        test_signals: ["import unittest"],
        test_files: ["_test.nim", "test_"],
        frameworks: [],
    }
}

fn erlang_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Flat,
        imports: [
            import_rule(r#"^\s*-import\(\s*(?P<module>\w+)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<name>\w+)\s*\([^)]*\)\s*->"#, DeclarationKind::Function, always_public),
            decl_rule(r#"^\s*-module\((?P<name>\w+)\)"#, DeclarationKind::Module, always_public),
        ],
        annotation: None,
        main: [],
        test_signals: ["-include_lib(\"eunit/include/eunit.hrl\")"],
        test_files: ["_tests.erl", "_SUITE.erl"],
        frameworks: [],
    }
}

fn lua_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Flat,
        imports: [
            import_rule(r#"require\(\s*['"](?P<module>[^'"]+)['"]\s*\)"#, ImportKind::Static),
            import_rule(r#"^\s*require\s+['"](?P<module>[^'"]+)['"]"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>local\s+)?function\s+(?P<name>[\w.:]+)"#, DeclarationKind::Function, |_, m| m.is_none()),
        ],
        annotation: None,
        main: [],
        test_signals: ["require('busted')", "require(\"busted\")"],
        test_files: ["_spec.lua"],
        frameworks: [],
    }
}

fn haskell_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Indent,
        imports: [
            import_rule(r#"^\s*import\s+(?:qualified\s+)?(?P<module>[\w.]+)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^(?P<name>[a-z][\w']*)\s*(?:::|\w*\s*=)"#, DeclarationKind::Function, always_public),
            decl_rule(r#"^module\s+(?P<name>[\w.]+)"#, DeclarationKind::Module, always_public),
        ],
        annotation: None,
        main: ["main ="],
        test_signals: ["Test.Hspec", "Test.Tasty"],
        test_files: ["Spec.hs"],
        frameworks: [],
    }
}

fn elixir_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Indent,
        imports: [
            import_rule(r#"^\s*(?:import|use|alias)\s+(?P<module>[\w.]+)"#, ImportKind::Use),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*def\s+(?P<name>\w[\w?!]*)"#, DeclarationKind::Function, always_public),
            decl_rule(r#"^\s*defp\s+(?P<name>\w[\w?!]*)"#, DeclarationKind::Function, |_, _| false),
            decl_rule(r#"^\s*defmodule\s+(?P<name>[\w.]+)"#, DeclarationKind::Module, always_public),
        ],
        annotation: None,
        main: [],
        test_signals: ["ExUnit.Case"],
        test_files: ["_test.exs"],
        frameworks: [],
    }
}

fn shell_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Flat,
        imports: [
            import_rule(r#"^\s*(?:source|\.)\s+['"]?(?P<module>[\w./-]+)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?:function\s+)?(?P<name>[\w-]+)\s*\(\)\s*\{"#, DeclarationKind::Function, always_public),
        ],
        annotation: None,
        main: [],
        test_signals: ["bats", "shunit2"],
        test_files: [".bats", "_test.sh"],
        frameworks: [],
    }
}

fn powershell_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*Import-Module\s+(?P<module>[\w./-]+)"#, ImportKind::Static),
            import_rule(r#"^\s*\.\s+['"]?(?P<module>[\w./-]+\.ps1)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*function\s+(?P<name>[\w-]+)"#, DeclarationKind::Function, always_public),
        ],
        annotation: None,
        main: [],
        test_signals: ["Pester"],
        test_files: [".Tests.ps1"],
        frameworks: [],
    }
}

fn cobol_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Flat,
        imports: [
            import_rule(r#"COPY\s+(?P<module>[\w-]+)"#, ImportKind::Include),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*PROGRAM-ID\.\s+(?P<name>[\w-]+)"#, DeclarationKind::Module, always_public),
        ],
        annotation: None,
        main: [],
        test_signals: [],
        test_files: [],
        frameworks: [],
    }
}

fn fortran_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Flat,
        imports: [
            import_rule(r#"^\s*use\s+(?P<module>\w+)"#, ImportKind::Use),
            import_rule(r#"^\s*include\s+['"](?P<module>[^'"]+)['"]"#, ImportKind::Include),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?:subroutine|function)\s+(?P<name>\w+)"#, DeclarationKind::Function, always_public),
            decl_rule(r#"^\s*module\s+(?P<name>\w+)"#, DeclarationKind::Module, always_public),
        ],
        annotation: None,
        main: ["program "],
        test_signals: ["pfunit"],
        test_files: ["_test.f90"],
        frameworks: [],
    }
}

fn vbnet_rules() -> LanguageRules {
    rules! {
        depth: DepthStyle::Brace,
        imports: [
            import_rule(r#"^\s*Imports\s+(?P<module>[\w.]+)"#, ImportKind::Static),
        ],
        reexports: [],
        decls: [
            decl_rule(r#"^\s*(?P<vis>Public|Private|Friend)?\s*(?:Shared\s+)?(?:Sub|Function)\s+(?P<name>\w+)"#, DeclarationKind::Function, |_, m| !matches!(m, Some("Private"))),
            decl_rule(r#"^\s*(?P<vis>Public|Private|Friend)?\s*Class\s+(?P<name>\w+)"#, DeclarationKind::Class, |_, m| !matches!(m, Some("Private"))),
        ],
        annotation: None,
        main: ["Sub Main("],
        test_signals: ["Microsoft.VisualStudio.TestTools"],
        test_files: ["Tests.vb"],
        frameworks: [],
    }
}

pub fn rules_for(language: Language) -> Option<&'static LanguageRules> {
    macro_rules! cached {
        ($cell:ident, $ctor:expr) => {{
            static $cell: OnceLock<LanguageRules> = OnceLock::new();
            Some($cell.get_or_init(|| $ctor))
        }};
    }
    match language {
        Language::Python => cached!(PYTHON, python_rules()),
        Language::Go => cached!(GO, go_rules()),
        Language::Rust => cached!(RUST, rust_rules()),
        Language::Java => cached!(JAVA, java_rules()),
        Language::Kotlin => cached!(KOTLIN, kotlin_rules()),
        Language::CSharp => cached!(CSHARP, csharp_rules()),
        Language::Php => cached!(PHP, php_rules()),
        Language::Ruby => cached!(RUBY, ruby_rules()),
        Language::Dart => cached!(DART, dart_rules()),
        Language::Swift => cached!(SWIFT, swift_rules()),
        Language::Scala => cached!(SCALA, scala_rules()),
        Language::Groovy => cached!(GROOVY, groovy_rules()),
        Language::Crystal => cached!(CRYSTAL, crystal_rules()),
        Language::V => cached!(V, v_rules()),
        Language::ObjectiveC => cached!(OBJC, objective_c_rules()),
        Language::C => cached!(C, c_rules()),
        Language::Cpp => cached!(CPP, cpp_rules()),
        Language::Perl => cached!(PERL, perl_rules()),
        Language::R => cached!(R, r_rules()),
        Language::Clojure => cached!(CLOJURE, clojure_rules()),
        Language::FSharp => cached!(FSHARP, fsharp_rules()),
        Language::OCaml => cached!(OCAML, ocaml_rules()),
        Language::Julia => cached!(JULIA, julia_rules()),
        Language::Zig => cached!(ZIG, zig_rules()),
        Language::Nim => cached!(NIM, nim_rules()),
        Language::Erlang => cached!(ERLANG, erlang_rules()),
        Language::Lua => cached!(LUA, lua_rules()),
        Language::Haskell => cached!(HASKELL, haskell_rules()),
        Language::Elixir => cached!(ELIXIR, elixir_rules()),
        Language::Shell => cached!(SHELL, shell_rules()),
        Language::PowerShell => cached!(POWERSHELL, powershell_rules()),
        Language::Cobol => cached!(COBOL, cobol_rules()),
        Language::Fortran => cached!(FORTRAN, fortran_rules()),
        Language::VbNet => cached!(VBNET, vbnet_rules()),
        Language::JavaScript
        | Language::TypeScript
        | Language::Jsx
        | Language::Tsx
        | Language::Vue
        | Language::Types => None,
    }
}

pub fn decl_kind_to_export_kind(kind: DeclarationKind) -> ExportKind {
    match kind {
        DeclarationKind::Function => ExportKind::Function,
        DeclarationKind::Class => ExportKind::Class,
        DeclarationKind::Struct => ExportKind::Class,
        DeclarationKind::Trait => ExportKind::Interface,
        DeclarationKind::Interface => ExportKind::Interface,
        DeclarationKind::Type => ExportKind::Type,
        DeclarationKind::Enum => ExportKind::Enum,
        DeclarationKind::Module => ExportKind::Namespace,
    }
}
