//! Regex tier of the `ParserBank`: one [`rules::LanguageRules`] table
//! per supported non-JS language, scanned by a single generic engine.
//!
//! Data-driven regex/glob tables, compiled once and matched many times,
//! producing the same [`source_model::ParseResult`] shape the AST tier
//! does — consumers can't tell which tier ran.

pub mod rules;

use rules::{rules_for, DepthStyle};
use source_model::{
    Annotation, Declaration, ExportDecl, ImportRef, Language, NamedSymbol, ParseMetadata,
    ParseResult, REEXPORT_ALL_SENTINEL,
};

/// Parses a single file's contents under the regex tier. Never panics: an
/// unsupported language or any internal extraction hiccup yields a
/// `ParseResult` with `metadata.parse_error` set and whatever partial data
/// was already extracted.
pub fn parse(language: Language, path: &str, content: &str) -> ParseResult {
    let rules = match rules_for(language) {
        Some(rules) => rules,
        None => {
            return ParseResult::with_parse_error(format!(
                "regex_parsers has no rule table for {language:?}"
            ))
        }
    };

    let lines: Vec<&str> = content.lines().collect();
    let mut imports = Vec::new();
    let mut exports = Vec::new();
    let mut declarations = Vec::new();
    let mut annotations = Vec::new();

    let mut brace_depth: i64 = 0;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;
        let depth_before = brace_depth;
        let indent = leading_indent(line);

        for rule in &rules.imports {
            if let Some(caps) = rule.regex.captures(line) {
                let raw_module = caps.name("module").map(|m| m.as_str().to_string());
                let named_symbols = if rule.names_group {
                    caps.name("names").map(|m| parse_named_symbols(m.as_str()))
                } else {
                    None
                };
                imports.push(ImportRef {
                    raw_module,
                    kind: rule.kind,
                    line: line_no,
                    is_dynamic: matches!(rule.kind, source_model::ImportKind::Dynamic),
                    is_glob: matches!(rule.kind, source_model::ImportKind::Glob),
                    named_symbols,
                });
            }
        }

        for reexport in &rules.reexports {
            if let Some(caps) = reexport.regex.captures(line) {
                let module = caps.name("module").map(|m| m.as_str().to_string());
                let name = caps.name("name").map(|m| m.as_str()).unwrap_or("");
                let import_idx = imports.len();
                let is_glob = name == "*";
                imports.push(ImportRef {
                    raw_module: module,
                    kind: source_model::ImportKind::Use,
                    line: line_no,
                    is_dynamic: false,
                    is_glob,
                    named_symbols: None,
                });
                let (kind, export_name) = if is_glob {
                    (
                        source_model::ExportKind::ReexportAll,
                        REEXPORT_ALL_SENTINEL.to_string(),
                    )
                } else {
                    (source_model::ExportKind::Reexport, name.to_string())
                };
                exports.push(ExportDecl {
                    name: export_name,
                    kind,
                    line: line_no,
                    is_default: false,
                    source_import: Some(import_idx),
                    is_type_only: false,
                    allow_unused: false,
                });
            }
        }

        let is_top_level = match rules.depth_style {
            DepthStyle::Brace => depth_before <= 0,
            DepthStyle::Indent => indent == 0,
            DepthStyle::Flat => true,
        };

        if is_top_level {
            for rule in &rules.declarations {
                if let Some(caps) = rule.regex.captures(line) {
                    let Some(name_m) = caps.name("name") else {
                        continue;
                    };
                    let name = name_m.as_str().trim_end_matches('*').to_string();
                    let marker = caps.name("vis").map(|m| m.as_str());
                    let public = (rule.visibility)(&name, marker);
                    let end_line = match rules.depth_style {
                        DepthStyle::Brace => find_brace_end(&lines, idx),
                        DepthStyle::Indent => find_indent_end(&lines, idx, indent),
                        DepthStyle::Flat => line_no,
                    };
                    declarations.push(Declaration {
                        name: name.clone(),
                        kind: rule.kind,
                        line: line_no,
                        end_line,
                        public,
                    });
                    if public {
                        exports.push(ExportDecl {
                            name,
                            kind: rules::decl_kind_to_export_kind(rule.kind),
                            line: line_no,
                            is_default: false,
                            source_import: None,
                            is_type_only: matches!(
                                rule.kind,
                                source_model::DeclarationKind::Type
                                    | source_model::DeclarationKind::Interface
                                    | source_model::DeclarationKind::Trait
                            ),
                            allow_unused: false,
                        });
                    }
                }
            }
        }

        if let Some(ann_re) = &rules.annotation {
            if let Some(caps) = ann_re.captures(line) {
                if let Some(name_m) = caps.name("name") {
                    annotations.push(Annotation {
                        name: name_m.as_str().to_string(),
                        arguments: caps.name("args").map(|m| m.as_str().to_string()),
                        target_line: line_no,
                    });
                }
            }
        }

        brace_depth += line_brace_delta(line);
    }

    let mut metadata = ParseMetadata::default();
    metadata.has_main_entry = rules.main_markers.iter().any(|m| content.contains(m));
    metadata.is_test_file = rules.test_signals.iter().any(|m| content.contains(m))
        || rules.test_filename_markers.iter().any(|m| path.contains(m));
    for (marker, flag) in &rules.framework_markers {
        if content.contains(marker) {
            flag.apply(&mut metadata);
        }
    }

    ParseResult {
        imports,
        exports,
        declarations,
        annotations,
        metadata,
    }
}

/// Splits a `from x import a, b as c` / `use x::{a, b as c}` style name list
/// into [`NamedSymbol`]s. Best-effort: nested braces/generics in the list
/// aren't expected here since the capturing regex only grabs the flat list.
fn parse_named_symbols(raw: &str) -> Vec<NamedSymbol> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|item| {
            if let Some((name, alias)) = item.split_once(" as ") {
                NamedSymbol {
                    name: name.trim().to_string(),
                    alias: Some(alias.trim().to_string()),
                }
            } else {
                NamedSymbol {
                    name: item.to_string(),
                    alias: None,
                }
            }
        })
        .collect()
}

fn leading_indent(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Net `{`/`}` delta for a line. Doesn't attempt to skip string/comment
/// contents — tracks brace depth well enough to tell top-level
/// declarations from nested ones without full lexing.
fn line_brace_delta(line: &str) -> i64 {
    let opens = line.matches('{').count() as i64;
    let closes = line.matches('}').count() as i64;
    opens - closes
}

/// Scans forward from a declaration's start line until cumulative brace
/// depth returns to (or below) zero relative to this line, returning the
/// line on which that happens. Signatures with no body (e.g. an interface
/// method ending in `;`) resolve to their own start line.
fn find_brace_end(lines: &[&str], start_idx: usize) -> u32 {
    let mut depth = 0i64;
    for (offset, line) in lines[start_idx..].iter().enumerate() {
        depth += line_brace_delta(line);
        if offset > 0 && depth <= 0 {
            return (start_idx + offset + 1) as u32;
        }
        if offset == 0 && depth == 0 {
            return (start_idx + 1) as u32;
        }
    }
    lines.len() as u32
}

/// Scans forward from a declaration's start line until a subsequent
/// non-blank line's indentation is no deeper than the declaration's own,
/// returning the last line still inside the body.
fn find_indent_end(lines: &[&str], start_idx: usize, decl_indent: usize) -> u32 {
    let mut last_inside = start_idx;
    for (offset, line) in lines[start_idx + 1..].iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if leading_indent(line) <= decl_indent {
            break;
        }
        last_inside = start_idx + 1 + offset;
    }
    (last_inside + 1) as u32
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_python_imports_and_defs() {
        let src = "import os\nfrom foo.bar import baz, qux as q\n\ndef _private():\n    pass\n\n\ndef public_fn():\n    return 1\n";
        let result = parse(Language::Python, "mod.py", src);
        assert_eq!(result.imports.len(), 2);
        assert_eq!(result.imports[1].raw_module.as_deref(), Some("foo.bar"));
        let names = result.imports[1].named_symbols.as_ref().unwrap();
        assert_eq!(names[0].name, "baz");
        assert_eq!(names[1].name, "qux");
        assert_eq!(names[1].alias.as_deref(), Some("q"));

        assert_eq!(result.declarations.len(), 2);
        assert!(!result.declarations[0].public);
        assert!(result.declarations[1].public);
        assert_eq!(result.exports.len(), 1);
        assert_eq!(result.exports[0].name, "public_fn");
    }

    #[test]
    fn parses_go_exported_function_and_struct() {
        let src = "package main\n\nimport \"fmt\"\n\nfunc Exported() {\n\tfmt.Println(\"hi\")\n}\n\nfunc unexported() {}\n\nfunc main() {\n\tExported()\n}\n";
        let result = parse(Language::Go, "main.go", src);
        assert!(result.metadata.has_main_entry);
        let exported: Vec<_> = result.declarations.iter().filter(|d| d.public).collect();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].name, "Exported");
        assert!(exported[0].end_line > exported[0].line);
    }

    #[test]
    fn parses_rust_pub_use_as_reexport() {
        let src = "pub use crate::inner::Thing;\npub fn helper() {}\n";
        let result = parse(Language::Rust, "lib.rs", src);
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.exports.len(), 2);
        assert_eq!(result.exports[0].name, "Thing");
        assert_eq!(
            result.exports[0].kind,
            source_model::ExportKind::Reexport
        );
        assert_eq!(result.exports[0].source_import, Some(0));
    }

    #[test]
    fn parse_error_for_unsupported_language() {
        let result = parse(Language::Types, "types.d.ts", "export type X = number;");
        assert!(result.metadata.parse_error.is_some());
        assert!(result.imports.is_empty());
    }

    #[test]
    fn detects_test_file_by_import_signal() {
        let result = parse(Language::Python, "thing.py", "import pytest\n\ndef test_x():\n    pass\n");
        assert!(result.metadata.is_test_file);
    }

    #[test]
    fn detects_django_model_framework_flag() {
        let src = "from django.db import models\n\nclass User(models.Model):\n    pass\n";
        let result = parse(Language::Python, "models.py", src);
        assert!(result.metadata.is_django_model);
    }
}
