//! AST tier of the `ParserBank`: full AST extraction for the JavaScript
//! family, backed by a vendored SWC grammar.
//!
//! Lexer/parser wiring plus a `resolver` pass to tag identifiers, emitting
//! `source_model::ParseResult` directly; a parse failure never propagates
//! as an `Err` — it becomes `metadata.parse_error` with whatever partial
//! data was extracted.

pub mod visitor;

use std::panic::{catch_unwind, AssertUnwindSafe};

use swc_common::comments::SingleThreadedComments;
use swc_common::errors::Handler;
use swc_common::sync::Lrc;
use swc_common::{FileName, Globals, Mark, SourceMap, GLOBALS};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Capturing, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_transforms::resolver;
use swc_ecma_visit::{FoldWith, VisitWith};

use source_model::{Language, ParseMetadata, ParseResult};
use visitor::JsVisitor;

/// Parses a single JS-family file. Never panics: a lexer/parser panic
/// (SWC's error recovery doesn't cover every malformed-input case) is
/// caught and turned into a `parse_error`, exactly like an ordinary syntax
/// error would be.
pub fn parse(language: Language, path: &str, content: &str) -> ParseResult {
    if language == Language::Vue {
        return parse_vue_sfc(path, content);
    }

    match catch_unwind(AssertUnwindSafe(|| parse_module(path, content))) {
        Ok(Ok((imports, exports, declarations, annotations))) => ParseResult {
            imports,
            exports,
            declarations,
            annotations,
            metadata: build_metadata(path, content),
        },
        Ok(Err(reason)) => ParseResult::with_parse_error(reason),
        Err(_) => ParseResult::with_parse_error("internal parser panic"),
    }
}

type RawParse = (
    Vec<source_model::ImportRef>,
    Vec<source_model::ExportDecl>,
    Vec<source_model::Declaration>,
    Vec<source_model::Annotation>,
);

fn parse_module(path: &str, content: &str) -> Result<RawParse, String> {
    let cm = Lrc::<SourceMap>::default();
    let fname: Lrc<FileName> = Lrc::new(FileName::Real(path.into()));
    let fm = cm.new_source_file(fname, content.to_string());

    let is_tsx = path.ends_with(".tsx") || path.ends_with(".jsx");
    let comments = SingleThreadedComments::default();
    let lexer = swc_ecma_parser::lexer::Lexer::new(
        Syntax::Typescript(TsSyntax {
            tsx: is_tsx,
            decorators: true,
            ..Default::default()
        }),
        Default::default(),
        StringInput::from(&*fm),
        Some(&comments),
    );
    let capturing = Capturing::new(lexer);
    let mut parser = Parser::new_from(capturing);

    let dest: Vec<u8> = Vec::new();
    let handler = Handler::with_emitter_writer(Box::new(dest), Some(cm.clone()));

    let module: Module = match parser.parse_typescript_module() {
        Ok(module) => module,
        Err(error) => {
            let mut diagnostic = error.into_diagnostic(&handler);
            let msg = diagnostic.message();
            diagnostic.cancel();
            return Err(msg);
        }
    };

    let globals = Globals::new();
    let module = GLOBALS.set(&globals, || {
        let mut resolver_pass = resolver(Mark::fresh(Mark::root()), Mark::fresh(Mark::root()), is_tsx);
        module.fold_with(&mut resolver_pass)
    });

    let mut visitor = JsVisitor::new(&cm, &comments);
    visitor.scan_top_level(&module);
    module.visit_with(&mut visitor);

    Ok((visitor.imports, visitor.exports, visitor.declarations, visitor.annotations))
}

fn build_metadata(path: &str, content: &str) -> ParseMetadata {
    let mut metadata = ParseMetadata::default();
    metadata.is_test_file = path.contains(".test.")
        || path.contains(".spec.")
        || path.contains("__tests__")
        || content.contains("from 'vitest'")
        || content.contains("from \"vitest\"")
        || content.contains("from 'jest'")
        || content.contains("describe(")
        || content.contains("it(");

    for (marker, flag) in [
        ("@Injectable(", "isNestProvider"),
        ("@Controller(", "isNestController"),
        ("@Component(", "isAngularComponent"),
        ("@NgModule(", "isAngularModule"),
        ("@Module(", "isNestModule"),
        ("@Entity(", "isTypeOrmEntity"),
    ] {
        if content.contains(marker) {
            metadata.extra_flags.insert(flag.to_string(), true);
        }
    }
    metadata
}

/// Extracts `<script>`/`<script setup>` blocks from a Vue single-file
/// component and parses their concatenated content, offsetting reported
/// line numbers so they refer back to the original `.vue` file.
///
/// Multiple `<script>` blocks (a `<script>` plus a `<script setup>`) are
/// merged into one parse, each tracked with its own offset.
fn parse_vue_sfc(path: &str, content: &str) -> ParseResult {
    let blocks = find_script_blocks(content);
    if blocks.is_empty() {
        let mut result = ParseResult::default();
        result.metadata.is_vue_sfc = true;
        return result;
    }

    let mut imports = Vec::new();
    let mut exports = Vec::new();
    let mut declarations = Vec::new();
    let mut annotations = Vec::new();
    let mut had_error = None;

    for block in &blocks {
        match catch_unwind(AssertUnwindSafe(|| parse_module(path, &block.content))) {
            Ok(Ok((i, e, d, a))) => {
                let offset = block.line_offset;
                imports.extend(i.into_iter().map(|mut x| {
                    x.line += offset;
                    x
                }));
                exports.extend(e.into_iter().map(|mut x| {
                    x.line += offset;
                    x
                }));
                declarations.extend(d.into_iter().map(|mut x| {
                    x.line += offset;
                    x.end_line += offset;
                    x
                }));
                annotations.extend(a.into_iter().map(|mut x| {
                    x.target_line += offset;
                    x
                }));
            }
            Ok(Err(reason)) => had_error.get_or_insert(reason),
            Err(_) => had_error.get_or_insert("internal parser panic in <script> block".to_string()),
        };
    }

    let mut metadata = build_metadata(path, content);
    metadata.is_vue_sfc = true;
    metadata.parse_error = had_error;

    ParseResult {
        imports,
        exports,
        declarations,
        annotations,
        metadata,
    }
}

struct ScriptBlock {
    content: String,
    /// Line number (1-indexed, minus 1) of the line the block's content
    /// starts on within the full `.vue` file, added to every line number
    /// the nested parse reports.
    line_offset: u32,
}

fn find_script_blocks(content: &str) -> Vec<ScriptBlock> {
    let mut blocks = Vec::new();
    let mut search_from = 0usize;
    while let Some(open_rel) = content[search_from..].find("<script") {
        let open_abs = search_from + open_rel;
        let Some(tag_end_rel) = content[open_abs..].find('>') else {
            break;
        };
        let tag_end_abs = open_abs + tag_end_rel + 1;
        let Some(close_rel) = content[tag_end_abs..].find("</script>") else {
            break;
        };
        let close_abs = tag_end_abs + close_rel;

        let line_offset = content[..tag_end_abs].matches('\n').count() as u32;
        blocks.push(ScriptBlock {
            content: content[tag_end_abs..close_abs].to_string(),
            line_offset,
        });
        search_from = close_abs + "</script>".len();
    }
    blocks
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_static_and_dynamic_imports() {
        let src = "import { a } from './a';\nimport('./b');\nexport const c = 1;\n";
        let result = parse(Language::TypeScript, "x.ts", src);
        assert!(result.metadata.parse_error.is_none());
        assert_eq!(result.imports.len(), 2);
        assert_eq!(result.imports[0].raw_module.as_deref(), Some("./a"));
        assert_eq!(result.imports[1].kind, source_model::ImportKind::Dynamic);
    }

    #[test]
    fn captures_top_level_function_and_class_declarations() {
        let src = "export function foo() {}\nclass Bar {}\nexport const baz = () => 1;\n";
        let result = parse(Language::TypeScript, "x.ts", src);
        assert_eq!(result.declarations.len(), 3);
        assert!(result.declarations.iter().any(|d| d.name == "foo" && d.public));
        assert!(result.declarations.iter().any(|d| d.name == "Bar" && !d.public));
        assert!(result.declarations.iter().any(|d| d.name == "baz" && d.public));
    }

    #[test]
    fn syntax_error_yields_parse_error_not_panic() {
        let result = parse(Language::TypeScript, "x.ts", "export const = = ;;;{{{");
        assert!(result.metadata.parse_error.is_some());
    }

    #[test]
    fn vue_sfc_offsets_script_block_lines() {
        let src = "<template>\n  <div/>\n</template>\n<script>\nimport { a } from './a';\n</script>\n";
        let result = parse(Language::Vue, "x.vue", src);
        assert!(result.metadata.is_vue_sfc);
        assert_eq!(result.imports.len(), 1);
        // the import line inside the script block is line 1 of the block,
        // offset by 4 lines (content starts after `<script>\n`)
        assert_eq!(result.imports[0].line, 5);
    }
}
