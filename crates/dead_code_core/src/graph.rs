//! `ModuleGraph`: the fully-resolved import/export graph the
//! `ReachabilityEngine` walks. Keyed by root-relative path
//! (`path_to_id` index + `Vec<ModuleNode>`), with a symbol model general
//! enough to cover every supported language's import shape, built
//! directly from resolver output as each file's imports are resolved.

use std::path::Path;

use ahashmap::AHashMap;
use path_slash::PathExt;
use source_model::{ImportKind, SourceFile};

use crate::error::Diagnostic;
use crate::resolver::{self, FileIndex, Resolved};

/// What an edge targets within the destination file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Named(String),
    Default,
    /// A namespace/glob/`export *`/dynamic-non-literal import: every
    /// export of the target file must be treated as reachable, since
    /// there's no statically-known single symbol being reached.
    Namespace,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub to_file: usize,
    pub symbol: Symbol,
}

#[derive(Debug, Clone)]
pub struct ModuleNode {
    pub path: String,
    pub source: SourceFile,
    pub outgoing: Vec<Edge>,
}

#[derive(Debug, Default)]
pub struct ModuleGraph {
    pub path_to_id: AHashMap<String, usize>,
    pub nodes: Vec<ModuleNode>,
}

fn relative_slash(root: &Path, path: &str) -> String {
    let p = Path::new(path);
    p.strip_prefix(root).unwrap_or(p).to_slash_lossy().to_string()
}

impl ModuleGraph {
    pub fn build(root: &Path, sources: Vec<SourceFile>, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let index = FileIndex::build(root, sources.iter().map(|s| Path::new(&s.path).to_path_buf()));
        let js_config = resolver::js::JsResolveConfig::load(root);

        let mut path_to_id = AHashMap::default();
        let mut nodes: Vec<ModuleNode> = Vec::with_capacity(sources.len());
        for source in sources {
            let rel = relative_slash(root, &source.path);
            let id = nodes.len();
            path_to_id.insert(rel.clone(), id);
            nodes.push(ModuleNode { path: rel, source, outgoing: Vec::new() });
        }

        for i in 0..nodes.len() {
            let language = nodes[i].source.language;
            let importing_path = nodes[i].path.clone();
            let imports = nodes[i].source.parse_result.imports.clone();

            let mut outgoing = Vec::new();
            for import in &imports {
                let Some(raw) = &import.raw_module else {
                    // a dynamic import whose argument isn't a string literal:
                    // nothing to resolve, nothing to mark. (A dynamic-pattern
                    // *string* match is handled by the verdict stage, not the
                    // graph, since it isn't an edge to a specific file.)
                    continue;
                };

                match resolver::resolve(&importing_path, language, raw, &index, &js_config) {
                    Resolved::Local(target) => {
                        let Some(&to_file) = path_to_id.get(&target) else { continue };
                        if import.is_glob || matches!(import.kind, ImportKind::ReexportAll) {
                            outgoing.push(Edge { to_file, symbol: Symbol::Namespace });
                            continue;
                        }
                        match &import.named_symbols {
                            Some(named) if !named.is_empty() => {
                                for n in named {
                                    // `import * as ns from './mod'` is carried as a
                                    // `NamedSymbol` literally named `"*"` so the
                                    // specifier list stays a flat `Vec`; route it back
                                    // to a namespace edge instead of a named lookup for
                                    // a (non-existent) export called `*`.
                                    let symbol = if n.name == "*" { Symbol::Namespace } else { Symbol::Named(n.name.clone()) };
                                    outgoing.push(Edge { to_file, symbol });
                                }
                            }
                            _ if import.is_side_effect_only() => {
                                // a side-effect-only import still reaches the
                                // file (so it's never reported dead) without
                                // reaching any particular export of it.
                            }
                            _ => outgoing.push(Edge { to_file, symbol: Symbol::Namespace }),
                        }
                    }
                    Resolved::External => {}
                    Resolved::Failed(reason) => {
                        diagnostics.push(Diagnostic::ResolutionFailure {
                            path: importing_path.clone(),
                            line: import.line,
                            raw_module: import.raw_module.clone(),
                            reason,
                        });
                    }
                }
            }
            nodes[i].outgoing = outgoing;
        }

        ModuleGraph { path_to_id, nodes }
    }

    pub fn node_id(&self, path: &str) -> Option<usize> {
        self.path_to_id.get(path).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use source_model::{Language, ParseMetadata, ParseResult};
    use std::path::PathBuf;

    fn source(path: &str, language: Language, result: ParseResult) -> SourceFile {
        SourceFile {
            path: path.to_string(),
            language,
            bytes: 0,
            line_count: 0,
            parse_result: result,
        }
    }

    #[test]
    fn builds_edges_between_local_files() {
        let a = ast_parser::parse(Language::TypeScript, "/repo/src/a.ts", "import { b } from './b';\n");
        let b_result = ParseResult { metadata: ParseMetadata::default(), ..Default::default() };

        let sources = vec![
            source("/repo/src/a.ts", Language::TypeScript, a),
            source("/repo/src/b.ts", Language::TypeScript, b_result),
        ];
        let mut diagnostics = Vec::new();
        let graph = ModuleGraph::build(&PathBuf::from("/repo"), sources, &mut diagnostics);

        let a_id = graph.node_id("src/a.ts").unwrap();
        let b_id = graph.node_id("src/b.ts").unwrap();
        assert!(graph.nodes[a_id].outgoing.iter().any(|e| e.to_file == b_id));
    }

    #[test]
    fn namespace_import_becomes_a_namespace_edge_not_a_named_star_lookup() {
        let a = ast_parser::parse(Language::TypeScript, "/repo/src/a.ts", "import * as ns from './b';\nfunction main() { return ns; }\n");
        let b_result = ParseResult { metadata: ParseMetadata::default(), ..Default::default() };

        let sources = vec![
            source("/repo/src/a.ts", Language::TypeScript, a),
            source("/repo/src/b.ts", Language::TypeScript, b_result),
        ];
        let mut diagnostics = Vec::new();
        let graph = ModuleGraph::build(&PathBuf::from("/repo"), sources, &mut diagnostics);

        let a_id = graph.node_id("src/a.ts").unwrap();
        let b_id = graph.node_id("src/b.ts").unwrap();
        let edge = graph.nodes[a_id].outgoing.iter().find(|e| e.to_file == b_id).unwrap();
        assert_eq!(edge.symbol, Symbol::Namespace);
    }
}
