//! `ReachabilityEngine`: a breadth-first walk of the `ModuleGraph`
//! from every entry point, tagging each file reached and — per file —
//! which of its exports were reached by name.
//!
//! A frontier of `(file, symbol)` pairs is processed in iteration rounds
//! with a `MAX_ITERATIONS` safety cap against a malformed graph
//! producing an infinite frontier, and a `visited` set keyed on the edge
//! so a cycle (`a` imports `b` imports `a`) can't reprocess the same edge
//! twice. Re-export chains need no special casing here: `ModuleGraph::build`
//! already turned `export { x } from './y'` into an ordinary edge from
//! the re-exporting file to `y`, so following edges transitively already
//! walks through re-exports.

use ahashmap::{AHashMap, AHashSet};

use crate::entry_points::EntryPoints;
use crate::graph::{ModuleGraph, Symbol};

/// Which of a file's exports were reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachableExports {
    /// Reached through a namespace/glob edge: every export counts as used.
    All,
    /// Reached only through edges naming specific symbols.
    Names(AHashSet<String>),
}

impl ReachableExports {
    fn names_mut(&mut self) -> Option<&mut AHashSet<String>> {
        match self {
            ReachableExports::Names(set) => Some(set),
            ReachableExports::All => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Reachability {
    pub reachable_files: AHashSet<usize>,
    pub reachable_exports: AHashMap<usize, ReachableExports>,
}

impl Reachability {
    pub fn is_file_reachable(&self, file_id: usize) -> bool {
        self.reachable_files.contains(&file_id)
    }

    /// Whether a specific export of `file_id` (by name, `"default"` for the
    /// default export when it carries no other name) was reached.
    pub fn is_export_reachable(&self, file_id: usize, export_name: &str) -> bool {
        match self.reachable_exports.get(&file_id) {
            Some(ReachableExports::All) => true,
            Some(ReachableExports::Names(names)) => names.contains(export_name),
            None => false,
        }
    }
}

/// Runs the full BFS from scratch over every node in `graph`, starting the
/// frontier at `entries` with `Symbol::Namespace` (an entry point's whole
/// module, and everything it exports, is reachable by definition).
pub fn compute(graph: &ModuleGraph, entries: &EntryPoints) -> Reachability {
    let mut result = Reachability::default();
    let mut visited: AHashSet<(usize, Symbol)> = AHashSet::default();

    let mut frontier: Vec<(usize, Symbol)> =
        entries.files.iter().map(|&id| (id, Symbol::Namespace)).collect();

    const MAX_ITERATIONS: usize = 1_000_000;
    for _ in 0..MAX_ITERATIONS {
        if frontier.is_empty() {
            break;
        }

        for (file_id, symbol) in &frontier {
            result.reachable_files.insert(*file_id);
            mark_export(&mut result.reachable_exports, *file_id, symbol, graph);
        }

        let mut from_files: Vec<usize> = frontier.iter().map(|(f, _)| *f).collect();
        from_files.sort_unstable();
        from_files.dedup();

        let mut next_frontier: Vec<(usize, Symbol)> = Vec::new();
        for file_id in from_files {
            let Some(node) = graph.nodes.get(file_id) else { continue };
            for edge in &node.outgoing {
                let key = (edge.to_file, edge.symbol.clone());
                if visited.contains(&key) {
                    continue;
                }
                next_frontier.push(key);
            }
        }

        for (file_id, symbol) in &frontier {
            visited.insert((*file_id, symbol.clone()));
        }

        next_frontier.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| format!("{:?}", a.1).cmp(&format!("{:?}", b.1))));
        next_frontier.dedup();
        frontier = next_frontier;
    }

    result
}

fn mark_export(
    reachable_exports: &mut AHashMap<usize, ReachableExports>,
    file_id: usize,
    symbol: &Symbol,
    graph: &ModuleGraph,
) {
    match symbol {
        Symbol::Namespace => {
            reachable_exports.insert(file_id, ReachableExports::All);
        }
        Symbol::Default => {
            let entry = reachable_exports
                .entry(file_id)
                .or_insert_with(|| ReachableExports::Names(AHashSet::default()));
            if let Some(names) = entry.names_mut() {
                let name = graph
                    .nodes
                    .get(file_id)
                    .and_then(|n| n.source.parse_result.exports.iter().find(|e| e.is_default))
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| "default".to_string());
                names.insert(name);
            }
        }
        Symbol::Named(name) => {
            let entry = reachable_exports
                .entry(file_id)
                .or_insert_with(|| ReachableExports::Names(AHashSet::default()));
            if let Some(names) = entry.names_mut() {
                names.insert(name.clone());
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::ModuleGraph;
    use source_model::Language;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn entries_for(ids: &[usize]) -> EntryPoints {
        EntryPoints { files: ids.iter().copied().collect::<BTreeSet<_>>(), reasons: Vec::new() }
    }

    #[test]
    fn reaches_transitive_import_chain() {
        let a = ast_parser::parse(Language::TypeScript, "/repo/src/a.ts", "import { b } from './b';\n");
        let b = ast_parser::parse(
            Language::TypeScript,
            "/repo/src/b.ts",
            "import { c } from './c';\nexport function b() { return c(); }\n",
        );
        let c = ast_parser::parse(Language::TypeScript, "/repo/src/c.ts", "export function c() { return 1; }\n");

        let sources = vec![
            source_model::SourceFile { path: "/repo/src/a.ts".into(), language: Language::TypeScript, bytes: 0, line_count: 0, parse_result: a },
            source_model::SourceFile { path: "/repo/src/b.ts".into(), language: Language::TypeScript, bytes: 0, line_count: 0, parse_result: b },
            source_model::SourceFile { path: "/repo/src/c.ts".into(), language: Language::TypeScript, bytes: 0, line_count: 0, parse_result: c },
        ];
        let mut diagnostics = Vec::new();
        let root = PathBuf::from("/repo");
        let graph = ModuleGraph::build(&root, sources, &mut diagnostics);

        let a_id = graph.node_id("src/a.ts").unwrap();
        let b_id = graph.node_id("src/b.ts").unwrap();
        let c_id = graph.node_id("src/c.ts").unwrap();

        let reach = compute(&graph, &entries_for(&[a_id]));
        assert!(reach.is_file_reachable(b_id));
        assert!(reach.is_file_reachable(c_id));
        assert!(reach.is_export_reachable(c_id, "c"));
    }

    #[test]
    fn unreached_export_stays_unreached() {
        let a = ast_parser::parse(Language::TypeScript, "/repo/src/a.ts", "import { used } from './b';\n");
        let b = ast_parser::parse(
            Language::TypeScript,
            "/repo/src/b.ts",
            "export function used() { return 1; }\nexport function unused() { return 2; }\n",
        );
        let sources = vec![
            source_model::SourceFile { path: "/repo/src/a.ts".into(), language: Language::TypeScript, bytes: 0, line_count: 0, parse_result: a },
            source_model::SourceFile { path: "/repo/src/b.ts".into(), language: Language::TypeScript, bytes: 0, line_count: 0, parse_result: b },
        ];
        let mut diagnostics = Vec::new();
        let root = PathBuf::from("/repo");
        let graph = ModuleGraph::build(&root, sources, &mut diagnostics);
        let a_id = graph.node_id("src/a.ts").unwrap();
        let b_id = graph.node_id("src/b.ts").unwrap();

        let reach = compute(&graph, &entries_for(&[a_id]));
        assert!(reach.is_file_reachable(b_id));
        assert!(reach.is_export_reachable(b_id, "used"));
        assert!(!reach.is_export_reachable(b_id, "unused"));
    }
}
