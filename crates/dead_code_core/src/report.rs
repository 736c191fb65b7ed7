//! Folds verdicts, the graph, and diagnostics into one order-stable
//! `AnalysisReport` — a plain `Serialize` value handed back to callers,
//! who format or emit it however they like; this module never writes
//! anything itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entry_points::EntryPoints;
use crate::error::Diagnostic;
use crate::graph::ModuleGraph;
use crate::reachability::Reachability;
use crate::verdict::{assign_verdicts, ConfigFileText, ExportVerdict, FileStatus, FileVerdict};
use crate::AnalysisConfig;
use source_model::Language;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadFileEntry {
    pub path: String,
    pub language: Language,
    pub bytes: u64,
    pub lines: u32,
    pub status: FileStatus,
    pub confidence: f64,
    pub evidence: Vec<crate::verdict::EvidenceEntry>,
    pub dead_exports: Vec<ExportVerdict>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadFunctionEntry {
    pub path: String,
    pub name: String,
    pub line: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_files: usize,
    pub total_bytes: u64,
    pub files_per_language: BTreeMap<Language, usize>,
    pub entry_point_count: usize,
    pub reachable_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub totals: Totals,
    pub dead_files: Vec<DeadFileEntry>,
    pub dead_functions: Vec<DeadFunctionEntry>,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when a cancel signal fires mid-analysis: the report carries
    /// whatever data was finished rather than failing outright.
    pub cancelled: bool,
}

/// Languages trusted for top-level function capture: conservative, and
/// only reported where top-level function capture is reliable — the JS
/// family, Python, Go, Rust.
fn reports_dead_functions(language: Language) -> bool {
    matches!(
        language,
        Language::JavaScript
            | Language::TypeScript
            | Language::Jsx
            | Language::Tsx
            | Language::Python
            | Language::Go
            | Language::Rust
    )
}

pub fn assemble(
    graph: &ModuleGraph,
    entries: &EntryPoints,
    reach: &Reachability,
    config: &AnalysisConfig,
    manifest_paths: &[std::path::PathBuf],
    mut diagnostics: Vec<Diagnostic>,
    cancelled: bool,
) -> AnalysisReport {
    let config_file_text = ConfigFileText::load(manifest_paths);
    let verdicts = assign_verdicts(graph, entries, reach, config, &config_file_text);

    let mut files_per_language: BTreeMap<Language, usize> = BTreeMap::new();
    let mut total_bytes = 0u64;
    for node in &graph.nodes {
        *files_per_language.entry(node.source.language).or_insert(0) += 1;
        total_bytes += node.source.bytes;
    }

    let totals = Totals {
        total_files: graph.nodes.len(),
        total_bytes,
        files_per_language,
        entry_point_count: entries.files.len(),
        reachable_count: reach.reachable_files.len(),
    };

    let mut dead_files: Vec<DeadFileEntry> = verdicts
        .iter()
        .filter(|v| !v.excluded)
        .filter(|v| matches!(v.status, FileStatus::Unreachable | FileStatus::PartiallyUnreachable))
        .map(|v| {
            let node = &graph.nodes[v.file_id];
            DeadFileEntry {
                path: v.path.clone(),
                language: node.source.language,
                bytes: node.source.bytes,
                lines: node.source.line_count,
                status: v.status,
                confidence: v.confidence,
                evidence: v.evidence.clone(),
                dead_exports: v.dead_exports.clone(),
            }
        })
        .collect();
    dead_files.sort_by(|a, b| a.language.cmp(&b.language).then_with(|| a.path.cmp(&b.path)));

    let mut dead_functions: Vec<DeadFunctionEntry> = Vec::new();
    for verdict in &verdicts {
        if verdict.excluded || verdict.status != FileStatus::Live {
            continue;
        }
        let node = &graph.nodes[verdict.file_id];
        if !reports_dead_functions(node.source.language) {
            continue;
        }
        let exported_names: std::collections::HashSet<&str> =
            node.source.parse_result.exports.iter().map(|e| e.name.as_str()).collect();
        let named_import_targets: std::collections::HashSet<&str> = node
            .outgoing
            .iter()
            .filter_map(|e| match &e.symbol {
                crate::graph::Symbol::Named(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        for decl in &node.source.parse_result.declarations {
            if !matches!(decl.kind, source_model::DeclarationKind::Function) {
                continue;
            }
            if exported_names.contains(decl.name.as_str()) {
                continue;
            }
            if named_import_targets.contains(decl.name.as_str()) {
                continue;
            }
            dead_functions.push(DeadFunctionEntry { path: node.path.clone(), name: decl.name.clone(), line: decl.line });
        }
    }
    dead_functions.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.line.cmp(&b.line)));

    diagnostics.sort_by(|a, b| format!("{a:?}").cmp(&format!("{b:?}")));

    AnalysisReport { totals, dead_files, dead_functions, diagnostics, cancelled }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entry_points::find_entry_points;
    use crate::reachability;
    use std::path::PathBuf;

    #[test]
    fn linear_chain_flags_the_unreferenced_tail_file() {
        let root = PathBuf::from("/repo");
        let files = [
            ("a.ts", "import './b';\nfunction main() {}\n"),
            ("b.ts", "import './c';\n"),
            ("c.ts", "export function foo() { return 1; }\n"),
            ("d.ts", "export function bar() { return 1; }\n"),
        ];
        let sources = files
            .iter()
            .map(|(path, content)| {
                let full = format!("/repo/{path}");
                let parsed = ast_parser::parse(Language::TypeScript, &full, content);
                source_model::SourceFile {
                    path: full,
                    language: Language::TypeScript,
                    bytes: content.len() as u64,
                    line_count: content.lines().count() as u32,
                    parse_result: parsed,
                }
            })
            .collect::<Vec<_>>();
        let mut diagnostics = Vec::new();
        let graph = ModuleGraph::build(&root, sources, &mut diagnostics);
        let config = AnalysisConfig::default();
        let entries = find_entry_points(&root, &graph, &[], &config);
        let reach = reachability::compute(&graph, &entries);
        let report = assemble(&graph, &entries, &reach, &config, &[], diagnostics, false);

        assert_eq!(report.dead_files.len(), 1);
        assert_eq!(report.dead_files[0].path, "/repo/d.ts");
        assert_eq!(report.totals.reachable_count, 3);
    }
}
