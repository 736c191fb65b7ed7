//! `VerdictAssigner`: turns file/export reachability into a
//! confidence-scored `fileStatus` per file, weighing entry/test/ignored
//! tags, `allow_unused_types`, dynamic-pattern matches, and config-file
//! references as independent pieces of evidence.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::entry_points::{EntryPoints, EntryReason};
use crate::graph::ModuleGraph;
use crate::reachability::Reachability;
use source_model::ExportKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    Unreachable,
    PossiblyLive,
    PartiallyUnreachable,
    Live,
}

/// One piece of evidence that moved a file's confidence, kept in
/// provenance order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceEntry {
    pub check: String,
    pub detail: Option<String>,
    pub delta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportVerdict {
    pub name: String,
    pub line: u32,
    pub reachable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileVerdict {
    pub file_id: usize,
    pub path: String,
    pub status: FileStatus,
    pub confidence: f64,
    pub evidence: Vec<EvidenceEntry>,
    /// Only populated for `PartiallyUnreachable` — the exports that are
    /// themselves dead.
    pub dead_exports: Vec<ExportVerdict>,
    pub excluded: bool,
}

/// Edge-case exclusions that short-circuit verdict scoring entirely
/// rather than contributing evidence.
fn excluded_reason(node: &crate::graph::ModuleNode, config: &AnalysisConfig) -> Option<&'static str> {
    if node.source.language == source_model::Language::Types {
        return Some("types-only file");
    }
    if node.source.parse_result.metadata.parse_error.is_some() {
        return Some("parse error");
    }
    if config.is_generated(&node.path) {
        return Some("generated file");
    }
    if node.source.bytes == 0 {
        return Some("zero-byte file");
    }
    None
}

pub fn assign_verdicts(
    graph: &ModuleGraph,
    entries: &EntryPoints,
    reach: &Reachability,
    config: &AnalysisConfig,
    config_file_text: &ConfigFileText,
) -> Vec<FileVerdict> {
    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(id, node)| assign_one(id, node, entries, reach, config, config_file_text))
        .collect()
}

/// The concatenated text of every config file the "referenced in config
/// files" evidence check searches (`tsconfig*.json`, `jest.config.*`,
/// etc.) — read once up front rather than per candidate file, since the
/// same handful of manifests get searched for every unreachable file's
/// basename.
#[derive(Debug, Clone, Default)]
pub struct ConfigFileText(String);

impl ConfigFileText {
    /// Reads every manifest path the walker collected — the same
    /// manifest/bundler/CI file set doubles as the config-file search
    /// set, since both need "files the project's tooling references by
    /// name" and the walker has already found them.
    pub fn load(manifest_paths: &[std::path::PathBuf]) -> Self {
        let mut combined = String::new();
        for path in manifest_paths {
            if let Ok(text) = std::fs::read_to_string(path) {
                combined.push_str(&text);
                combined.push('\n');
            }
        }
        ConfigFileText(combined)
    }

    fn mentions(&self, basename: &str) -> bool {
        !basename.is_empty() && self.0.contains(basename)
    }
}

fn assign_one(
    id: usize,
    node: &crate::graph::ModuleNode,
    entries: &EntryPoints,
    reach: &Reachability,
    config: &AnalysisConfig,
    config_file_text: &ConfigFileText,
) -> FileVerdict {
    // test files are always excluded from the dead set regardless of
    // reachability: they are themselves entry points.
    let is_test = config.is_test_path(&node.path) || node.source.parse_result.metadata.is_test_file;

    if let Some(reason) = excluded_reason(node, config) {
        return FileVerdict {
            file_id: id,
            path: node.path.clone(),
            status: FileStatus::Unreachable,
            confidence: 0.0,
            evidence: vec![EvidenceEntry { check: "excluded".to_string(), detail: Some(reason.to_string()), delta: 0.0 }],
            dead_exports: Vec::new(),
            excluded: true,
        };
    }

    if reach.is_file_reachable(id) {
        let dead_exports = dead_exports_of(id, node, reach, config);
        let status = if dead_exports.is_empty() { FileStatus::Live } else { FileStatus::PartiallyUnreachable };
        return FileVerdict {
            file_id: id,
            path: node.path.clone(),
            status,
            confidence: 1.0,
            evidence: vec![EvidenceEntry { check: "entryPointClosure".to_string(), detail: None, delta: 0.0 }],
            dead_exports,
            excluded: false,
        };
    }

    if is_test {
        return FileVerdict {
            file_id: id,
            path: node.path.clone(),
            status: FileStatus::Live,
            confidence: 1.0,
            evidence: vec![EvidenceEntry { check: "testFile".to_string(), detail: None, delta: 0.0 }],
            dead_exports: Vec::new(),
            excluded: false,
        };
    }

    let mut status = FileStatus::Unreachable;
    let mut confidence: f64 = 0.9;
    let mut evidence = vec![EvidenceEntry { check: "entryPointsTested".to_string(), detail: None, delta: 0.0 }];

    if let Some(pattern) = config.matched_dynamic_pattern(&node.path) {
        status = FileStatus::PossiblyLive;
        confidence = confidence.min(0.4);
        evidence.push(EvidenceEntry {
            check: "dynamicCheck.matchedPattern".to_string(),
            detail: Some(pattern),
            delta: -0.5,
        });
    }

    let has_framework_annotation = node
        .source
        .parse_result
        .annotations
        .iter()
        .any(|a| config.di_decorators.iter().any(|d| d == &a.name));
    let caught_by_entry_point = entries
        .reasons
        .iter()
        .any(|(fid, reason)| *fid == id && *reason == EntryReason::FrameworkAnnotation);
    if has_framework_annotation && !caught_by_entry_point && status == FileStatus::Unreachable {
        status = FileStatus::PossiblyLive;
        confidence = confidence.min(0.5);
        evidence.push(EvidenceEntry {
            check: "frameworkFileByAnnotation".to_string(),
            detail: None,
            delta: -0.4,
        });
    }

    if status == FileStatus::Unreachable {
        if let Some(basename) = basename_stem(&node.path) {
            if config_file_text.mentions(&basename) {
                status = FileStatus::PossiblyLive;
                confidence = confidence.min(0.5);
                evidence.push(EvidenceEntry {
                    check: "referencedInConfigFiles".to_string(),
                    detail: Some(basename),
                    delta: -0.4,
                });
            }
        }
    }

    FileVerdict {
        file_id: id,
        path: node.path.clone(),
        status,
        confidence: confidence.clamp(0.0, 1.0),
        evidence,
        dead_exports: Vec::new(),
        excluded: false,
    }
}

fn dead_exports_of(
    id: usize,
    node: &crate::graph::ModuleNode,
    reach: &Reachability,
    config: &AnalysisConfig,
) -> Vec<ExportVerdict> {
    node.source
        .parse_result
        .exports
        .iter()
        .filter(|e| !e.allow_unused)
        .filter(|e| !(config.allow_unused_types && e.is_type_only))
        .filter(|e| !matches!(e.kind, ExportKind::ReexportAll))
        .filter(|e| !reach.is_export_reachable(id, &e.name))
        .map(|e| ExportVerdict { name: e.name.clone(), line: e.line, reachable: false })
        .collect()
}

fn basename_stem(path: &str) -> Option<String> {
    let base = path.rsplit('/').next()?;
    base.split('.').next().map(str::to_string)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entry_points::find_entry_points;
    use crate::graph::ModuleGraph;
    use crate::reachability;
    use source_model::Language;
    use std::path::PathBuf;

    fn build(files: &[(&str, &str)]) -> (ModuleGraph, EntryPoints, Reachability, AnalysisConfig) {
        let root = PathBuf::from("/repo");
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
        (graph, entries, reach, config)
    }

    #[test]
    fn unreached_file_is_unreachable_with_base_confidence() {
        let (graph, entries, reach, config) = build(&[
            ("a.ts", "function main() { return 1; }\n"),
            ("d.ts", "export function bar() { return 1; }\n"),
        ]);
        let verdicts = assign_verdicts(&graph, &entries, &reach, &config, &ConfigFileText::default());
        let d = verdicts.iter().find(|v| v.path.ends_with("d.ts")).unwrap();
        assert_eq!(d.status, FileStatus::Unreachable);
        assert!((d.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn dynamic_pattern_match_rescues_to_possibly_live() {
        let (graph, entries, reach, mut config) = build(&[("plugins/p1.ts", "export default class P {}\n")]);
        config = AnalysisConfig::try_from(crate::config::AnalysisJsonConfig {
            dynamic_patterns: vec!["plugins/*.ts".to_string()],
            ..Default::default()
        })
        .unwrap();
        let verdicts = assign_verdicts(&graph, &entries, &reach, &config, &ConfigFileText::default());
        let p = verdicts.iter().find(|v| v.path.ends_with("p1.ts")).unwrap();
        assert_eq!(p.status, FileStatus::PossiblyLive);
        assert!(p.confidence <= 0.4);
    }

    #[test]
    fn reachable_file_with_unreachable_export_is_partially_unreachable() {
        let (graph, entries, reach, config) = build(&[
            ("a.ts", "import { used } from './b';\nfunction main() {}\n"),
            ("b.ts", "export function used() { return 1; }\nexport function unused() { return 2; }\n"),
        ]);
        let verdicts = assign_verdicts(&graph, &entries, &reach, &config, &ConfigFileText::default());
        let b = verdicts.iter().find(|v| v.path.ends_with("b.ts")).unwrap();
        assert_eq!(b.status, FileStatus::PartiallyUnreachable);
        assert_eq!(b.dead_exports.len(), 1);
        assert_eq!(b.dead_exports[0].name, "unused");
    }

    #[test]
    fn basename_mentioned_in_a_config_file_rescues_to_possibly_live() {
        let (graph, entries, reach, config) =
            build(&[("legacyWidget.ts", "export default class LegacyWidget {}\n")]);
        let config_text = ConfigFileText("entries: ['legacyWidget']".to_string());
        let verdicts = assign_verdicts(&graph, &entries, &reach, &config, &config_text);
        let w = verdicts.iter().find(|v| v.path.ends_with("legacyWidget.ts")).unwrap();
        assert_eq!(w.status, FileStatus::PossiblyLive);
        assert!(w.confidence <= 0.5);
    }
}
