//! A whole-project dead-code and unreachable-export analyzer for
//! multi-language repositories.
//!
//! The public entry point is [`analyze`], which runs the full pipeline:
//! walk, parse, resolve, build the module graph, seed entry points, run
//! reachability, assign verdicts, assemble the report.
//!
//! [`Analyzer`] additionally exposes an incremental-rescan mechanism
//! (`mark_dirty`/`mark_all_dirty`) for a caller that knows only a handful
//! of files changed, so it can avoid re-walking and re-parsing the whole
//! tree.

pub mod config;
pub mod entry_points;
pub mod error;
pub mod graph;
pub mod ignore_file;
pub mod parser_bank;
pub mod reachability;
pub mod report;
pub mod resolver;
pub mod verdict;
pub mod walker;

pub use config::{AnalysisConfig, AnalysisJsonConfig, ConfigError};
pub use error::{AnalysisError, Diagnostic};
pub use report::AnalysisReport;
pub use verdict::FileStatus;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ahashmap::AHashMap;
use logger::Logger;

use crate::graph::ModuleGraph;
use crate::ignore_file::IgnoreFile;
use source_model::SourceFile;

/// A cooperative cancel signal, checked between files in the walker,
/// between parses in the worker pool, and at the start of resolution and
/// reachability. Cloning shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One-shot analysis of `root` under `config`, with no incremental state
/// kept afterwards. Prefer [`Analyzer`] when the caller will call this more
/// than once against the same tree.
pub fn analyze(root: &Path, config: &AnalysisConfig, logger: impl Logger + Sync) -> anyhow::Result<AnalysisReport> {
    analyze_cancellable(root, config, logger, &CancelToken::new())
}

pub fn analyze_cancellable(
    root: &Path,
    config: &AnalysisConfig,
    logger: impl Logger + Sync,
    cancel: &CancelToken,
) -> anyhow::Result<AnalysisReport> {
    if !root.is_dir() {
        return Err(AnalysisError::ProjectNotFound(root.to_path_buf()).into());
    }

    logger.log(format!("walking project at {}", root.display()));
    let walk = walker::walk_project(root, config, cancel)?;
    if cancel.is_cancelled() {
        return Ok(partial_cancelled_report(walk.diagnostics));
    }

    logger.log(format!("parsing {} files", walk.sources.len()));
    let (parsed, mut diagnostics) = parser_bank::parse_all(walk.sources, config);
    diagnostics.extend(walk.diagnostics);
    if cancel.is_cancelled() {
        return Ok(partial_cancelled_report(diagnostics));
    }

    let sources: Vec<SourceFile> = parsed.into_iter().map(|p| p.source).collect();
    logger.log("building module graph");
    let graph = ModuleGraph::build(root, sources, &mut diagnostics);
    if cancel.is_cancelled() {
        return Ok(partial_cancelled_report(diagnostics));
    }

    logger.log("finding entry points");
    let entries = entry_points::find_entry_points(root, &graph, &walk.manifest_paths, config);

    logger.log("computing reachability");
    let reach = reachability::compute(&graph, &entries);

    let mut report = report::assemble(&graph, &entries, &reach, config, &walk.manifest_paths, diagnostics, false);
    apply_ignore_files(root, &walk.ignore_files, &mut report);
    Ok(report)
}

fn partial_cancelled_report(diagnostics: Vec<Diagnostic>) -> AnalysisReport {
    AnalysisReport { diagnostics, cancelled: true, ..Default::default() }
}

/// `.deadcodeignore` entries suppress a path from the dead-file list
/// independent of reachability, applied as a final filter after verdict
/// assignment.
fn apply_ignore_files(root: &Path, ignore_files: &[IgnoreFile], report: &mut AnalysisReport) {
    if ignore_files.is_empty() {
        return;
    }
    report.dead_files.retain(|entry| {
        let absolute = root.join(&entry.path);
        !ignore_files.iter().any(|f| f.is_ignored(&absolute))
    });
}

#[derive(Debug)]
enum DirtyFiles {
    All,
    Some(BTreeSet<PathBuf>),
}

/// Holds the last completed walk/parse so a caller can re-run analysis
/// after only a handful of files changed, without re-walking and
/// re-parsing the whole tree.
pub struct Analyzer {
    root: PathBuf,
    config: AnalysisConfig,
    dirty: DirtyFiles,
    last_sources: AHashMap<String, SourceFile>,
    last_ignore_files: Vec<IgnoreFile>,
    last_manifest_paths: Vec<PathBuf>,
}

impl Analyzer {
    pub fn new(root: impl Into<PathBuf>, config: AnalysisConfig) -> Self {
        Self {
            root: root.into(),
            config,
            dirty: DirtyFiles::All,
            last_sources: AHashMap::default(),
            last_ignore_files: Vec::new(),
            last_manifest_paths: Vec::new(),
        }
    }

    /// Marks specific files as changed since the last `run`. A path the
    /// analyzer hasn't seen before (a new file) forces a full rewalk,
    /// since its presence can change entry points or manifest contents.
    pub fn mark_dirty(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        if matches!(self.dirty, DirtyFiles::All) {
            return;
        }
        let mut unseen = false;
        let mut incoming = BTreeSet::new();
        for path in paths {
            if !self.last_sources.contains_key(&path.display().to_string()) {
                unseen = true;
            }
            incoming.insert(path);
        }
        if unseen {
            self.dirty = DirtyFiles::All;
            return;
        }
        match &mut self.dirty {
            DirtyFiles::Some(set) => set.extend(incoming),
            DirtyFiles::All => unreachable!(),
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty = DirtyFiles::All;
    }

    pub fn run(&mut self, logger: impl Logger + Sync) -> anyhow::Result<AnalysisReport> {
        self.refresh(&logger)?;

        let sources: Vec<SourceFile> = self.last_sources.values().cloned().collect();
        let mut diagnostics = Vec::new();
        let graph = ModuleGraph::build(&self.root, sources, &mut diagnostics);
        let entries = entry_points::find_entry_points(&self.root, &graph, &self.last_manifest_paths, &self.config);
        let reach = reachability::compute(&graph, &entries);
        let mut report = report::assemble(
            &graph,
            &entries,
            &reach,
            &self.config,
            &self.last_manifest_paths,
            diagnostics,
            false,
        );
        apply_ignore_files(&self.root, &self.last_ignore_files, &mut report);
        Ok(report)
    }

    fn refresh(&mut self, logger: &impl Logger) -> anyhow::Result<()> {
        match std::mem::replace(&mut self.dirty, DirtyFiles::Some(BTreeSet::new())) {
            DirtyFiles::All => {
                if !self.root.is_dir() {
                    return Err(AnalysisError::ProjectNotFound(self.root.clone()).into());
                }
                logger.log("refreshing all files");
                let walk = walker::walk_project(&self.root, &self.config, &CancelToken::new())?;
                let (parsed, _diagnostics) = parser_bank::parse_all(walk.sources, &self.config);
                self.last_sources = parsed
                    .into_iter()
                    .map(|p| {
                        let rel = p.source.path.clone();
                        (rel, p.source)
                    })
                    .collect();
                self.last_ignore_files = walk.ignore_files;
                self.last_manifest_paths = walk.manifest_paths;
            }
            DirtyFiles::Some(paths) => {
                if paths.is_empty() {
                    return Ok(());
                }
                logger.log(format!("refreshing {} dirty files", paths.len()));
                for path in paths {
                    let Some(walked) = walker::reread_one(&self.root, &path, &self.config)? else { continue };
                    let (parsed, _diagnostics) = parser_bank::parse_all(vec![walked], &self.config);
                    for p in parsed {
                        self.last_sources.insert(p.source.path.clone(), p.source);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use logger::StdioLogger;
    use test_tmpdir::test_tmpdir;

    #[test]
    fn barrel_reexport_reaches_the_underlying_file() {
        let tmpdir = test_tmpdir!(
            "package.json" => "{\"main\": \"src/index.ts\"}",
            "src/index.ts" => "export * from './barrel';\n",
            "src/barrel.ts" => "export { helper } from './impl';\n",
            "src/impl.ts" => "export function helper() { return 1; }\nexport function deadHelper() { return 2; }\n"
        );
        let config = AnalysisConfig::default();
        let report = analyze(tmpdir.root(), &config, &StdioLogger::new()).unwrap();

        // impl.ts is reachable (via the re-export chain) but `deadHelper`
        // isn't named by any edge, so the file shows up only as
        // partially-unreachable, with exactly the unreached export listed.
        let impl_file = report
            .dead_files
            .iter()
            .find(|f| f.path.ends_with("impl.ts"))
            .expect("impl.ts should be reported partially-unreachable");
        assert_eq!(impl_file.status, FileStatus::PartiallyUnreachable);
        assert_eq!(impl_file.dead_exports.len(), 1);
        assert_eq!(impl_file.dead_exports[0].name, "deadHelper");
    }

    #[test]
    fn glob_import_marks_every_export_reachable() {
        let tmpdir = test_tmpdir!(
            "package.json" => "{\"main\": \"src/index.ts\"}",
            "src/index.ts" => "import * as util from './util';\nfunction main() { return util; }\n",
            "src/util.ts" => "export function a() { return 1; }\nexport function b() { return 2; }\n"
        );
        let config = AnalysisConfig::default();
        let report = analyze(tmpdir.root(), &config, &StdioLogger::new()).unwrap();

        assert!(report.dead_files.iter().all(|f| !f.path.ends_with("util.ts")));
    }

    #[test]
    fn cyclic_imports_terminate_and_both_files_are_live() {
        let tmpdir = test_tmpdir!(
            "package.json" => "{\"main\": \"src/a.ts\"}",
            "src/a.ts" => "import { b } from './b';\nexport function a() { return b(); }\n",
            "src/b.ts" => "import { a } from './a';\nexport function b() { return a; }\n"
        );
        let config = AnalysisConfig::default();
        let report = analyze(tmpdir.root(), &config, &StdioLogger::new()).unwrap();

        assert!(report.dead_files.is_empty());
        assert_eq!(report.totals.reachable_count, 2);
    }

    #[test]
    fn deadcodeignore_suppresses_a_reported_dead_file() {
        let tmpdir = test_tmpdir!(
            "package.json" => "{\"main\": \"src/a.ts\"}",
            "src/a.ts" => "function main() {}\n",
            "src/vendored.ts" => "export function keep() { return 1; }\n",
            ".deadcodeignore" => "src/vendored.ts\n"
        );
        let config = AnalysisConfig::default();
        let report = analyze(tmpdir.root(), &config, &StdioLogger::new()).unwrap();

        assert!(report.dead_files.iter().all(|f| !f.path.ends_with("vendored.ts")));
    }

    #[test]
    fn nonexistent_root_is_reported_as_project_not_found() {
        let config = AnalysisConfig::default();
        let err = analyze(Path::new("/no/such/project/root"), &config, &StdioLogger::new()).unwrap_err();
        assert!(err.to_string().contains("project root not found"));
    }

    #[test]
    fn analyzer_incremental_refresh_picks_up_a_newly_dead_file() {
        let tmpdir = test_tmpdir!(
            "package.json" => "{\"main\": \"src/a.ts\"}",
            "src/a.ts" => "function main() {}\n"
        );
        let config = AnalysisConfig::default();
        let mut analyzer = Analyzer::new(tmpdir.root(), config);
        let first = analyzer.run(&StdioLogger::new()).unwrap();
        assert!(first.dead_files.is_empty());

        let new_file = tmpdir.root_join("src/unused.ts");
        std::fs::write(&new_file, "export function neverCalled() { return 1; }\n").unwrap();
        analyzer.mark_dirty([new_file]);
        let second = analyzer.run(&StdioLogger::new()).unwrap();
        assert!(second.dead_files.iter().any(|f| f.path.ends_with("unused.ts")));
    }
}
