//! `FileWalker`: walks a project root, classifies every entry, and
//! hands back source files ready for the `ParserBank`, alongside the
//! manifest/config paths the `EntryPointFinder` needs and any
//! `.deadcodeignore` files discovered along the way.
//!
//! An `ignore::WalkParallel` feeds each entry through an mpsc channel into
//! a single collector thread, classifying every file as a recognized
//! source (any language `language_router` knows) or a manifest/bundler/CI
//! file the entry-point finder wants.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use ignore::overrides::OverrideBuilder;
use ignore::DirEntry;
use path_slash::PathExt;

use language_router::{route, Language, ParserTier};

use crate::config::{AnalysisConfig, IGNORE_FILENAME};
use crate::error::Diagnostic;
use crate::ignore_file::IgnoreFile;
use crate::CancelToken;

pub struct WalkedSource {
    pub path: PathBuf,
    pub language: Language,
    pub tier: ParserTier,
    pub content: String,
}

/// Filenames the `EntryPointFinder` inspects directly rather than routing
/// through the language parser bank.
const MANIFEST_FILENAMES: &[&str] = &[
    "package.json",
    "pyproject.toml",
    "setup.py",
    "setup.cfg",
    "Cargo.toml",
    "go.mod",
    "tsconfig.json",
    "jsconfig.json",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "Procfile",
];

const MANIFEST_DIRS: &[&str] = &[".github/workflows", ".gitlab-ci.yml", ".circleci"];

pub struct WalkOutput {
    pub sources: Vec<WalkedSource>,
    pub ignore_files: Vec<IgnoreFile>,
    pub manifest_paths: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

enum WalkedEntry {
    Source(WalkedSource),
    Manifest(PathBuf),
    Ignore(IgnoreFile),
    Diagnostic(Diagnostic),
}

/// Walks `root`, returning every recognized source file, manifest path,
/// and `.deadcodeignore` file beneath it. Never fails on a per-file basis:
/// unreadable or oversized files are skipped and recorded as
/// `Diagnostic::IoError` rather than aborting the run.
pub fn walk_project(root: &Path, config: &AnalysisConfig, cancel: &CancelToken) -> anyhow::Result<WalkOutput> {
    let (tx, rx) = std::sync::mpsc::channel::<WalkedEntry>();
    let mut collected = Vec::new();
    let collected_ref = &mut collected;

    std::thread::scope(|scope| {
        let collector = scope.spawn(move || {
            for entry in rx {
                collected_ref.push(entry);
            }
        });

        let walk = build_walk(root, config)?;
        walk.run(|| {
            let tx = tx.clone();
            let config = config;
            let cancel = cancel.clone();
            Box::new(move |result| -> ignore::WalkState {
                // cooperative cancel signal, checked between files
                if cancel.is_cancelled() {
                    return ignore::WalkState::Quit;
                }
                match result {
                    Ok(entry) => {
                        if let Some(walked) = visit_entry(&entry, root, config) {
                            let _ = tx.send(walked);
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(WalkedEntry::Diagnostic(Diagnostic::IoError {
                            path: root.display().to_string(),
                            reason: e.to_string(),
                        }));
                    }
                }
                ignore::WalkState::Continue
            })
        });

        drop(tx);
        collector.join().expect("walk collector thread panicked");
        anyhow::Ok(())
    })?;

    let mut sources = Vec::new();
    let mut ignore_files = Vec::new();
    let mut manifest_paths = Vec::new();
    let mut diagnostics = Vec::new();
    for entry in collected {
        match entry {
            WalkedEntry::Source(s) => sources.push(s),
            WalkedEntry::Manifest(p) => manifest_paths.push(p),
            WalkedEntry::Ignore(f) => ignore_files.push(f),
            WalkedEntry::Diagnostic(d) => diagnostics.push(d),
        }
    }

    Ok(WalkOutput {
        sources,
        ignore_files,
        manifest_paths,
        diagnostics,
    })
}

fn build_walk(root: &Path, config: &AnalysisConfig) -> anyhow::Result<ignore::WalkParallel> {
    let mut override_builder = OverrideBuilder::new(root);
    override_builder.add("*").expect("permit-all glob is always valid");
    for pattern in &config.ignore_patterns {
        let inverted = format!("!{}", pattern);
        // malformed user-supplied globs were already rejected at config
        // compile time; builtin defaults are tested below.
        let _ = override_builder.add(&inverted);
    }
    let overrides = override_builder.build()?;

    // `hidden(false)` so nested `.deadcodeignore` files and dotted
    // directories like `.github/workflows` are visited; `.git` itself is
    // still excluded via `DEFAULT_IGNORE_PATTERNS`.
    let mut walk_builder = ignore::WalkBuilder::new(root);
    walk_builder.standard_filters(false).hidden(false);
    if !overrides.is_empty() {
        walk_builder.overrides(overrides);
    }
    Ok(walk_builder.build_parallel())
}

fn visit_entry(entry: &DirEntry, root: &Path, config: &AnalysisConfig) -> Option<WalkedEntry> {
    let path = entry.path();
    if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
        return None;
    }
    let file_name = entry.file_name();

    if equals_os_str(file_name, IGNORE_FILENAME) {
        return IgnoreFile::read(path.to_path_buf()).ok().map(WalkedEntry::Ignore);
    }

    let rel_slash = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_slash_lossy()
        .to_string();

    if is_manifest_filename(file_name) || is_manifest_path(&rel_slash) {
        return Some(WalkedEntry::Manifest(path.to_path_buf()));
    }

    let (language, tier) = route(&rel_slash)?;

    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > config.max_file_bytes => {
            return Some(WalkedEntry::Diagnostic(Diagnostic::IoError {
                path: rel_slash,
                reason: format!("file exceeds max_file_bytes ({} bytes)", meta.len()),
            }));
        }
        Err(e) => {
            return Some(WalkedEntry::Diagnostic(Diagnostic::IoError {
                path: rel_slash,
                reason: e.to_string(),
            }));
        }
        _ => {}
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Some(WalkedEntry::Source(WalkedSource {
            path: path.to_path_buf(),
            language,
            tier,
            content,
        })),
        Err(e) => Some(WalkedEntry::Diagnostic(Diagnostic::IoError {
            path: rel_slash,
            reason: e.to_string(),
        })),
    }
}

/// Re-reads and re-routes a single file without a full tree walk, for
/// `Analyzer::mark_dirty`'s incremental refresh. Returns `None` for a path
/// that no longer routes to a recognized language (treated as removed by
/// the caller).
pub fn reread_one(root: &Path, path: &Path, config: &AnalysisConfig) -> anyhow::Result<Option<WalkedSource>> {
    let rel_slash = path.strip_prefix(root).unwrap_or(path).to_slash_lossy().to_string();
    let Some((language, tier)) = route(&rel_slash) else { return Ok(None) };
    let meta = std::fs::metadata(path)?;
    if meta.len() > config.max_file_bytes {
        anyhow::bail!("file exceeds max_file_bytes ({} bytes)", meta.len());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(WalkedSource { path: path.to_path_buf(), language, tier, content }))
}

fn is_manifest_filename(name: &OsStr) -> bool {
    MANIFEST_FILENAMES.iter().any(|m| equals_os_str(name, m))
}

fn is_manifest_path(rel_slash: &str) -> bool {
    MANIFEST_DIRS.iter().any(|d| rel_slash.contains(d))
}

fn equals_os_str(s: &OsStr, t: &str) -> bool {
    s.as_bytes() == t.as_bytes()
}

#[cfg(test)]
mod test {
    use super::*;
    use test_tmpdir::test_tmpdir;

    #[test]
    fn walks_source_files_and_respects_ignore_globs() {
        let tmpdir = test_tmpdir!(
            "src/index.ts" => "export const a = 1;\n",
            "node_modules/dep/index.js" => "module.exports = {};\n",
            "src/main.py" => "def main():\n    pass\n"
        );
        let config = AnalysisConfig::default();
        let output = walk_project(tmpdir.root(), &config, &CancelToken::new()).unwrap();

        assert!(output.sources.iter().any(|s| s.path.ends_with("src/index.ts")));
        assert!(output.sources.iter().any(|s| s.path.ends_with("src/main.py")));
        assert!(!output.sources.iter().any(|s| s.path.to_string_lossy().contains("node_modules")));
    }

    #[test]
    fn discovers_root_ignore_file_and_manifests() {
        let tmpdir = test_tmpdir!(
            ".deadcodeignore" => "src/ignored.ts\n",
            "package.json" => "{\"name\": \"x\"}",
            "src/ignored.ts" => "export const z = 1;\n"
        );
        let config = AnalysisConfig::default();
        let output = walk_project(tmpdir.root(), &config, &CancelToken::new()).unwrap();

        assert!(output.ignore_files.iter().any(|f| f.path == tmpdir.root()));
        assert!(output.manifest_paths.iter().any(|p| p.ends_with("package.json")));
    }
}
