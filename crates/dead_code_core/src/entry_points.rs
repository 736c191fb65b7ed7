//! `EntryPointFinder`: collects every file the analyzer must treat as a
//! root of reachability, tagged with why. Covers the reasons groundable
//! in parsed data and manifest files, without guessing at build-tool
//! semantics the analyzer can't observe: manifest `main`/`bin`/`exports`
//! fields, bundler configs, test files, framework annotations, DI
//! container calls, dynamic package fields, and a file's own `main`
//! function.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;

use crate::config::AnalysisConfig;
use crate::graph::ModuleGraph;
use crate::resolver::{js, FileIndex};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryReason {
    ManifestMain,
    BundlerConfig,
    TestFile,
    FrameworkAnnotation,
    DiContainerCall,
    DynamicPackageField,
    HasMainFunction,
    UserDynamicPattern,
}

#[derive(Debug, Default)]
pub struct EntryPoints {
    pub files: BTreeSet<usize>,
    pub reasons: Vec<(usize, EntryReason)>,
}

impl EntryPoints {
    fn add(&mut self, file_id: usize, reason: EntryReason) {
        self.files.insert(file_id);
        self.reasons.push((file_id, reason));
    }
}

pub fn find_entry_points(
    root: &Path,
    graph: &ModuleGraph,
    manifest_paths: &[std::path::PathBuf],
    config: &AnalysisConfig,
) -> EntryPoints {
    let mut entries = EntryPoints::default();
    let index = FileIndex::build(root, graph.nodes.iter().map(|n| Path::new(&n.path).to_path_buf()));

    for (id, node) in graph.nodes.iter().enumerate() {
        if node.source.parse_result.metadata.has_main_entry {
            entries.add(id, EntryReason::HasMainFunction);
        }
        if config.is_test_path(&node.path) || node.source.parse_result.metadata.is_test_file {
            entries.add(id, EntryReason::TestFile);
        }
        if is_bundler_config(&node.path, config) {
            entries.add(id, EntryReason::BundlerConfig);
        }
        if has_framework_marker(node) {
            entries.add(id, EntryReason::FrameworkAnnotation);
        }
        for annotation in &node.source.parse_result.annotations {
            if config.di_decorators.iter().any(|d| d == &annotation.name) {
                entries.add(id, EntryReason::FrameworkAnnotation);
            }
        }
        if let Some(pattern) = config.matched_dynamic_pattern(&node.path) {
            let _ = pattern;
            entries.add(id, EntryReason::UserDynamicPattern);
        }
        if matches_di_container_pattern(root, &node.path, config) {
            entries.add(id, EntryReason::DiContainerCall);
        }
    }

    for manifest in manifest_paths {
        match manifest.file_name().and_then(|n| n.to_str()) {
            Some("package.json") => {
                mark_package_json_entries(root, manifest, &index, graph, &mut entries);
                mark_dynamic_package_field_entries(root, manifest, &index, graph, config, &mut entries);
            }
            Some("Cargo.toml") => mark_cargo_toml_entries(root, manifest, graph, &mut entries),
            Some("pyproject.toml") => mark_pyproject_entries(root, manifest, graph, &mut entries),
            Some("setup.py") => mark_setup_py_entries(root, manifest, graph, &mut entries),
            _ => {}
        }
    }

    entries
}

/// Resolves a manifest-relative file path (already known to exist on disk
/// in some form) to its node in the graph, trying the path as given and
/// then with each Rust/Python source extension appended.
fn add_if_known(root: &Path, graph: &ModuleGraph, dir: &Path, relative: &str, reason: EntryReason, entries: &mut EntryPoints) {
    let candidate = dir.join(relative);
    let candidate_rel = candidate.strip_prefix(root).unwrap_or(&candidate).to_string_lossy().replace('\\', "/");
    let tries = [candidate_rel.clone(), format!("{candidate_rel}.rs"), format!("{candidate_rel}.py"), format!("{candidate_rel}/__init__.py")];
    for t in tries {
        if let Some(id) = graph.node_id(&t) {
            entries.add(id, reason.clone());
            return;
        }
    }
}

/// A Rust crate's `[[bin]]`/`[lib]` targets are entry points: `cargo
/// build` links each of them as a standalone artifact, so nothing in the
/// rest of the project needs to import them for them to be "used".
/// Defaults follow Cargo's own convention when `path` is omitted:
/// `src/main.rs` for the implicit binary, `src/lib.rs` for the library,
/// `src/bin/<name>.rs` for a named `[[bin]]` with no explicit `path`.
fn mark_cargo_toml_entries(root: &Path, manifest_path: &Path, graph: &ModuleGraph, entries: &mut EntryPoints) {
    let Ok(content) = std::fs::read_to_string(manifest_path) else { return };
    let Ok(table) = content.parse::<toml::Table>() else { return };
    let dir = manifest_path.parent().unwrap_or(root);

    let lib_table = table.get("lib").and_then(toml::Value::as_table);
    let lib_path = lib_table.and_then(|l| l.get("path")).and_then(toml::Value::as_str).map(String::from);
    if lib_table.is_some() || dir.join("src/lib.rs").is_file() {
        add_if_known(root, graph, dir, lib_path.as_deref().unwrap_or("src/lib.rs"), EntryReason::ManifestMain, entries);
    }

    let bin_entries = table.get("bin").and_then(toml::Value::as_array);
    let has_explicit_bins = bin_entries.is_some_and(|a| !a.is_empty());
    if !has_explicit_bins && dir.join("src/main.rs").is_file() {
        add_if_known(root, graph, dir, "src/main.rs", EntryReason::ManifestMain, entries);
    }
    if let Some(bins) = bin_entries {
        for bin in bins {
            let Some(bin) = bin.as_table() else { continue };
            let name = bin.get("name").and_then(toml::Value::as_str);
            let path = bin
                .get("path")
                .and_then(toml::Value::as_str)
                .map(String::from)
                .or_else(|| name.map(|n| format!("src/bin/{n}.rs")));
            if let Some(path) = path {
                add_if_known(root, graph, dir, &path, EntryReason::ManifestMain, entries);
            }
        }
    }
}

/// PEP 621 `[project.scripts]`/`[project.gui-scripts]`/
/// `[project.entry-points."<group>"]`, plus Poetry's
/// `[tool.poetry.scripts]`, all name a `module:attr` callable that some
/// external launcher (`pip install` console script, a plugin loader)
/// invokes without any import from inside the project — each named
/// module is a root.
fn mark_pyproject_entries(root: &Path, manifest_path: &Path, graph: &ModuleGraph, entries: &mut EntryPoints) {
    let Ok(content) = std::fs::read_to_string(manifest_path) else { return };
    let Ok(table) = content.parse::<toml::Table>() else { return };
    let dir = manifest_path.parent().unwrap_or(root);

    let mut targets = Vec::new();
    if let Some(project) = table.get("project").and_then(toml::Value::as_table) {
        collect_toml_script_targets(project.get("scripts"), &mut targets);
        collect_toml_script_targets(project.get("gui-scripts"), &mut targets);
        if let Some(groups) = project.get("entry-points").and_then(toml::Value::as_table) {
            for group in groups.values() {
                collect_toml_script_targets(Some(group), &mut targets);
            }
        }
    }
    let poetry_scripts = table
        .get("tool")
        .and_then(toml::Value::as_table)
        .and_then(|t| t.get("poetry"))
        .and_then(toml::Value::as_table)
        .and_then(|p| p.get("scripts"));
    collect_toml_script_targets(poetry_scripts, &mut targets);

    for target in targets {
        let Some((module, _attr)) = target.split_once(':') else { continue };
        let relative = module.replace('.', "/");
        add_if_known(root, graph, dir, &relative, EntryReason::ManifestMain, entries);
    }
}

fn collect_toml_script_targets(value: Option<&toml::Value>, out: &mut Vec<String>) {
    let Some(table) = value.and_then(toml::Value::as_table) else { return };
    for v in table.values() {
        if let Some(s) = v.as_str() {
            out.push(s.to_string());
        }
    }
}

/// `setup.py` arguments are arbitrary Python, not data, so there's no
/// reliable parse here short of executing it. We instead regex-scan for
/// the conventional `entry_points={'console_scripts': ['name =
/// module:func', ...]}` (or `[project.scripts]`-equivalent
/// `setuptools.setup(entry_points=...)`) literal and pull out every
/// `module:attr` target it names; anything more dynamic than that is
/// outside what a static scan can recover.
fn mark_setup_py_entries(root: &Path, manifest_path: &Path, graph: &ModuleGraph, entries: &mut EntryPoints) {
    let Ok(content) = std::fs::read_to_string(manifest_path) else { return };
    let dir = manifest_path.parent().unwrap_or(root);

    let re = regex::Regex::new(r#"['"]([A-Za-z_][\w.]*)\s*=\s*([A-Za-z_][\w.]*)\s*:\s*[\w.]+['"]"#).unwrap();
    for cap in re.captures_iter(&content) {
        let module = &cap[2];
        let relative = module.replace('.', "/");
        add_if_known(root, graph, dir, &relative, EntryReason::ManifestMain, entries);
    }
}

/// Any file whose text matches one of
/// `config.di_container_patterns` (defaults: `Container.get<`,
/// `container.resolve<`, `moduleRef.get<`, ...) is a DI-container-call
/// entry point. Requires reading the file's raw text, which isn't kept
/// past parse time, so it's re-read here on demand (read-only, same as
/// every other manifest read in this module).
fn matches_di_container_pattern(root: &Path, relative_path: &str, config: &AnalysisConfig) -> bool {
    if config.di_container_patterns.patterns().is_empty() {
        return false;
    }
    let Ok(content) = std::fs::read_to_string(root.join(relative_path)) else { return false };
    config.di_container_patterns.is_match(&content)
}

/// Files referenced from configurable fields of `package.json` (a
/// plugin registry, a custom loader map) are entry points even though
/// nothing imports them directly.
fn mark_dynamic_package_field_entries(
    root: &Path,
    manifest_path: &Path,
    index: &FileIndex,
    graph: &ModuleGraph,
    config: &AnalysisConfig,
    entries: &mut EntryPoints,
) {
    let Ok(content) = std::fs::read_to_string(manifest_path) else { return };
    let Ok(value) = serde_json::from_str::<Value>(&content) else { return };
    let dir = manifest_path.parent().unwrap_or(root);
    let dir_rel = dir.strip_prefix(root).unwrap_or(dir).to_string_lossy().replace('\\', "/");
    let importing_file = if dir_rel.is_empty() {
        "package.json".to_string()
    } else {
        format!("{dir_rel}/package.json")
    };

    let mut candidates = Vec::new();
    collect_dynamic_field_values(&value, &config.dynamic_package_fields, &mut candidates);
    for candidate in candidates {
        let raw = if candidate.starts_with('.') { candidate } else { format!("./{candidate}") };
        if let crate::resolver::Resolved::Local(target) =
            js::resolve(&importing_file, &raw, index, &js::JsResolveConfig::default())
        {
            if let Some(id) = graph.node_id(&target) {
                entries.add(id, EntryReason::DynamicPackageField);
            }
        }
    }
}

/// Recursively descends `value`, and for every object key that's one of
/// `fields`, collects every string reachable under that key's value —
/// the field's value can itself be a nested object or array of path
/// strings, e.g. `{"plugins": {"foo": "./plugins/foo.ts"}}`.
fn collect_dynamic_field_values(value: &Value, fields: &[String], out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                if fields.iter().any(|f| f == key) {
                    collect_export_strings(v, out);
                }
                collect_dynamic_field_values(v, fields, out);
            }
        }
        Value::Array(arr) => {
            for v in arr {
                collect_dynamic_field_values(v, fields, out);
            }
        }
        _ => {}
    }
}

fn is_bundler_config(path: &str, config: &AnalysisConfig) -> bool {
    let basename = path.rsplit('/').next().unwrap_or(path);
    config.bundler_configs.iter().any(|b| b == basename)
}

fn has_framework_marker(node: &crate::graph::ModuleNode) -> bool {
    let m = &node.source.parse_result.metadata;
    m.is_django_model
        || m.is_fast_api
        || m.is_spring
        || m.uses_wire
        || m.extra_flags.values().any(|v| *v)
}

fn mark_package_json_entries(
    root: &Path,
    manifest_path: &Path,
    index: &FileIndex,
    graph: &ModuleGraph,
    entries: &mut EntryPoints,
) {
    let Ok(content) = std::fs::read_to_string(manifest_path) else { return };
    let Ok(value) = serde_json::from_str::<Value>(&content) else { return };
    let dir = manifest_path.parent().unwrap_or(root);
    let dir_rel = dir.strip_prefix(root).unwrap_or(dir).to_string_lossy().replace('\\', "/");

    let mut candidates: Vec<String> = Vec::new();
    for field in ["main", "module"] {
        if let Some(s) = value.get(field).and_then(Value::as_str) {
            candidates.push(s.to_string());
        }
    }
    if let Some(bin) = value.get("bin") {
        match bin {
            Value::String(s) => candidates.push(s.clone()),
            Value::Object(map) => candidates.extend(map.values().filter_map(Value::as_str).map(String::from)),
            _ => {}
        }
    }
    if let Some(exports) = value.get("exports") {
        collect_export_strings(exports, &mut candidates);
    }

    let importing_file = if dir_rel.is_empty() {
        "package.json".to_string()
    } else {
        format!("{dir_rel}/package.json")
    };
    for candidate in candidates {
        let raw = if candidate.starts_with('.') { candidate } else { format!("./{candidate}") };
        if let crate::resolver::Resolved::Local(target) =
            js::resolve(&importing_file, &raw, index, &js::JsResolveConfig::default())
        {
            if let Some(id) = graph.node_id(&target) {
                entries.add(id, EntryReason::ManifestMain);
            }
        }
    }
}

fn collect_export_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Object(map) => {
            for v in map.values() {
                collect_export_strings(v, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::ModuleGraph;
    use source_model::Language;
    use std::path::PathBuf;

    #[test]
    fn flags_main_entry_and_test_files() {
        let a = ast_parser::parse(Language::TypeScript, "/repo/src/index.ts", "function main() {}\n");
        let b = regex_parsers::parse(Language::Go, "/repo/cmd/main.go", "package main\nfunc main() {}\n");

        let sources = vec![
            source_model::SourceFile {
                path: "/repo/src/index.ts".into(),
                language: Language::TypeScript,
                bytes: 0,
                line_count: 0,
                parse_result: a,
            },
            source_model::SourceFile {
                path: "/repo/cmd/main.go".into(),
                language: Language::Go,
                bytes: 0,
                line_count: 0,
                parse_result: b,
            },
        ];
        let mut diagnostics = Vec::new();
        let root = PathBuf::from("/repo");
        let graph = ModuleGraph::build(&root, sources, &mut diagnostics);
        let config = AnalysisConfig::default();
        let entries = find_entry_points(&root, &graph, &[], &config);
        assert!(!entries.files.is_empty());
    }

    #[test]
    fn di_container_call_pattern_keeps_a_file_live() {
        let tmpdir = test_tmpdir::test_tmpdir!(
            "package.json" => "{\"main\": \"src/index.ts\"}",
            "src/index.ts" => "function main() {}\n",
            "src/container_wired.ts" => "export class Thing {}\nconst t = container.resolve<Thing>(Thing);\n"
        );
        let config = AnalysisConfig::default();
        let report = crate::analyze(tmpdir.root(), &config, &logger::StdioLogger::new()).unwrap();
        assert!(report.dead_files.iter().all(|f| !f.path.ends_with("container_wired.ts")));
    }

    #[test]
    fn dynamic_package_field_keeps_referenced_plugin_live() {
        let tmpdir = test_tmpdir::test_tmpdir!(
            "package.json" => "{\"main\": \"src/index.ts\", \"plugins\": {\"foo\": \"./src/plugins/foo.ts\"}}",
            "src/index.ts" => "function main() {}\n",
            "src/plugins/foo.ts" => "export default class Foo {}\n"
        );
        let config = AnalysisConfig::default();
        let report = crate::analyze(tmpdir.root(), &config, &logger::StdioLogger::new()).unwrap();
        assert!(report.dead_files.iter().all(|f| !f.path.ends_with("foo.ts")));
    }

    #[test]
    fn cargo_toml_bin_and_lib_targets_are_entry_points() {
        let tmpdir = test_tmpdir::test_tmpdir!(
            "Cargo.toml" => "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n\n[lib]\npath = \"src/lib.rs\"\n\n[[bin]]\nname = \"tool\"\npath = \"src/bin/tool.rs\"\n",
            "src/lib.rs" => "pub fn helper() {}\n",
            "src/bin/tool.rs" => "fn main() {}\n"
        );
        let config = AnalysisConfig::default();
        let report = crate::analyze(tmpdir.root(), &config, &logger::StdioLogger::new()).unwrap();
        assert!(report.dead_files.iter().all(|f| !f.path.ends_with("lib.rs")));
        assert!(report.dead_files.iter().all(|f| !f.path.ends_with("tool.rs")));
    }

    #[test]
    fn pyproject_console_script_keeps_its_module_live() {
        let tmpdir = test_tmpdir::test_tmpdir!(
            "pyproject.toml" => "[project]\nname = \"demo\"\n\n[project.scripts]\ndemo-cli = \"demo.cli:main\"\n",
            "demo/cli.py" => "def main():\n    pass\n"
        );
        let config = AnalysisConfig::default();
        let report = crate::analyze(tmpdir.root(), &config, &logger::StdioLogger::new()).unwrap();
        assert!(report.dead_files.iter().all(|f| !f.path.ends_with("cli.py")));
    }

    #[test]
    fn setup_py_console_scripts_entry_keeps_its_module_live() {
        let tmpdir = test_tmpdir::test_tmpdir!(
            "setup.py" => "from setuptools import setup\nsetup(\n    name='demo',\n    entry_points={\n        'console_scripts': ['demo-cli = demo.cli:main'],\n    },\n)\n",
            "demo/cli.py" => "def main():\n    pass\n"
        );
        let config = AnalysisConfig::default();
        let report = crate::analyze(tmpdir.root(), &config, &logger::StdioLogger::new()).unwrap();
        assert!(report.dead_files.iter().all(|f| !f.path.ends_with("cli.py")));
    }
}
