//! JS-family resolution: relative imports with extension search, `tsconfig.json`
//! `baseUrl`/`paths` aliasing, and `package.json` `workspaces` lookups for bare
//! specifiers that name a local monorepo package rather than an npm dependency.
//!
//! Extension-search order and index-file fallback are grounded in the same
//! resolution order a bundler applies: exact path, then each extension in turn,
//! then each `index.*` file under the directory, then (as a last resort) any
//! file sharing the same stem.

use std::path::Path;

use ahashmap::AHashMap;
use path_slash::PathExt;
use regex::Regex;
use serde_json::Value;

use super::{join_relative, FileIndex, Resolved};

const EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts", ".js", ".jsx", ".mjs", ".cjs", ".vue", ".json"];
const INDEX_FILES: &[&str] =
    &["/index.ts", "/index.tsx", "/index.js", "/index.jsx", "/index.vue"];

/// A local monorepo package discovered under a `package.json` `workspaces`
/// glob: its directory (root-relative slash path) and its declared entry
/// file (the raw `main`/`module` string, unresolved).
#[derive(Debug, Clone)]
struct WorkspacePackage {
    dir: String,
    entry: Option<String>,
}

/// `tsconfig.json`/`package.json` state needed to resolve a bare specifier
/// into the project, built once per analysis and passed to every JS-family
/// resolution. Empty (the default) when neither file is present or neither
/// declares anything usable, in which case every bare specifier is external,
/// same as before this existed.
#[derive(Debug, Clone, Default)]
pub struct JsResolveConfig {
    base_url: Option<String>,
    paths: Vec<(String, Vec<String>)>,
    workspace_packages: AHashMap<String, WorkspacePackage>,
}

impl JsResolveConfig {
    pub fn load(root: &Path) -> Self {
        let (base_url, paths) = read_tsconfig(root);
        let workspace_packages = read_workspace_packages(root);
        JsResolveConfig { base_url, paths, workspace_packages }
    }

    fn resolve_bare(&self, specifier: &str, index: &FileIndex) -> Option<String> {
        self.resolve_via_paths(specifier, index).or_else(|| self.resolve_via_workspace(specifier, index))
    }

    fn resolve_via_paths(&self, specifier: &str, index: &FileIndex) -> Option<String> {
        for (pattern, targets) in &self.paths {
            let Some(matched) = match_paths_pattern(pattern, specifier) else { continue };
            for target in targets {
                let substituted = target.replacen('*', &matched, 1);
                let base = self.join_base_url(&substituted);
                if let Resolved::Local(p) = resolve_from_base(&base, index) {
                    return Some(p);
                }
            }
        }
        // `baseUrl` alone (no matching `paths` entry) still makes a bare
        // specifier resolvable relative to it, the same way a bundler
        // treats `baseUrl` as an extra module root.
        if self.base_url.is_some() {
            let base = self.join_base_url(specifier);
            if let Resolved::Local(p) = resolve_from_base(&base, index) {
                return Some(p);
            }
        }
        None
    }

    fn join_base_url(&self, rel: &str) -> String {
        match self.base_url.as_deref() {
            Some(".") | Some("") | None => rel.to_string(),
            Some(base) => format!("{base}/{rel}"),
        }
    }

    fn resolve_via_workspace(&self, specifier: &str, index: &FileIndex) -> Option<String> {
        for (name, pkg) in &self.workspace_packages {
            if specifier == name {
                if let Some(entry) = &pkg.entry {
                    let base = format!("{}/{}", pkg.dir, entry);
                    if let Resolved::Local(p) = resolve_from_base(&base, index) {
                        return Some(p);
                    }
                }
                let base = format!("{}/index", pkg.dir);
                if let Resolved::Local(p) = resolve_from_base(&base, index) {
                    return Some(p);
                }
            } else if let Some(rest) = specifier.strip_prefix(&format!("{name}/")) {
                let base = format!("{}/{}", pkg.dir, rest);
                if let Resolved::Local(p) = resolve_from_base(&base, index) {
                    return Some(p);
                }
            }
        }
        None
    }
}

/// Matches a tsconfig `paths` key (at most one `*` wildcard) against a
/// specifier, returning the substring the `*` captured.
fn match_paths_pattern(pattern: &str, specifier: &str) -> Option<String> {
    match pattern.find('*') {
        Some(idx) => {
            let (prefix, suffix) = (&pattern[..idx], &pattern[idx + 1..]);
            if specifier.starts_with(prefix)
                && specifier.ends_with(suffix)
                && specifier.len() >= prefix.len() + suffix.len()
            {
                Some(specifier[prefix.len()..specifier.len() - suffix.len()].to_string())
            } else {
                None
            }
        }
        None if pattern == specifier => Some(String::new()),
        None => None,
    }
}

fn read_tsconfig(root: &Path) -> (Option<String>, Vec<(String, Vec<String>)>) {
    let Ok(raw) = std::fs::read_to_string(root.join("tsconfig.json")) else {
        return (None, Vec::new());
    };
    let Ok(value) = serde_json::from_str::<Value>(&strip_jsonc(&raw)) else {
        return (None, Vec::new());
    };
    let compiler = value.get("compilerOptions");
    let base_url = compiler.and_then(|c| c.get("baseUrl")).and_then(Value::as_str).map(str::to_string);
    let mut paths = Vec::new();
    if let Some(map) = compiler.and_then(|c| c.get("paths")).and_then(Value::as_object) {
        for (pattern, targets) in map {
            let targets: Vec<String> = match targets {
                Value::Array(arr) => arr.iter().filter_map(Value::as_str).map(String::from).collect(),
                Value::String(s) => vec![s.clone()],
                _ => continue,
            };
            if !targets.is_empty() {
                paths.push((pattern.clone(), targets));
            }
        }
    }
    (base_url, paths)
}

fn read_workspace_packages(root: &Path) -> AHashMap<String, WorkspacePackage> {
    let mut out = AHashMap::default();
    let Ok(raw) = std::fs::read_to_string(root.join("package.json")) else { return out };
    let Ok(value) = serde_json::from_str::<Value>(&raw) else { return out };

    for glob_pattern in workspace_globs(&value) {
        let pattern_path = root.join(&glob_pattern).join("package.json");
        let Some(pattern_str) = pattern_path.to_str() else { continue };
        let Ok(matches) = glob::glob(pattern_str) else { continue };
        for manifest in matches.flatten() {
            let Ok(pkg_raw) = std::fs::read_to_string(&manifest) else { continue };
            let Ok(pkg) = serde_json::from_str::<Value>(&pkg_raw) else { continue };
            let Some(name) = pkg.get("name").and_then(Value::as_str) else { continue };
            let dir = manifest.parent().unwrap_or(root);
            let dir_rel = dir.strip_prefix(root).unwrap_or(dir).to_slash_lossy().to_string();
            let entry = package_entry_field(&pkg);
            out.insert(name.to_string(), WorkspacePackage { dir: dir_rel, entry });
        }
    }
    out
}

/// A workspace package's own entry file, preferring its `exports` map
/// (the `"."` subpath, or the bare string form) over `main`/`module`,
/// matching how Node itself resolves a package's root import.
fn package_entry_field(pkg: &Value) -> Option<String> {
    if let Some(exports) = pkg.get("exports") {
        match exports {
            Value::String(s) => return Some(s.clone()),
            Value::Object(map) => {
                let dot = map.get(".").or_else(|| map.get("require")).or_else(|| map.get("import"));
                if let Some(found) = dot.and_then(Value::as_str) {
                    return Some(found.to_string());
                }
                if let Some(Value::Object(nested)) = map.get(".") {
                    if let Some(found) = nested.get("require").or_else(|| nested.get("import")).or_else(|| nested.get("default")).and_then(Value::as_str) {
                        return Some(found.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    ["main", "module"].iter().find_map(|field| pkg.get(*field).and_then(Value::as_str)).map(str::to_string)
}

fn workspace_globs(value: &Value) -> Vec<String> {
    match value.get("workspaces") {
        Some(Value::Array(arr)) => arr.iter().filter_map(Value::as_str).map(String::from).collect(),
        Some(Value::Object(map)) => match map.get("packages") {
            Some(Value::Array(arr)) => arr.iter().filter_map(Value::as_str).map(String::from).collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Strips `//` and `/* */` comments from a JSONC document (tsconfig.json
/// commonly carries both) so `serde_json` can parse it; string contents are
/// left untouched. Trailing commas before a closing `}`/`]` are then removed
/// with a regex pass, covering the other common tsconfig tolerance: a
/// trailing comma before a closing brace or bracket.
fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                chars.next();
                for c2 in chars.by_ref() {
                    if c2 == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for c2 in chars.by_ref() {
                    if prev == '*' && c2 == '/' {
                        break;
                    }
                    prev = c2;
                }
            }
            _ => out.push(c),
        }
    }
    strip_trailing_commas(&out)
}

fn strip_trailing_commas(input: &str) -> String {
    let re = Regex::new(r",(\s*[}\]])").expect("static trailing-comma regex is valid");
    re.replace_all(input, "$1").to_string()
}

pub fn resolve(importing_file: &str, raw: &str, index: &FileIndex, config: &JsResolveConfig) -> Resolved {
    if is_relative(raw) {
        let base = join_relative(importing_file, raw);
        return resolve_from_base(&base, index);
    }

    if let Some(local) = config.resolve_bare(raw, index) {
        return Resolved::Local(local);
    }

    Resolved::External
}

fn resolve_from_base(base: &str, index: &FileIndex) -> Resolved {
    if index.exists(base) {
        return Resolved::Local(base.to_string());
    }
    for ext in EXTENSIONS {
        let candidate = format!("{base}{ext}");
        if index.exists(&candidate) {
            return Resolved::Local(candidate);
        }
    }
    for index_suffix in INDEX_FILES {
        let candidate = format!("{base}{index_suffix}");
        if index.exists(&candidate) {
            return Resolved::Local(candidate);
        }
    }
    let stems = index.by_stem(base);
    if let Some(first) = stems.first() {
        return Resolved::Local(first.clone());
    }
    Resolved::Failed(format!("no file matching {base:?}"))
}

fn is_relative(raw: &str) -> bool {
    raw.starts_with("./") || raw.starts_with("../") || raw == "." || raw == ".."
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn index(files: &[&str]) -> FileIndex {
        FileIndex::build(
            &PathBuf::from("/repo"),
            files.iter().map(|f| PathBuf::from("/repo").join(f)),
        )
    }

    #[test]
    fn resolves_relative_import_with_extension_search() {
        let idx = index(&["src/a.ts", "src/util.ts"]);
        assert_eq!(
            resolve("src/a.ts", "./util", &idx, &JsResolveConfig::default()),
            Resolved::Local("src/util.ts".to_string())
        );
    }

    #[test]
    fn resolves_relative_import_to_index_file() {
        let idx = index(&["src/a.ts", "src/lib/index.ts"]);
        assert_eq!(
            resolve("src/a.ts", "./lib", &idx, &JsResolveConfig::default()),
            Resolved::Local("src/lib/index.ts".to_string())
        );
    }

    #[test]
    fn bare_specifier_is_external_with_no_config() {
        let idx = index(&["src/a.ts"]);
        assert_eq!(
            resolve("src/a.ts", "react", &idx, &JsResolveConfig::default()),
            Resolved::External
        );
    }

    #[test]
    fn unresolvable_relative_import_fails() {
        let idx = index(&["src/a.ts"]);
        assert!(matches!(
            resolve("src/a.ts", "./missing", &idx, &JsResolveConfig::default()),
            Resolved::Failed(_)
        ));
    }

    #[test]
    fn tsconfig_paths_alias_resolves_into_the_project() {
        let idx = index(&["src/a.ts", "src/app/widget.ts"]);
        let config = JsResolveConfig {
            base_url: Some(".".to_string()),
            paths: vec![("@app/*".to_string(), vec!["src/app/*".to_string()])],
            workspace_packages: AHashMap::default(),
        };
        assert_eq!(
            resolve("src/a.ts", "@app/widget", &idx, &config),
            Resolved::Local("src/app/widget.ts".to_string())
        );
    }

    #[test]
    fn base_url_alone_resolves_a_bare_specifier() {
        let idx = index(&["src/a.ts", "shared/util.ts"]);
        let config = JsResolveConfig {
            base_url: Some("shared".to_string()),
            paths: Vec::new(),
            workspace_packages: AHashMap::default(),
        };
        assert_eq!(resolve("src/a.ts", "util", &idx, &config), Resolved::Local("shared/util.ts".to_string()));
    }

    #[test]
    fn workspace_package_name_resolves_to_its_declared_entry() {
        let idx = index(&["apps/web/src/a.ts", "packages/ui/src/index.ts"]);
        let mut workspace_packages = AHashMap::default();
        workspace_packages.insert(
            "@repo/ui".to_string(),
            WorkspacePackage { dir: "packages/ui".to_string(), entry: Some("src/index.ts".to_string()) },
        );
        let config = JsResolveConfig { base_url: None, paths: Vec::new(), workspace_packages };
        assert_eq!(
            resolve("apps/web/src/a.ts", "@repo/ui", &idx, &config),
            Resolved::Local("packages/ui/src/index.ts".to_string())
        );
    }

    #[test]
    fn workspace_package_subpath_resolves_relative_to_its_directory() {
        let idx = index(&["packages/ui/src/button.ts"]);
        let mut workspace_packages = AHashMap::default();
        workspace_packages
            .insert("@repo/ui".to_string(), WorkspacePackage { dir: "packages/ui".to_string(), entry: None });
        let config = JsResolveConfig { base_url: None, paths: Vec::new(), workspace_packages };
        assert_eq!(
            resolve("apps/web/src/a.ts", "@repo/ui/src/button", &idx, &config),
            Resolved::Local("packages/ui/src/button.ts".to_string())
        );
    }

    #[test]
    fn strip_jsonc_removes_comments_and_trailing_commas() {
        let input = "{\n  // comment\n  \"a\": 1, /* inline */\n  \"b\": [1, 2,],\n}";
        let cleaned = strip_jsonc(input);
        let value: Value = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], serde_json::json!([1, 2]));
    }
}
