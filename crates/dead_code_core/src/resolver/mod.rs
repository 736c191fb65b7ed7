//! `ImportResolver`: turns the raw module string on an import into the
//! project-relative path it points at, or classifies it as an external
//! dependency/stdlib reference that the graph doesn't need to track, or
//! as a genuine resolution failure.
//!
//! Each language gets its own resolver (relative-path-first, falling
//! back to manifest-driven lookups for bare specifiers), grounded in how
//! that language's own module system actually works rather than a single
//! shared algorithm across all of them.

pub mod generic;
pub mod go;
pub mod js;
pub mod jvm;
pub mod python;
pub mod rust_lang;

use std::path::{Path, PathBuf};

use ahashmap::{AHashMap, AHashSet};
use path_clean::PathClean;
use path_slash::PathExt;
use source_model::Language;

/// An index over every file the walker found, built once before
/// resolution begins so each import lookup is an O(1)/O(log n) map probe
/// instead of a filesystem stat.
pub struct FileIndex {
    root: PathBuf,
    /// Every known file, as a root-relative slash path (`"src/a.ts"`).
    paths: AHashSet<String>,
    /// Root-relative slash path with its extension(s) stripped
    /// (`"src/a"`) -> every real path sharing that stem, so `./a` can
    /// resolve to `a.ts`, `a/index.ts`, etc.
    by_stem: AHashMap<String, Vec<String>>,
}

impl FileIndex {
    pub fn build(root: &Path, paths: impl Iterator<Item = PathBuf>) -> Self {
        let mut index = FileIndex {
            root: root.to_path_buf(),
            paths: AHashSet::default(),
            by_stem: AHashMap::default(),
        };
        for path in paths {
            let Some(rel) = index.to_relative_slash(&path) else { continue };
            let stem = strip_known_extension(&rel);
            index.by_stem.entry(stem).or_default().push(rel.clone());
            index.paths.insert(rel);
        }
        index
    }

    fn to_relative_slash(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.to_slash().map(|s| s.to_string())
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.paths.contains(relative)
    }

    /// All known files whose extension-stripped path equals `stem`
    /// (e.g. `"src/utils"` matches `"src/utils.ts"` and
    /// `"src/utils/index.ts"` depending on how `stem` was built).
    pub fn by_stem(&self, stem: &str) -> &[String] {
        self.by_stem.get(stem).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Every known root-relative path with the given extension, for
    /// resolvers (Go, Rust, JVM) that need to search by directory/package
    /// suffix rather than by a single stem.
    pub fn paths_with_extension<'a>(&'a self, ext: &'a str) -> impl Iterator<Item = &'a str> {
        self.paths.iter().filter(move |p| p.ends_with(ext)).map(|p| p.as_str())
    }
}

fn strip_known_extension(rel: &str) -> String {
    for ext in [
        ".d.ts", ".tsx", ".ts", ".jsx", ".js", ".mjs", ".cjs", ".vue", ".py", ".pyi", ".go", ".rs",
        ".java", ".kt", ".rb", ".php",
    ] {
        if let Some(stripped) = rel.strip_suffix(ext) {
            return stripped.to_string();
        }
    }
    rel.to_string()
}

/// Classifies what an import's `rawModule` string turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Resolved to a file the walker found, as a root-relative slash path.
    Local(String),
    /// Recognized as pointing outside the project (an npm package, a
    /// stdlib module, a JVM package outside the source tree). Not a
    /// failure — just not something the module graph can trace further.
    External,
    /// Genuinely couldn't be resolved; carries a human-readable reason
    /// for `Diagnostic::ResolutionFailure`.
    Failed(String),
}

pub fn resolve(
    importing_file: &str,
    language: Language,
    raw_module: &str,
    index: &FileIndex,
    js_config: &js::JsResolveConfig,
) -> Resolved {
    if language.is_js_family() {
        return js::resolve(importing_file, raw_module, index, js_config);
    }
    match language {
        Language::Python => python::resolve(importing_file, raw_module, index),
        Language::Go => go::resolve(importing_file, raw_module, index),
        Language::Rust => rust_lang::resolve(importing_file, raw_module, index),
        Language::Java | Language::Kotlin => jvm::resolve(importing_file, raw_module, index),
        _ => generic::resolve(importing_file, raw_module, index),
    }
}

/// Shared relative-path join helper: resolves `raw` relative to the
/// directory containing `importing_file`, normalizing `.`/`..` segments,
/// and always returns a root-relative slash path (even if the target
/// doesn't exist — callers check `FileIndex::exists`/`by_stem`).
pub(crate) fn join_relative(importing_file: &str, raw: &str) -> String {
    let importing_dir = Path::new(importing_file).parent().unwrap_or_else(|| Path::new(""));
    let joined = importing_dir.join(raw);
    let cleaned = joined.clean();
    cleaned.to_slash_lossy().to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn file_index_finds_by_stem() {
        let root = PathBuf::from("/repo");
        let index = FileIndex::build(
            &root,
            vec![PathBuf::from("/repo/src/a.ts"), PathBuf::from("/repo/src/b/index.ts")].into_iter(),
        );
        assert!(index.exists("src/a.ts"));
        assert_eq!(index.by_stem("src/a"), &["src/a.ts".to_string()]);
        assert_eq!(index.by_stem("src/b/index"), &["src/b/index.ts".to_string()]);
    }

    #[test]
    fn join_relative_normalizes_dotdot() {
        assert_eq!(join_relative("src/a/b.ts", "../c"), "src/a/c");
    }
}
