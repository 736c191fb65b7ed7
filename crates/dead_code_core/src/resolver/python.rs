//! Python resolution: relative imports (`from . import x`, `from ..pkg
//! import y`) walk up parent packages via dot count; absolute dotted
//! imports (`import pkg.sub.mod`) are tried both against every project
//! root (so `src`-layout and flat-layout repos both work) and against the
//! importing file's own package ancestry, since Python has no single
//! canonical "base path" the way TypeScript's `baseUrl` does.

use super::{FileIndex, Resolved};

pub fn resolve(importing_file: &str, raw: &str, index: &FileIndex) -> Resolved {
    let leading_dots = raw.chars().take_while(|c| *c == '.').count();
    let rest = &raw[leading_dots..];

    if leading_dots > 0 {
        return resolve_relative(importing_file, leading_dots, rest, index);
    }

    // stdlib / third-party heuristic: a single bare top-level segment with
    // no matching file anywhere in the index is treated as external
    // rather than failed, since most imports in a real project are.
    let dotted_path = rest.replace('.', "/");
    if let Some(found) = try_candidates(&dotted_path, index) {
        return Resolved::Local(found);
    }

    let top_level = rest.split('.').next().unwrap_or(rest);
    if !index.by_stem(top_level).is_empty() || index.exists(&format!("{top_level}/__init__.py")) {
        // a same-named top-level module exists somewhere but the full
        // dotted path didn't resolve to a file we indexed.
        return Resolved::Failed(format!("module {:?} has no matching source file", raw));
    }
    Resolved::External
}

fn resolve_relative(importing_file: &str, leading_dots: usize, rest: &str, index: &FileIndex) -> Resolved {
    let mut dir = std::path::Path::new(importing_file).parent().unwrap_or_else(|| std::path::Path::new(""));
    // one leading dot means "this package"; each additional dot walks up
    // one more parent package.
    for _ in 1..leading_dots {
        dir = dir.parent().unwrap_or(dir);
    }

    let base = if rest.is_empty() {
        dir.to_string_lossy().replace('\\', "/")
    } else {
        format!("{}/{}", dir.to_string_lossy().replace('\\', "/"), rest.replace('.', "/"))
    };

    match try_candidates(&base, index) {
        Some(found) => Resolved::Local(found),
        None => Resolved::Failed(format!("relative import {:?} has no matching file near {:?}", rest, importing_file)),
    }
}

fn try_candidates(base: &str, index: &FileIndex) -> Option<String> {
    if index.exists(&format!("{base}.py")) {
        return Some(format!("{base}.py"));
    }
    if index.exists(&format!("{base}/__init__.py")) {
        return Some(format!("{base}/__init__.py"));
    }
    index.by_stem(base).first().cloned()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn index(files: &[&str]) -> FileIndex {
        FileIndex::build(&PathBuf::from("/repo"), files.iter().map(|f| PathBuf::from("/repo").join(f)))
    }

    #[test]
    fn resolves_same_package_relative_import() {
        let idx = index(&["pkg/a.py", "pkg/b.py"]);
        assert_eq!(resolve("pkg/a.py", ".b", &idx), Resolved::Local("pkg/b.py".to_string()));
    }

    #[test]
    fn resolves_parent_package_relative_import() {
        let idx = index(&["pkg/sub/a.py", "pkg/util.py"]);
        assert_eq!(resolve("pkg/sub/a.py", "..util", &idx), Resolved::Local("pkg/util.py".to_string()));
    }

    #[test]
    fn resolves_absolute_dotted_import() {
        let idx = index(&["pkg/sub/a.py", "pkg/sub/__init__.py"]);
        assert_eq!(resolve("other.py", "pkg.sub.a", &idx), Resolved::Local("pkg/sub/a.py".to_string()));
    }

    #[test]
    fn unrelated_top_level_module_is_external() {
        let idx = index(&["pkg/a.py"]);
        assert_eq!(resolve("pkg/a.py", "numpy.linalg", &idx), Resolved::External);
    }
}
