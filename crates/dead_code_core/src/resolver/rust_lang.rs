//! Rust resolution. `use crate::foo::bar::Baz` names a path through the
//! module tree, not necessarily a file — the last segment is very often
//! an item (a type, function, or trait) rather than a module. This walks
//! the segment list from longest to shortest, trying each prefix as a
//! file path (`foo/bar.rs`) or a module directory (`foo/bar/mod.rs`),
//! and resolves to the first match; a single-segment path with no
//! `crate`/`self`/`super` qualifier is an external crate dependency.

use super::{FileIndex, Resolved};

pub fn resolve(importing_file: &str, raw: &str, index: &FileIndex) -> Resolved {
    let raw = raw.trim_start_matches("::");
    let mut segments: Vec<&str> = raw.split("::").filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Resolved::Failed("empty use path".to_string());
    }

    let base_dir = match segments[0] {
        "crate" => {
            segments.remove(0);
            crate_root(importing_file, index)
        }
        "self" => {
            segments.remove(0);
            current_module_dir(importing_file)
        }
        "super" => {
            let mut dir = current_module_dir(importing_file);
            while segments.first() == Some(&"super") {
                segments.remove(0);
                dir = parent_module_dir(&dir);
            }
            dir
        }
        _ => return Resolved::External,
    };

    if segments.is_empty() {
        return Resolved::Failed("use path resolves to a module with no trailing item".to_string());
    }

    for take in (1..=segments.len()).rev() {
        let rel = segments[..take].join("/");
        let candidate = if base_dir.is_empty() { rel.clone() } else { format!("{base_dir}/{rel}") };
        if index.exists(&format!("{candidate}.rs")) {
            return Resolved::Local(format!("{candidate}.rs"));
        }
        if index.exists(&format!("{candidate}/mod.rs")) {
            return Resolved::Local(format!("{candidate}/mod.rs"));
        }
    }

    Resolved::Failed(format!("no module file found for use path {:?}", raw))
}

fn current_module_dir(importing_file: &str) -> String {
    match importing_file.rfind('/') {
        Some(i) => importing_file[..i].to_string(),
        None => String::new(),
    }
}

fn parent_module_dir(dir: &str) -> String {
    if dir.ends_with("/mod") {
        return parent_module_dir(dir.trim_end_matches("/mod"));
    }
    match dir.rfind('/') {
        Some(i) => dir[..i].to_string(),
        None => String::new(),
    }
}

/// Finds the directory standing in for `crate::`, by walking up from the
/// importing file to the nearest ancestor `src/` directory.
fn crate_root(importing_file: &str, _index: &FileIndex) -> String {
    let mut dir = std::path::Path::new(importing_file);
    while let Some(parent) = dir.parent() {
        if dir.file_name().map(|n| n == "src").unwrap_or(false) {
            return dir.to_string_lossy().replace('\\', "/");
        }
        dir = parent;
    }
    "src".to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn index(files: &[&str]) -> FileIndex {
        FileIndex::build(&PathBuf::from("/repo"), files.iter().map(|f| PathBuf::from("/repo").join(f)))
    }

    #[test]
    fn resolves_crate_relative_module_path() {
        let idx = index(&["crates/x/src/lib.rs", "crates/x/src/foo/bar.rs"]);
        assert_eq!(
            resolve("crates/x/src/lib.rs", "crate::foo::bar::Baz", &idx),
            Resolved::Local("crates/x/src/foo/bar.rs".to_string())
        );
    }

    #[test]
    fn resolves_super_relative_module_path() {
        let idx = index(&["src/foo/bar.rs", "src/foo/baz.rs"]);
        assert_eq!(
            resolve("src/foo/bar.rs", "super::baz::Thing", &idx),
            Resolved::Local("src/foo/baz.rs".to_string())
        );
    }

    #[test]
    fn external_crate_use_is_external() {
        let idx = index(&["src/foo.rs"]);
        assert_eq!(resolve("src/foo.rs", "serde::Deserialize", &idx), Resolved::External);
    }
}
