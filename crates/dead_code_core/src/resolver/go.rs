//! Go resolution. Go import paths are module-path-prefixed
//! (`"github.com/org/repo/pkg/util"`), and this analyzer doesn't parse
//! `go.mod`'s `module` directive to strip that prefix — instead it
//! matches by directory suffix: the import resolves to whichever
//! indexed `.go` file's directory shares the longest run of trailing
//! path segments with the import path. A package (directory) can hold
//! many files; the first file in that directory (sorted) stands in for
//! the package as the graph node, and every other file in the same
//! directory is treated as reachable once the directory is.

use super::{FileIndex, Resolved};

pub fn resolve(_importing_file: &str, raw: &str, index: &FileIndex) -> Resolved {
    let segments: Vec<&str> = raw.split('/').collect();
    let mut go_files: Vec<&str> = index.paths_with_extension(".go").collect();
    go_files.sort_unstable();

    let mut best: Option<(&str, usize)> = None;
    for file in &go_files {
        let dir = match file.rfind('/') {
            Some(i) => &file[..i],
            None => "",
        };
        let dir_segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
        let shared = shared_suffix_len(&segments, &dir_segments);
        if shared == 0 {
            continue;
        }
        if best.map(|(_, n)| shared > n).unwrap_or(true) {
            best = Some((file, shared));
        }
    }

    match best {
        Some((file, shared)) if shared >= 1 => Resolved::Local(file.to_string()),
        _ => Resolved::External,
    }
}

fn shared_suffix_len(a: &[&str], b: &[&str]) -> usize {
    let mut n = 0;
    while n < a.len() && n < b.len() && a[a.len() - 1 - n] == b[b.len() - 1 - n] {
        n += 1;
    }
    n
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn index(files: &[&str]) -> FileIndex {
        FileIndex::build(&PathBuf::from("/repo"), files.iter().map(|f| PathBuf::from("/repo").join(f)))
    }

    #[test]
    fn resolves_by_directory_suffix() {
        let idx = index(&["internal/util/helpers.go", "cmd/main.go"]);
        assert_eq!(
            resolve("cmd/main.go", "github.com/org/repo/internal/util", &idx),
            Resolved::Local("internal/util/helpers.go".to_string())
        );
    }

    #[test]
    fn unrelated_import_is_external() {
        let idx = index(&["internal/util/helpers.go"]);
        assert_eq!(resolve("cmd/main.go", "fmt", &idx), Resolved::External);
    }
}
