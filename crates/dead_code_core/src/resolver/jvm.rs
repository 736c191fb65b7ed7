//! JVM (Java/Kotlin) resolution. A fully-qualified name
//! (`com.example.foo.Bar`) mirrors its source file's path under some
//! source root (`src/main/java/com/example/foo/Bar.java`), but that
//! root's prefix isn't known without parsing a build file — so this
//! matches by path suffix instead of an assumed root, the same strategy
//! as the Go resolver.

use super::{FileIndex, Resolved};

pub fn resolve(_importing_file: &str, raw: &str, index: &FileIndex) -> Resolved {
    let path = raw.replace('.', "/");
    for ext in [".java", ".kt"] {
        let suffix = format!("/{path}{ext}");
        let exact = format!("{path}{ext}");
        for candidate in index.paths_with_extension(ext) {
            if candidate == exact || candidate.ends_with(&suffix) {
                return Resolved::Local(candidate.to_string());
            }
        }
    }
    Resolved::External
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn index(files: &[&str]) -> FileIndex {
        FileIndex::build(&PathBuf::from("/repo"), files.iter().map(|f| PathBuf::from("/repo").join(f)))
    }

    #[test]
    fn resolves_fully_qualified_class_by_suffix() {
        let idx = index(&["src/main/java/com/example/foo/Bar.java"]);
        assert_eq!(
            resolve("x", "com.example.foo.Bar", &idx),
            Resolved::Local("src/main/java/com/example/foo/Bar.java".to_string())
        );
    }

    #[test]
    fn unrelated_package_is_external() {
        let idx = index(&["src/main/java/com/example/foo/Bar.java"]);
        assert_eq!(resolve("x", "org.junit.Test", &idx), Resolved::External);
    }
}
