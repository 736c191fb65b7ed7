//! Fallback resolver for every language without a dedicated module
//! system model (PHP, Ruby, C#, Dart, Swift, Scala, Elixir, Haskell,
//! Lua, C/C++, Perl, R, Clojure, F#, OCaml, Julia, Zig, Nim, Erlang,
//! Groovy, Crystal, V, Objective-C, shell, PowerShell, Cobol, Fortran,
//! VB.NET: best-effort relative-path resolution only. A raw module
//! string that looks like a relative or rooted path is resolved the same
//! way the JS resolver does; anything else is `External` rather than a
//! guessed failure.

use super::{join_relative, FileIndex, Resolved};

const EXTENSIONS: &[&str] = &[
    ".php", ".rb", ".cs", ".dart", ".swift", ".scala", ".ex", ".exs", ".hs", ".lua", ".c", ".h",
    ".cpp", ".cc", ".hpp", ".pl", ".pm", ".r", ".clj", ".fs", ".ml", ".mli", ".jl", ".zig", ".nim",
    ".erl", ".groovy", ".cr", ".v", ".m", ".mm",
];

pub fn resolve(importing_file: &str, raw: &str, index: &FileIndex) -> Resolved {
    if !looks_like_path(raw) {
        return Resolved::External;
    }

    let base = join_relative(importing_file, raw);
    if index.exists(&base) {
        return Resolved::Local(base);
    }
    for ext in EXTENSIONS {
        let candidate = format!("{base}{ext}");
        if index.exists(&candidate) {
            return Resolved::Local(candidate);
        }
    }
    if let Some(found) = index.by_stem(&base).first() {
        return Resolved::Local(found.clone());
    }

    Resolved::Failed(format!("no file matching relative reference {:?}", raw))
}

fn looks_like_path(raw: &str) -> bool {
    raw.starts_with('.') || raw.starts_with('/') || raw.contains('/')
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;

    fn index(files: &[&str]) -> FileIndex {
        FileIndex::build(&PathBuf::from("/repo"), files.iter().map(|f| PathBuf::from("/repo").join(f)))
    }

    #[test]
    fn resolves_relative_require() {
        let idx = index(&["lib/a.rb", "lib/util.rb"]);
        assert_eq!(resolve("lib/a.rb", "./util", &idx), Resolved::Local("lib/util.rb".to_string()));
    }

    #[test]
    fn bare_gem_name_is_external() {
        let idx = index(&["lib/a.rb"]);
        assert_eq!(resolve("lib/a.rb", "json", &idx), Resolved::External);
    }
}
