use serde::{Deserialize, Serialize};

/// The closed set of languages the analyzer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
    Vue,
    Python,
    Go,
    Rust,
    Java,
    Kotlin,
    Php,
    Ruby,
    CSharp,
    Dart,
    Swift,
    Scala,
    Elixir,
    Haskell,
    Lua,
    C,
    Cpp,
    Perl,
    R,
    Clojure,
    FSharp,
    OCaml,
    Julia,
    Zig,
    Nim,
    Erlang,
    Groovy,
    Crystal,
    V,
    ObjectiveC,
    Shell,
    PowerShell,
    Cobol,
    Fortran,
    VbNet,
    /// `.d.ts` and similar type-declaration-only files: excluded from
    /// analysis, never flagged.
    Types,
}

impl Language {
    /// Whether this language is parsed by the AST tier (the JavaScript
    /// family only) or falls back to the regex tier.
    pub fn is_ast_tier(self) -> bool {
        matches!(
            self,
            Language::JavaScript
                | Language::TypeScript
                | Language::Jsx
                | Language::Tsx
                | Language::Vue
        )
    }

    pub fn is_js_family(self) -> bool {
        self.is_ast_tier()
    }

    /// Default top-level-export visibility convention, used by regex
    /// parsers that don't have an explicit `pub`/`export` marker on every
    /// declaration.
    pub fn default_visibility(self) -> DefaultVisibility {
        match self {
            Language::Go => DefaultVisibility::CapitalizedIsPublic,
            Language::Python | Language::Ruby => DefaultVisibility::UnderscorePrefixIsPrivate,
            Language::Rust => DefaultVisibility::ExplicitMarkerRequired,
            _ => DefaultVisibility::AllPublic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultVisibility {
    AllPublic,
    CapitalizedIsPublic,
    UnderscorePrefixIsPrivate,
    ExplicitMarkerRequired,
}

/// Pure function: file extension → language tag. Returns `None` for
/// unsupported/unknown extensions; those are skipped by the analyzer but
/// still reported in totals.
pub fn route_extension(ext: &str) -> Option<Language> {
    let ext = ext.to_ascii_lowercase();
    Some(match ext.as_str() {
        "js" | "mjs" | "cjs" => Language::JavaScript,
        "jsx" => Language::Jsx,
        "ts" | "mts" | "cts" => Language::TypeScript,
        "tsx" => Language::Tsx,
        "vue" => Language::Vue,
        "py" | "pyi" => Language::Python,
        "go" => Language::Go,
        "rs" => Language::Rust,
        "java" => Language::Java,
        "kt" | "kts" => Language::Kotlin,
        "php" => Language::Php,
        "rb" => Language::Ruby,
        "cs" => Language::CSharp,
        "dart" => Language::Dart,
        "swift" => Language::Swift,
        "scala" | "sc" => Language::Scala,
        "ex" | "exs" => Language::Elixir,
        "hs" | "lhs" => Language::Haskell,
        "lua" => Language::Lua,
        "c" | "h" => Language::C,
        "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
        "pl" | "pm" => Language::Perl,
        "r" => Language::R,
        "clj" | "cljs" | "cljc" => Language::Clojure,
        "fs" | "fsx" => Language::FSharp,
        "ml" | "mli" => Language::OCaml,
        "jl" => Language::Julia,
        "zig" => Language::Zig,
        "nim" | "nims" => Language::Nim,
        "erl" | "hrl" => Language::Erlang,
        "groovy" | "gvy" => Language::Groovy,
        "cr" => Language::Crystal,
        "v" => Language::V,
        "m" | "mm" => Language::ObjectiveC,
        "sh" | "bash" | "zsh" => Language::Shell,
        "ps1" | "psm1" => Language::PowerShell,
        "cob" | "cbl" => Language::Cobol,
        "f" | "f90" | "f95" => Language::Fortran,
        "vb" => Language::VbNet,
        _ => return None,
    })
}

/// Routes a full file path (not just an extension), special-casing the
/// `.d.ts`/`.d.mts`/`.d.cts` family, which is tagged `Types` rather than
/// `TypeScript` regardless of its outer extension.
pub fn route_path(path: &str) -> Option<Language> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".d.ts") || lower.ends_with(".d.mts") || lower.ends_with(".d.cts") {
        return Some(Language::Types);
    }
    let ext = path.rsplit('.').next()?;
    if ext == path {
        return None;
    }
    route_extension(ext)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn routes_known_extensions() {
        assert_eq!(route_path("src/app.tsx"), Some(Language::Tsx));
        assert_eq!(route_path("src/app.vue"), Some(Language::Vue));
        assert_eq!(route_path("pkg/main.go"), Some(Language::Go));
    }

    #[test]
    fn routes_dts_as_types() {
        assert_eq!(route_path("src/types.d.ts"), Some(Language::Types));
        assert_eq!(route_path("src/index.ts"), Some(Language::TypeScript));
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(route_path("README.md"), None);
        assert_eq!(route_path("Makefile"), None);
    }
}
