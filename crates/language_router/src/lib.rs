//! `LanguageRouter`. A pure function from path to [`Language`], plus
//! the one further decision downstream components need: which parser tier
//! handles that language.

pub use source_model::language::{route_extension, route_path, DefaultVisibility, Language};

/// Which parser tier a language is handled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserTier {
    /// Full AST extraction, backed by a vendored JS/TS grammar.
    Ast,
    /// Per-language regex grammar.
    Regex,
    /// Type-declaration-only files are routed but never parsed for
    /// reachability purposes.
    TypesOnly,
}

pub fn tier_for(language: Language) -> ParserTier {
    match language {
        Language::Types => ParserTier::TypesOnly,
        lang if lang.is_ast_tier() => ParserTier::Ast,
        _ => ParserTier::Regex,
    }
}

/// The result of routing a single walked file: either a recognized
/// language (with its tier), or `None` when the extension is unsupported.
/// Unsupported files are still counted in totals by the caller but never
/// reach a parser.
pub fn route(path: &str) -> Option<(Language, ParserTier)> {
    let lang = route_path(path)?;
    Some((lang, tier_for(lang)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn routes_js_family_to_ast_tier() {
        assert_eq!(route("a/b.tsx"), Some((Language::Tsx, ParserTier::Ast)));
        assert_eq!(route("a/b.vue"), Some((Language::Vue, ParserTier::Ast)));
    }

    #[test]
    fn routes_other_languages_to_regex_tier() {
        assert_eq!(route("a/b.py"), Some((Language::Python, ParserTier::Regex)));
        assert_eq!(route("a/b.rs"), Some((Language::Rust, ParserTier::Regex)));
    }

    #[test]
    fn routes_dts_to_types_only() {
        assert_eq!(
            route("a/b.d.ts"),
            Some((Language::Types, ParserTier::TypesOnly))
        );
    }

    #[test]
    fn unknown_extension_routes_to_none() {
        assert_eq!(route("a/b.unknownext"), None);
    }
}
