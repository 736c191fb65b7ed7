//! `ParserBank`: dispatches each walked file to its parser tier,
//! respects the per-file timeout, and always produces a `SourceFile` even
//! when parsing itself failed.
//!
//! Uses `rayon`'s `par_iter` to parse files concurrently, dispatching per
//! `ParserTier`, and enforces a wall-clock timeout per file so a single
//! parser taking pathologically long can't stall the whole run.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use language_router::{Language, ParserTier};
use rayon::prelude::*;
use source_model::{ParseResult, SourceFile};

use crate::config::AnalysisConfig;
use crate::error::Diagnostic;
use crate::walker::WalkedSource;

pub struct ParsedFile {
    pub source: SourceFile,
}

/// Parses every walked file, running the AST and regex tiers in parallel
/// across files via rayon. `TypesOnly` files are still parsed (their
/// declarations matter for the module graph) but flow through the regex
/// tier, since no tier is dedicated to type-only extraction beyond that.
pub fn parse_all(files: Vec<WalkedSource>, config: &AnalysisConfig) -> (Vec<ParsedFile>, Vec<Diagnostic>) {
    let results: Vec<Result<ParsedFile, Diagnostic>> = files
        .into_par_iter()
        .map(|file| parse_one(file, config))
        .collect();

    let mut parsed = Vec::with_capacity(results.len());
    let mut diagnostics = Vec::new();
    for result in results {
        match result {
            Ok(p) => parsed.push(p),
            Err(d) => diagnostics.push(d),
        }
    }
    (parsed, diagnostics)
}

fn parse_one(file: WalkedSource, config: &AnalysisConfig) -> Result<ParsedFile, Diagnostic> {
    let WalkedSource { path, language, tier, content } = file;
    let path_str = path.display().to_string();
    let line_count = content.lines().count() as u32;
    let bytes = content.len() as u64;

    let parse_result = run_with_timeout(language, &path_str, content, tier, config.parse_timeout_ms)
        .ok_or_else(|| Diagnostic::Timeout { path: path_str.clone() })?;

    Ok(ParsedFile {
        source: SourceFile {
            path: path_str,
            language,
            bytes,
            line_count,
            parse_result,
        },
    })
}

/// Runs the appropriate parser on its own thread, bounded by
/// `timeout_ms`. A parser that blows past the deadline is abandoned (its
/// thread keeps running to completion in the background, since a one-shot
/// run cares more about correctness than resource reclamation) and the
/// file is recorded as timed out rather than included with stale or
/// partial data.
fn run_with_timeout(
    language: Language,
    path: &str,
    content: String,
    tier: ParserTier,
    timeout_ms: u64,
) -> Option<ParseResult> {
    let (tx, rx) = mpsc::channel();
    let path_owned = path.to_string();
    std::thread::spawn(move || {
        let result = dispatch(language, &path_owned, &content, tier);
        let _ = tx.send(result);
    });
    rx.recv_timeout(Duration::from_millis(timeout_ms)).ok()
}

fn dispatch(language: Language, path: &str, content: &str, tier: ParserTier) -> ParseResult {
    match tier {
        ParserTier::Ast => ast_parser::parse(language, path, content),
        ParserTier::Regex | ParserTier::TypesOnly => regex_parsers::parse(language, path, content),
    }
}

#[allow(dead_code)]
fn is_binary_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("png" | "jpg" | "jpeg" | "gif" | "ico" | "woff" | "woff2" | "ttf" | "zip" | "wasm")
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_a_batch_of_mixed_language_files() {
        let files = vec![
            WalkedSource {
                path: "a.ts".into(),
                language: Language::TypeScript,
                tier: ParserTier::Ast,
                content: "export const a = 1;\n".to_string(),
            },
            WalkedSource {
                path: "b.py".into(),
                language: Language::Python,
                tier: ParserTier::Regex,
                content: "def b():\n    pass\n".to_string(),
            },
        ];
        let config = AnalysisConfig::default();
        let (parsed, diagnostics) = parse_all(files, &config);
        assert_eq!(parsed.len(), 2);
        assert!(diagnostics.is_empty());
    }
}
