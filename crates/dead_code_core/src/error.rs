//! The analyzer's error taxonomy. Only `ProjectNotFound` is fatal — every
//! other variant is recorded in `AnalysisReport::diagnostics` and the
//! offending path is skipped, never aborting the run: a per-file error
//! logs and continues rather than bubbling into the whole walk.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("project root not found: {0}")]
    ProjectNotFound(PathBuf),
}

/// A single recoverable failure, attributed to the path that caused it.
/// These never abort analysis; they accumulate into
/// `AnalysisReport::diagnostics`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    #[serde(rename_all = "camelCase")]
    IoError { path: String, reason: String },
    #[serde(rename_all = "camelCase")]
    ParseError { path: String, reason: String },
    #[serde(rename_all = "camelCase")]
    Timeout { path: String },
    #[serde(rename_all = "camelCase")]
    ResolutionFailure {
        path: String,
        line: u32,
        raw_module: Option<String>,
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    EmptyGlobExpansion { path: String, line: u32, pattern: String },
    #[serde(rename_all = "camelCase")]
    UnresolvedNamedImport {
        path: String,
        name: String,
        reason: String,
    },
}
