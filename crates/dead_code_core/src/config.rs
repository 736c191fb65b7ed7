//! `AnalysisConfig`: a `serde`-deserializable JSON-facing struct is
//! validated and compiled (globs -> `globset::GlobSet`, regex strings ->
//! `regex::RegexSet`) into an internal struct the rest of the pipeline
//! uses, instead of re-compiling patterns on every match.

use std::collections::BTreeMap;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::RegexSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The default DI/framework decorator set recognized as entry-point
/// markers, covering Spring, NestJS, Angular, TypeORM, and Django-like
/// patterns.
pub const DEFAULT_DI_DECORATORS: &[&str] = &[
    "Component",
    "Injectable",
    "Controller",
    "Module",
    "NgModule",
    "Entity",
    "Service",
    "Directive",
    "Pipe",
    "Repository",
    "RestController",
    "Configuration",
    "SpringBootApplication",
    "Bean",
];

/// Default DI-container-call textual patterns.
pub const DEFAULT_DI_CONTAINER_PATTERNS: &[&str] = &[
    r"Container\.get<",
    r"container\.resolve<",
    r"moduleRef\.get<",
    r"\.get\(Symbol\.for\(",
];

/// Default dynamic `package.json` fields searched recursively.
pub const DEFAULT_DYNAMIC_PACKAGE_FIELDS: &[&str] =
    &["nodes", "plugins", "credentials", "extensions", "adapters", "connectors"];

/// Default per-directory ignore filename.
pub const IGNORE_FILENAME: &str = ".deadcodeignore";

/// Default bundler config filenames.
pub const DEFAULT_BUNDLER_CONFIGS: &[&str] = &[
    "webpack.config.js",
    "webpack.config.ts",
    "webpack.config.cjs",
    "vite.config.js",
    "vite.config.ts",
    "rollup.config.js",
    "rollup.config.ts",
    "esbuild.config.js",
    "esbuild.config.ts",
    "next.config.js",
    "next.config.ts",
    "metro.config.js",
];

/// Default test-framework glob sets, keyed by framework name.
pub fn default_test_patterns() -> BTreeMap<String, Vec<String>> {
    let mut m = BTreeMap::new();
    m.insert(
        "jest-vitest".to_string(),
        vec![
            "**/*.test.{js,jsx,ts,tsx}".to_string(),
            "**/*.spec.{js,jsx,ts,tsx}".to_string(),
            "**/__tests__/**".to_string(),
        ],
    );
    m.insert(
        "pytest".to_string(),
        vec!["**/test_*.py".to_string(), "**/*_test.py".to_string(), "**/tests/**".to_string()],
    );
    m.insert("go-test".to_string(), vec!["**/*_test.go".to_string()]);
    m.insert(
        "rust-test".to_string(),
        vec!["**/tests/**/*.rs".to_string()],
    );
    m.insert(
        "jvm-test".to_string(),
        vec!["**/src/test/**".to_string()],
    );
    m.insert("ruby-rspec".to_string(), vec!["**/spec/**/*_spec.rb".to_string()]);
    m
}

pub const DEFAULT_GENERATED_PATTERNS: &[&str] = &[
    "**/*.pb.go",
    "**/*_pb2.py",
    "**/*.g.dart",
    "**/*.generated.*",
    "**/generated/**",
];

pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "**/.git/**",
    "**/node_modules/**",
    "**/target/**",
    "**/dist/**",
    "**/build/**",
    "**/.next/**",
    "**/vendor/**",
    "**/.venv/**",
    "**/__pycache__/**",
];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid glob pattern {0:?}: {1}")]
    InvalidGlob(String, String),
    #[error("invalid regex pattern {0:?}: {1}")]
    InvalidRegex(String, String),
}

/// JSON-serializable config surface, deserialized with `serde` and
/// validated with `schemars`-derived JSON Schema for collaborators that
/// want to validate config files before calling in.
#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisJsonConfig {
    pub ignore_patterns: Vec<String>,
    pub dynamic_patterns: Vec<String>,
    pub di_decorators: Vec<String>,
    pub di_container_patterns: Vec<String>,
    pub dynamic_package_fields: Vec<String>,
    pub test_patterns: BTreeMap<String, Vec<String>>,
    pub bundler_configs: Vec<String>,
    pub generated_patterns: Vec<String>,
    pub max_file_bytes: Option<u64>,
    pub parse_timeout_ms: Option<u64>,
    pub parallel_parsers: Option<usize>,
    /// Allow a type-only export to be excluded from the dead-export set
    /// even when its concrete implementation isn't independently used.
    pub allow_unused_types: Option<bool>,
}

fn compile_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|e| ConfigError::InvalidGlob(pat.clone(), e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ConfigError::InvalidGlob("<set>".to_string(), e.to_string()))
}

fn compile_regexset(patterns: &[String]) -> Result<RegexSet, ConfigError> {
    RegexSet::new(patterns).map_err(|e| ConfigError::InvalidRegex("<set>".to_string(), e.to_string()))
}

/// The compiled, validated config the rest of the pipeline consumes.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub ignore_globs: GlobSet,
    pub ignore_patterns: Vec<String>,
    pub dynamic_patterns: Vec<Glob>,
    pub dynamic_globset: GlobSet,
    pub di_decorators: Vec<String>,
    pub di_container_patterns: RegexSet,
    pub di_container_raw: Vec<String>,
    pub dynamic_package_fields: Vec<String>,
    pub test_patterns: BTreeMap<String, GlobSet>,
    pub bundler_configs: Vec<String>,
    pub generated_globs: GlobSet,
    pub max_file_bytes: u64,
    pub parse_timeout_ms: u64,
    pub parallel_parsers: usize,
    pub allow_unused_types: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig::try_from(AnalysisJsonConfig::default()).expect("default config must compile")
    }
}

impl TryFrom<AnalysisJsonConfig> for AnalysisConfig {
    type Error = ConfigError;

    fn try_from(value: AnalysisJsonConfig) -> Result<Self, Self::Error> {
        let mut ignore_patterns = DEFAULT_IGNORE_PATTERNS
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        ignore_patterns.extend(value.ignore_patterns);

        let mut generated_patterns = DEFAULT_GENERATED_PATTERNS
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        generated_patterns.extend(value.generated_patterns);

        let dynamic_globs: Vec<Glob> = value
            .dynamic_patterns
            .iter()
            .map(|p| Glob::new(p).map_err(|e| ConfigError::InvalidGlob(p.clone(), e.to_string())))
            .collect::<Result<_, _>>()?;
        let mut dynamic_builder = GlobSetBuilder::new();
        for g in &dynamic_globs {
            dynamic_builder.add(g.clone());
        }

        let mut di_decorators: Vec<String> =
            DEFAULT_DI_DECORATORS.iter().map(|s| s.to_string()).collect();
        di_decorators.extend(value.di_decorators);
        di_decorators.sort();
        di_decorators.dedup();

        let mut di_container_raw: Vec<String> = DEFAULT_DI_CONTAINER_PATTERNS
            .iter()
            .map(|s| s.to_string())
            .collect();
        di_container_raw.extend(value.di_container_patterns);

        let mut dynamic_package_fields: Vec<String> = DEFAULT_DYNAMIC_PACKAGE_FIELDS
            .iter()
            .map(|s| s.to_string())
            .collect();
        dynamic_package_fields.extend(value.dynamic_package_fields);
        dynamic_package_fields.sort();
        dynamic_package_fields.dedup();

        let mut test_patterns_raw = default_test_patterns();
        for (name, globs) in value.test_patterns {
            test_patterns_raw.entry(name).or_default().extend(globs);
        }
        let mut test_patterns = BTreeMap::new();
        for (name, globs) in test_patterns_raw {
            test_patterns.insert(name, compile_globset(&globs)?);
        }

        let mut bundler_configs: Vec<String> =
            DEFAULT_BUNDLER_CONFIGS.iter().map(|s| s.to_string()).collect();
        bundler_configs.extend(value.bundler_configs);
        bundler_configs.sort();
        bundler_configs.dedup();

        Ok(AnalysisConfig {
            ignore_globs: compile_globset(&ignore_patterns)?,
            ignore_patterns,
            dynamic_globset: dynamic_builder
                .build()
                .map_err(|e| ConfigError::InvalidGlob("<dynamic>".to_string(), e.to_string()))?,
            dynamic_patterns: dynamic_globs,
            di_decorators,
            di_container_patterns: compile_regexset(&di_container_raw)?,
            di_container_raw,
            dynamic_package_fields,
            test_patterns,
            bundler_configs,
            generated_globs: compile_globset(&generated_patterns)?,
            max_file_bytes: value.max_file_bytes.unwrap_or(2 * 1024 * 1024),
            parse_timeout_ms: value.parse_timeout_ms.unwrap_or(5_000),
            parallel_parsers: value.parallel_parsers.unwrap_or(8).max(1),
            allow_unused_types: value.allow_unused_types.unwrap_or(false),
        })
    }
}

impl AnalysisConfig {
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.ignore_globs.is_match(relative_path)
    }

    pub fn is_generated(&self, relative_path: &str) -> bool {
        self.generated_globs.is_match(relative_path)
    }

    pub fn matched_dynamic_pattern(&self, relative_path: &str) -> Option<String> {
        self.dynamic_globset
            .matches(relative_path)
            .first()
            .map(|&idx| self.dynamic_patterns[idx].glob().to_string())
    }

    pub fn is_test_path(&self, relative_path: &str) -> bool {
        self.test_patterns.values().any(|set| set.is_match(relative_path))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_config_compiles() {
        let cfg = AnalysisConfig::default();
        assert!(cfg.is_ignored("node_modules/foo/index.js"));
        assert!(!cfg.is_ignored("src/index.ts"));
    }

    #[test]
    fn user_dynamic_patterns_merge_with_defaults() {
        let json = AnalysisJsonConfig {
            dynamic_patterns: vec!["plugins/*.ts".to_string()],
            ..Default::default()
        };
        let cfg = AnalysisConfig::try_from(json).unwrap();
        assert_eq!(
            cfg.matched_dynamic_pattern("plugins/p1.ts"),
            Some("plugins/*.ts".to_string())
        );
        assert_eq!(cfg.matched_dynamic_pattern("src/index.ts"), None);
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let json = AnalysisJsonConfig {
            ignore_patterns: vec!["[unclosed".to_string()],
            ..Default::default()
        };
        assert!(AnalysisConfig::try_from(json).is_err());
    }
}
