//! Configuration file support for ci-failure-scan.
//!
//! Provides YAML-based configuration through `ci-failure-scan.config.yml`
//! files, including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::scanning::domain::{Pattern, PatternId, PatternKind};
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "ci-failure-scan.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub api_base: Option<String>,
    pub branch: Option<String>,
    pub count: Option<usize>,
    pub token: Option<String>,
    pub workers: Option<usize>,
    pub page_size: Option<usize>,
    pub cache_enabled: Option<bool>,
    pub cache_dir: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
    pub scrub: Option<bool>,
    pub patterns: Option<Vec<PatternEntry>>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// A failure pattern to seed the pattern table with.
#[derive(Debug, Deserialize)]
pub struct PatternEntry {
    pub id: i64,
    pub pattern: String,
    /// Treat `pattern` as a regular expression (default: literal)
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub description: String,
}

impl PatternEntry {
    pub fn to_pattern(&self) -> Pattern {
        let kind = if self.regex {
            PatternKind::Regex
        } else {
            PatternKind::Literal
        };
        Pattern::new(
            PatternId::new(self.id),
            kind,
            self.pattern.clone(),
            self.description.clone(),
        )
    }
}

impl ConfigFile {
    /// Seed patterns declared in the file, if any
    pub fn seed_patterns(&self) -> Option<Vec<Pattern>> {
        self.patterns
            .as_ref()
            .map(|entries| entries.iter().map(PatternEntry::to_pattern).collect())
    }
}

/// Patterns seeded when the config file declares none
pub fn default_seed_patterns() -> Vec<Pattern> {
    vec![
        Pattern::literal(1, "Segmentation fault", "Process crashed with SIGSEGV"),
        Pattern::literal(2, "No space left on device", "Runner disk full"),
        Pattern::literal(3, "CUDA out of memory", "GPU memory exhausted"),
        Pattern::regex(4, r"Killed\s*$", "Process killed, usually by the OOM killer"),
        Pattern::regex(5, r"^FAILED ", "Test failure reported by pytest"),
        Pattern::regex(
            6,
            r"Traceback \(most recent call last\)",
            "Uncaught Python exception",
        ),
        Pattern::regex(7, r"exited with code [1-9][0-9]*", "Non-zero exit status"),
        Pattern::literal(8, "Connection reset by peer", "Network flake"),
    ]
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if config.workers == Some(0) {
        bail!(
            "Invalid config: workers must be at least 1.\n\n\
             💡 Hint: Omit 'workers' to use the default of 8 concurrent scans."
        );
    }

    if config.page_size == Some(0) {
        bail!(
            "Invalid config: page_size must be at least 1.\n\n\
             💡 Hint: The CI provider returns at most 100 builds per page."
        );
    }

    if let Some(ref patterns) = config.patterns {
        let mut seen = HashSet::new();
        for (i, entry) in patterns.iter().enumerate() {
            if entry.pattern.is_empty() {
                bail!(
                    "Invalid config: patterns[{}].pattern must not be empty.\n\n\
                     💡 Hint: An empty pattern would match every log line.",
                    i
                );
            }
            if !seen.insert(entry.id) {
                bail!(
                    "Invalid config: duplicate pattern id {} at patterns[{}].\n\n\
                     💡 Hint: Every pattern needs a unique 'id'; matches are recorded against it.",
                    entry.id,
                    i
                );
            }
            entry.to_pattern().compile().with_context(|| {
                format!("Invalid config: patterns[{}] does not compile", i)
            })?;
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}
