//! Configuration for rulebook.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line `--source` flags (handled by the CLI)
//! 2. Environment variables (RULEBOOK_SOURCES, RULEBOOK_STRICT)
//! 3. Config file (.rulebook/config.yaml)
//! 4. Defaults (./rules)
//!
//! Config file discovery:
//! - Searches current directory and parents for .rulebook/config.yaml
//! - Falls back to ~/.rulebook/config.yaml
//! - Source patterns in the config file are relative to the project root
//!   (the directory containing .rulebook/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::registry::ValidationPolicy;
use crate::source::watcher::DEFAULT_DEBOUNCE;
use crate::source::ContentSource;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Source location used when nothing else is configured
pub const DEFAULT_SOURCE: &str = "rules";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    /// Files, directories or globs holding records and sections
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub validation: Option<ValidationConfig>,
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub watch: Option<WatchConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    pub placeholder_markers: Option<Vec<String>>,
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub debounce_ms: Option<u64>,
}

/// Environment overrides, read once so resolution stays testable
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// Comma-separated source patterns
    pub sources: Option<String>,
    pub strict: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            sources: std::env::var("RULEBOOK_SOURCES").ok(),
            strict: std::env::var("RULEBOOK_STRICT").ok(),
        }
    }
}

/// Resolved configuration with absolute source patterns
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Source patterns, relative ones already joined to their base
    pub sources: Vec<String>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Validation settings
    pub validation: ValidationPolicy,
    /// Default cap on search results
    pub search_limit: Option<usize>,
    /// Watcher debounce window
    pub watch_debounce: Duration,
}

impl ResolvedConfig {
    /// Content source for the configured patterns
    pub fn content_source(&self) -> ContentSource {
        ContentSource::new(self.sources.clone())
    }
}

/// Find config file by searching current directory and parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".rulebook").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".rulebook").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a pattern that may be relative to `base`
fn resolve_pattern(base: &Path, pattern: &str) -> String {
    let path = Path::new(pattern);
    if path.is_absolute() {
        pattern.to_string()
    } else {
        base.join(path).to_string_lossy().into_owned()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Merge config file, environment and defaults
fn resolve_config(
    cwd: &Path,
    config_file: Option<(PathBuf, ConfigFile)>,
    env: &EnvOverrides,
) -> ResolvedConfig {
    let (config_path, file) = match config_file {
        Some((path, file)) => (Some(path), Some(file)),
        None => (None, None),
    };

    // Base directory is the parent of .rulebook/ (i.e., grandparent of config.yaml)
    let base_dir = config_path
        .as_deref()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .unwrap_or(cwd)
        .to_path_buf();

    let sources = if let Some(env_sources) = env.sources.as_deref().filter(|s| !s.trim().is_empty()) {
        env_sources
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| resolve_pattern(cwd, s))
            .collect()
    } else if let Some(file) = file.as_ref().filter(|f| !f.sources.is_empty()) {
        file.sources
            .iter()
            .map(|s| resolve_pattern(&base_dir, s))
            .collect()
    } else {
        vec![resolve_pattern(&base_dir, DEFAULT_SOURCE)]
    };

    let validation_file = file.as_ref().and_then(|f| f.validation.as_ref());
    let mut validation = ValidationPolicy::default();
    if let Some(markers) = validation_file.and_then(|v| v.placeholder_markers.clone()) {
        validation.placeholder_markers = markers;
    }
    validation.strict = env
        .strict
        .as_deref()
        .and_then(parse_flag)
        .or_else(|| validation_file.and_then(|v| v.strict))
        .unwrap_or(false);

    let search_limit = file.as_ref().and_then(|f| f.search.as_ref()).and_then(|s| s.limit);

    let watch_debounce = file
        .as_ref()
        .and_then(|f| f.watch.as_ref())
        .and_then(|w| w.debounce_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_DEBOUNCE);

    ResolvedConfig {
        sources,
        config_file: config_path,
        validation,
        search_limit,
        watch_debounce,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    let config_file = match find_config_file(&cwd) {
        Some(path) => {
            let file = load_config_file(&path)?;
            Some((path, file))
        }
        None => None,
    };

    Ok(resolve_config(&cwd, config_file, &EnvOverrides::from_env()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Configuration from environment and defaults only, skipping any config file
pub fn defaults() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(resolve_config(&cwd, None, &EnvOverrides::from_env()))
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(root: &Path, body: &str) -> PathBuf {
        let dir = root.join(".rulebook");
        std::fs::create_dir_all(&dir).unwrap();
        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "{}", body).unwrap();
        config_path
    }

    #[test]
    fn test_defaults_without_file() {
        let cwd = PathBuf::from("/work/site");
        let config = resolve_config(&cwd, None, &EnvOverrides::default());

        assert_eq!(config.sources, vec!["/work/site/rules".to_string()]);
        assert!(config.config_file.is_none());
        assert_eq!(config.validation, ValidationPolicy::default());
        assert_eq!(config.search_limit, None);
        assert_eq!(config.watch_debounce, DEFAULT_DEBOUNCE);
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            temp.path(),
            r#"
version: "1.0"
sources:
  - content/rules
  - /abs/extra.yaml
validation:
  placeholder_markers: ["TODO", "Write the rule"]
  strict: true
search:
  limit: 5
watch:
  debounce_ms: 250
"#,
        );

        let file = load_config_file(&config_path).unwrap();
        assert_eq!(file.version, "1.0");
        assert_eq!(file.sources.len(), 2);

        let cwd = temp.path().join("nested");
        let config = resolve_config(&cwd, Some((config_path.clone(), file)), &EnvOverrides::default());

        assert_eq!(
            config.sources,
            vec![
                temp.path().join("content/rules").to_string_lossy().into_owned(),
                "/abs/extra.yaml".to_string(),
            ]
        );
        assert_eq!(config.config_file, Some(config_path));
        assert_eq!(config.validation.placeholder_markers, vec!["TODO", "Write the rule"]);
        assert!(config.validation.strict);
        assert_eq!(config.search_limit, Some(5));
        assert_eq!(config.watch_debounce, Duration::from_millis(250));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(
            temp.path(),
            "version: \"1.0\"\nsources: [content]\nvalidation:\n  strict: true\n",
        );
        let file = load_config_file(&config_path).unwrap();

        let env = EnvOverrides {
            sources: Some("a.yaml, /b/*.json".to_string()),
            strict: Some("false".to_string()),
        };
        let cwd = PathBuf::from("/cwd");
        let config = resolve_config(&cwd, Some((config_path, file)), &env);

        assert_eq!(
            config.sources,
            vec!["/cwd/a.yaml".to_string(), "/b/*.json".to_string()]
        );
        assert!(!config.validation.strict);
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(temp.path(), "version: \"1.0\"");
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_file(&nested), Some(config_path));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_resolve_pattern() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(resolve_pattern(&base, "rules/*.yaml"), "/home/user/project/rules/*.yaml");
        assert_eq!(resolve_pattern(&base, "/absolute/rules"), "/absolute/rules");
    }
}
