//! Configuration for specmap.
//!
//! Configuration sources (highest priority first):
//! 1. `SPECMAP_CONFIG` environment variable naming a config file
//! 2. Config file `.specmap/config.yaml` in the current directory or a parent
//! 3. Config file `~/.specmap/config.yaml`
//! 4. Defaults

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::WorkItemKind;
use crate::mapping::DEFAULT_PLACEHOLDER;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
    #[serde(default)]
    pub mapping: Option<MappingConfig>,
    #[serde(default)]
    pub history: Option<HistoryConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MappingConfig {
    pub placeholder: Option<String>,
    pub kinds: Option<Vec<WorkItemKind>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub ignored_fields: Vec<String>,
    pub date_format: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub fetch: FetchSettings,
    pub mapping: MappingSettings,
    pub history: HistorySettings,
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("specmap/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MappingSettings {
    /// Text shown when a specification cannot be read
    pub placeholder: String,
    /// Order in which kinds are placed by the splitter
    pub kinds: Vec<WorkItemKind>,
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            kinds: WorkItemKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistorySettings {
    /// Extra columns left out of history snapshots
    pub ignored_fields: Vec<String>,
    /// chrono format string for human-readable output
    pub date_format: String,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            ignored_fields: Vec::new(),
            date_format: "%d %b %y %H:%M".to_string(),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("SPECMAP_CONFIG") {
        return Some(PathBuf::from(explicit));
    }

    let mut current = std::env::current_dir().ok()?;
    loop {
        let config_path = current.join(".specmap").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".specmap").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge a parsed config file over the defaults
fn resolve(config: Option<ConfigFile>, config_file: Option<PathBuf>) -> ResolvedConfig {
    let mut fetch = FetchSettings::default();
    let mut mapping = MappingSettings::default();
    let mut history = HistorySettings::default();

    if let Some(config) = config {
        if let Some(f) = config.fetch {
            fetch.timeout_seconds = f.timeout_seconds.unwrap_or(fetch.timeout_seconds);
            fetch.user_agent = f.user_agent.unwrap_or(fetch.user_agent);
        }
        if let Some(m) = config.mapping {
            mapping.placeholder = m.placeholder.unwrap_or(mapping.placeholder);
            mapping.kinds = m.kinds.filter(|k| !k.is_empty()).unwrap_or(mapping.kinds);
        }
        if let Some(h) = config.history {
            history.ignored_fields = h.ignored_fields;
            history.date_format = h.date_format.unwrap_or(history.date_format);
        }
    }

    ResolvedConfig {
        config_file,
        fetch,
        mapping,
        history,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();
    let config = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };
    Ok(resolve(config, config_file))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
