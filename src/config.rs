use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    pub user: UserConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// The acting identity resolved at the request/CLI boundary.
///
/// Library operations take an explicit user id; this section only tells the
/// boundary layer which user row to resolve (creating it on first use).
#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummarizerConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// What to do when the provider call fails: "preview" caches a local
    /// content preview in place of a summary, "fail" surfaces the error.
    #[serde(default = "default_on_error")]
    pub on_error: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            default_model: default_model(),
            timeout_secs: default_timeout_secs(),
            on_error: default_on_error(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.deepseek.com".to_string()
}
fn default_model() -> String {
    "deepseek-chat".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_on_error() -> String {
    "preview".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.markdown".to_string()]
}

impl SummarizerConfig {
    pub fn degrade_to_preview(&self) -> bool {
        self.on_error == "preview"
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.user.email.trim().is_empty() {
        anyhow::bail!("user.email must not be empty");
    }

    if config.summarizer.timeout_secs == 0 {
        anyhow::bail!("summarizer.timeout_secs must be > 0");
    }

    match config.summarizer.on_error.as_str() {
        "preview" | "fail" => {}
        other => anyhow::bail!(
            "Unknown summarizer.on_error policy: '{}'. Must be preview or fail.",
            other
        ),
    }

    Ok(config)
}
