//! Connection settings for the hosted catalog
//!
//! Settings are layered: built-in defaults, then `config.toml` in the user's
//! config directory, then environment variables (a `.env` file is loaded into
//! the environment by `main` before this runs).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_BUCKET: &str = "prompt-assets";
const CONFIG_DIR_NAME: &str = "prompt-library";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub endpoint: Option<String>,
    /// Public anon key sent as `apikey` and bearer token
    pub anon_key: Option<String>,
    /// Storage bucket holding prompt attachments
    pub storage_bucket: String,
    /// Open share links and attachments in the browser instead of printing
    pub open_links: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            anon_key: None,
            storage_bucket: DEFAULT_BUCKET.to_string(),
            open_links: false,
        }
    }
}

/// Path of the config file, `~/.config/prompt-library/config.toml` on Linux
pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine the config directory")?;
    Ok(base.join(CONFIG_DIR_NAME).join("config.toml"))
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Defaults, then the config file, then the environment
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Override fields from `PROMPT_LIBRARY_*` (or `SUPABASE_*`) variables
    pub fn apply_env(&mut self) {
        if let Some(url) = first_env(&["PROMPT_LIBRARY_URL", "SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]) {
            self.endpoint = Some(url);
        }
        if let Some(key) = first_env(&[
            "PROMPT_LIBRARY_ANON_KEY",
            "SUPABASE_ANON_KEY",
            "NEXT_PUBLIC_SUPABASE_ANON_KEY",
        ]) {
            self.anon_key = Some(key);
        }
        if let Some(bucket) = first_env(&["PROMPT_LIBRARY_BUCKET"]) {
            self.storage_bucket = bucket;
        }
        if let Some(open) = first_env(&["PROMPT_LIBRARY_OPEN_LINKS"]) {
            self.open_links = open == "1" || open.eq_ignore_ascii_case("true");
        }
    }

    /// Endpoint without a trailing slash, or an empty string when unset
    pub fn endpoint_or_empty(&self) -> &str {
        self.endpoint
            .as_deref()
            .map(|e| e.trim_end_matches('/'))
            .unwrap_or("")
    }

    /// Anon key with all but the first and last four characters hidden
    pub fn masked_key(&self) -> String {
        match &self.anon_key {
            None => "(not set)".to_string(),
            Some(key) if key.chars().count() <= 8 => "*".repeat(key.chars().count()),
            Some(key) => {
                let chars: Vec<char> = key.chars().collect();
                let head: String = chars[..4].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{}...{}", head, tail)
            }
        }
    }
}
