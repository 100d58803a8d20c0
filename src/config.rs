//! Runtime configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, an optional JSON file,
//! a `.env` file, and the process environment. The CLI applies its own flags on top.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Image host used when `BASE_URL` is not set.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://nyo.kirisame.jp.net/";

/// The four canonical primitives of the classic crafting games.
pub const DEFAULT_PRIMITIVES: [&str; 4] = ["Air", "Earth", "Fire", "Water"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the element catalog JSON file.
    pub catalog_path: PathBuf,
    /// Base URL that relative image paths are resolved against.
    pub image_base_url: String,
    /// Elements that are seeded as tier 0 regardless of their recipes.
    pub primitives: Vec<String>,
    /// Fail graph construction when tiering leaves elements unresolved.
    pub strict: bool,
    /// Default `tracing` filter directive for binaries.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("./data/elements.json"),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            primitives: DEFAULT_PRIMITIVES.iter().map(|s| s.to_string()).collect(),
            strict: false,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads defaults, then applies `.env` and environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the common case.
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Loads a JSON config file, then applies `.env` and environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        dotenvy::dotenv().ok();
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup. Split out so tests do not have to
    /// mutate the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TSUKURI_CATALOG") {
            self.catalog_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("BASE_URL") {
            self.image_base_url = url;
        }
        if let Some(list) = lookup("TSUKURI_PRIMITIVES") {
            let primitives: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if primitives.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "TSUKURI_PRIMITIVES".to_string(),
                    message: "expected a comma-separated list of element names".to_string(),
                });
            }
            self.primitives = primitives;
        }
        if let Some(value) = lookup("TSUKURI_STRICT") {
            self.strict = parse_bool(&value).ok_or_else(|| ConfigError::InvalidValue {
                key: "TSUKURI_STRICT".to_string(),
                message: format!("'{}' is not a boolean", value),
            })?;
        }
        if let Some(filter) = lookup("TSUKURI_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Turns a raw catalog image path into a URL under `base_url`.
///
/// Scraped paths are relative to the scraper's output directory (`../backend/...`) or
/// rooted (`/public/...`); both collapse to `base_url + path`. Empty paths stay empty.
pub fn resolve_image_path(base_url: &str, raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_string();
    }
    let path = raw.strip_prefix("../backend/").unwrap_or(raw);
    let path = path.trim_start_matches('/');
    if base_url.ends_with('/') {
        format!("{}{}", base_url, path)
    } else {
        format!("{}/{}", base_url, path)
    }
}
