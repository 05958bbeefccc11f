//! Client settings: defaults, then a TOML file, then environment overrides.

use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "rx_desk.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            page_size: 10,
            request_timeout_secs: 15,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    fn apply_file(&mut self, file_cfg: &HashMap<String, toml::Value>) {
        if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
            self.api_base_url = v.to_string();
        }
        if let Some(v) = file_cfg.get("page_size").and_then(toml::Value::as_integer) {
            match u32::try_from(v) {
                Ok(size) if size > 0 => self.page_size = size,
                _ => warn!(page_size = v, "config: ignoring invalid page_size"),
            }
        }
        if let Some(v) = file_cfg
            .get("request_timeout_secs")
            .and_then(toml::Value::as_integer)
        {
            match u64::try_from(v) {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => warn!(request_timeout_secs = v, "config: ignoring negative timeout"),
            }
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("RX_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("APP__API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("APP__PAGE_SIZE") {
            match v.parse::<u32>() {
                Ok(size) if size > 0 => self.page_size = size,
                _ => warn!(value = %v, "config: ignoring invalid APP__PAGE_SIZE"),
            }
        }
        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_secs = parsed;
            }
        }
    }
}

/// Loads settings from `path` (or [`DEFAULT_CONFIG_FILE`] in the working
/// directory) and the process environment.
pub fn load_settings(path: Option<&Path>) -> ClientSettings {
    let raw = read_settings_file(path);
    load_settings_from(raw.as_deref(), |name| {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    })
}

/// A missing default file is normal; a missing explicit one is worth a warning.
pub(crate) fn read_settings_file(path: Option<&Path>) -> Option<String> {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(err) if explicit => {
            warn!(path = %path.display(), "config: cannot read settings file: {err}");
            None
        }
        Err(_) => None,
    }
}

pub(crate) fn load_settings_from(
    file_contents: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<HashMap<String, toml::Value>>(raw) {
            Ok(file_cfg) => settings.apply_file(&file_cfg),
            Err(err) => warn!("config: failed to parse settings file: {err}"),
        }
    }

    settings.apply_env(lookup);
    settings.api_base_url = settings.api_base_url.trim_end_matches('/').to_string();
    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
