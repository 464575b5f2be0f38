use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub extension_store: String,
    pub project_store: String,
    pub log_filter: String,
    pub history_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extension_store: "./data/extension_prefs.json".into(),
            project_store: "./data/project_prefs.json".into(),
            log_filter: "warn".into(),
            history_limit: 20,
        }
    }
}

/// Defaults, then the optional TOML file at `path`, then environment overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<Settings>(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

pub(crate) fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("PREFS_EXTENSION_STORE") {
        settings.extension_store = v;
    }
    if let Some(v) = lookup("APP__EXTENSION_STORE") {
        settings.extension_store = v;
    }

    if let Some(v) = lookup("PREFS_PROJECT_STORE") {
        settings.project_store = v;
    }
    if let Some(v) = lookup("APP__PROJECT_STORE") {
        settings.project_store = v;
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = lookup("APP__HISTORY_LIMIT") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.history_limit = parsed;
        }
    }
}

/// Normalizes a configured store path and creates its parent directory.
///
/// A blank path falls back to `fallback`.
pub fn prepare_store_path(raw: &str, fallback: &str) -> anyhow::Result<PathBuf> {
    let raw = raw.trim();
    let path = if raw.is_empty() {
        PathBuf::from(fallback)
    } else {
        PathBuf::from(raw.replace('\\', "/"))
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create parent directory '{}' for store '{}'",
                parent.display(),
                path.display()
            )
        })?;
    }

    Ok(path)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
