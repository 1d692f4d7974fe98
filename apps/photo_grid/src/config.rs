use std::{collections::HashMap, fs, path::Path, time::Duration};

use photo_core::{PresentationVariant, DEFAULT_API_BASE, DEFAULT_IMAGE_HOST};
use shared::revision::RevisionEquality;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "photo_grid.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub image_host: String,
    pub tick_interval_ms: u64,
    pub variant: PresentationVariant,
    pub equality: RevisionEquality,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            image_host: DEFAULT_IMAGE_HOST.into(),
            tick_interval_ms: 300,
            variant: PresentationVariant::Diffing,
            equality: RevisionEquality::LengthOnly,
        }
    }
}

impl Settings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn set_tick_interval_ms(&mut self, raw: &str) {
        match raw.trim().parse::<u64>() {
            Ok(parsed) if parsed > 0 => self.tick_interval_ms = parsed,
            _ => warn!(value = raw, "ignoring invalid tick interval"),
        }
    }

    pub fn set_variant(&mut self, raw: &str) {
        match raw.parse() {
            Ok(variant) => self.variant = variant,
            Err(err) => warn!("ignoring presentation variant: {err}"),
        }
    }

    pub fn set_equality(&mut self, raw: &str) {
        match raw.parse() {
            Ok(equality) => self.equality = equality,
            Err(err) => warn!("ignoring equality policy: {err}"),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional config file, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, env);

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, toml::Value>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!("ignoring unreadable config file: {err}");
            return;
        }
    };
    let get = |key: &str| file_cfg.get(key).and_then(value_as_string);

    if let Some(v) = get("api_base") {
        settings.api_base = v;
    }
    if let Some(v) = get("image_host") {
        settings.image_host = v;
    }
    if let Some(v) = get("tick_interval_ms") {
        settings.set_tick_interval_ms(&v);
    }
    if let Some(v) = get("variant") {
        settings.set_variant(&v);
    }
    if let Some(v) = get("equality") {
        settings.set_equality(&v);
    }
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("PHOTO_GRID_API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = env("APP__API_BASE") {
        settings.api_base = v;
    }

    if let Some(v) = env("APP__IMAGE_HOST") {
        settings.image_host = v;
    }

    if let Some(v) = env("APP__TICK_INTERVAL_MS") {
        settings.set_tick_interval_ms(&v);
    }

    if let Some(v) = env("APP__VARIANT") {
        settings.set_variant(&v);
    }

    if let Some(v) = env("APP__EQUALITY") {
        settings.set_equality(&v);
    }
}

fn value_as_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
