use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use registrar_core::config::AppConfig;
use serde::Serialize;
use toml::Value;

use crate::commands::{to_details, CommandResult};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

/// Effective configuration with the layer each value came from.
pub fn run(config: &AppConfig, explicit_path: Option<&Path>) -> CommandResult {
    let config_file_path = detect_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key: &str, env_keys: &[&str]| {
        field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let entries = vec![
        ConfigEntry {
            key: "api.base_url",
            value: config.api.base_url.clone(),
            source: source("api.base_url", &["REGISTRAR_API_BASE_URL"]),
        },
        ConfigEntry {
            key: "api.timeout_secs",
            value: config.api.timeout_secs.to_string(),
            source: source("api.timeout_secs", &["REGISTRAR_API_TIMEOUT_SECS"]),
        },
        ConfigEntry {
            key: "session.store_path",
            value: config.session.store_path.display().to_string(),
            source: source("session.store_path", &["REGISTRAR_SESSION_STORE_PATH"]),
        },
        ConfigEntry {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", &["REGISTRAR_LOGGING_LEVEL", "REGISTRAR_LOG_LEVEL"]),
        },
        ConfigEntry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source: source(
                "logging.format",
                &["REGISTRAR_LOGGING_FORMAT", "REGISTRAR_LOG_FORMAT"],
            ),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.iter().map(render_line));

    CommandResult::success_with_details("config", lines.join("\n"), to_details(&entries))
}

fn detect_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("registrar.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/registrar.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env_value_present(key)) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

// Blank variables are skipped by the loader, so they never count as a source.
fn env_value_present(key: &str) -> bool {
    env::var(key).is_ok_and(|value| !value.trim().is_empty())
}

fn render_line(entry: &ConfigEntry) -> String {
    format!("- {} = {} (source: {})", entry.key, entry.value, entry.source)
}
