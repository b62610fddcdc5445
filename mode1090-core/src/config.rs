//! Pipeline configuration.
//!
//! Reads/writes a flat, hand-rolled YAML-flavored config file holding the
//! decode pipeline's tuning knobs. Best-effort loading: a missing or
//! malformed file falls back to defaults rather than failing the caller.

use std::path::PathBuf;

use crate::types::AdsbError;

/// Pipeline tuning configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub batch_size: usize,
    pub window_size: usize,
    pub stale_timeout_ns: i64,
    pub purge_interval_ns: i64,
    pub metadata_archive_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            batch_size: 65536,
            window_size: 1200,
            stale_timeout_ns: 60_000_000_000,
            purge_interval_ns: 1_000_000_000,
            metadata_archive_path: None,
        }
    }
}

/// Get the config directory path (`~/.mode1090/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".mode1090")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.mode1090/config.yaml`, falling back to defaults if
/// the file is absent, unreadable, or malformed.
pub fn load_config() -> Config {
    let path = config_file();
    if !path.exists() {
        return Config::default();
    }
    let text = match std::fs::read_to_string(&path) {
        Ok(t) => t,
        Err(_) => return Config::default(),
    };
    parse_config(&text).unwrap_or_default()
}

/// Save config to `~/.mode1090/config.yaml`.
pub fn save_config(config: &Config) -> Result<PathBuf, AdsbError> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir).map_err(|e| AdsbError::Config(e.to_string()))?;

    let path = config_file();
    let text = serialize_config(config);
    std::fs::write(&path, text).map_err(|e| AdsbError::Config(e.to_string()))?;

    Ok(path)
}

/// Parse the flat `key: value` config format.
fn parse_config(text: &str) -> Option<Config> {
    let mut config = Config::default();

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        let (key, val) = stripped.split_once(':')?;
        let key = key.trim();
        let val = val.trim();

        match key {
            "batch_size" => {
                if let Ok(v) = val.parse() {
                    config.batch_size = v;
                }
            }
            "window_size" => {
                if let Ok(v) = val.parse() {
                    config.window_size = v;
                }
            }
            "stale_timeout_ns" => {
                if let Ok(v) = val.parse() {
                    config.stale_timeout_ns = v;
                }
            }
            "purge_interval_ns" => {
                if let Ok(v) = val.parse() {
                    config.purge_interval_ns = v;
                }
            }
            "metadata_archive_path" => {
                config.metadata_archive_path = parse_string_value(val);
            }
            _ => {}
        }
    }

    Some(config)
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    if (val.starts_with('"') && val.ends_with('"')) || (val.starts_with('\'') && val.ends_with('\'')) {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

/// Serialize config to the flat `key: value` format.
fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# mode1090-core pipeline configuration".to_string(), String::new()];

    lines.push(format!("batch_size: {}", config.batch_size));
    lines.push(format!("window_size: {}", config.window_size));
    lines.push(format!("stale_timeout_ns: {}", config.stale_timeout_ns));
    lines.push(format!("purge_interval_ns: {}", config.purge_interval_ns));
    match &config.metadata_archive_path {
        Some(path) => lines.push(format!("metadata_archive_path: \"{path}\"")),
        None => lines.push("metadata_archive_path: null".into()),
    }

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_values() {
        let config = Config::default();
        assert_eq!(config.batch_size, 65536);
        assert_eq!(config.window_size, 1200);
        assert_eq!(config.stale_timeout_ns, 60_000_000_000);
        assert!(config.metadata_archive_path.is_none());
    }

    #[test]
    fn parses_overridden_values() {
        let text = r#"
batch_size: 32768
window_size: 1200
stale_timeout_ns: 30000000000
purge_interval_ns: 500000000
metadata_archive_path: "/var/lib/mode1090/aircraft.zip"
"#;
        let config = parse_config(text).unwrap();
        assert_eq!(config.batch_size, 32768);
        assert_eq!(config.stale_timeout_ns, 30_000_000_000);
        assert_eq!(
            config.metadata_archive_path,
            Some("/var/lib/mode1090/aircraft.zip".to_string())
        );
    }

    #[test]
    fn malformed_line_falls_back_to_defaults_for_that_key() {
        let text = "batch_size: not-a-number\nwindow_size: 900\n";
        let config = parse_config(text).unwrap();
        assert_eq!(config.batch_size, Config::default().batch_size);
        assert_eq!(config.window_size, 900);
    }

    #[test]
    fn roundtrip() {
        let config = Config {
            batch_size: 16384,
            window_size: 1200,
            stale_timeout_ns: 45_000_000_000,
            purge_interval_ns: 2_000_000_000,
            metadata_archive_path: Some("aircraft.zip".to_string()),
        };
        let text = serialize_config(&config);
        let parsed = parse_config(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
