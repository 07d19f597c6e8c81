use crate::model::Todo;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_LIST: &str = "default_list.json";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub width: i32,
    pub height: i32,
    pub left: i32,
    pub top: i32,
    #[serde(rename = "currentList")]
    pub current_list: String,
}

impl Config {
    /// Zero geometry and the default list name.
    pub fn fallback() -> Self {
        let mut config = Config::default();
        config.ensure_list_name();
        config
    }

    fn ensure_list_name(&mut self) {
        if self.current_list.is_empty() {
            self.current_list = DEFAULT_LIST.to_string();
        }
    }
}

/// Reads the configuration. A missing file yields defaults; a malformed one is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
        let config: Config = serde_json::from_str(&data)
            .with_context(|| format!("parsing config file {:?}", path))?;
        tracing::debug!(path = %path.display(), "read config file");
        config
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Config::default()
    };
    config.ensure_list_name();
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let serialized = serde_json::to_string(config).context("serializing config")?;
    fs::write(path, serialized).with_context(|| format!("writing {:?}", path))?;
    tracing::debug!(path = %path.display(), "saved config file");
    Ok(())
}

/// Reads a list file. A missing file yields an empty list; a malformed one is an error.
pub fn load_list(path: &Path) -> Result<Vec<Todo>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no list file, starting empty");
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let todos: Vec<Todo> =
        serde_json::from_str(&data).with_context(|| format!("parsing list file {:?}", path))?;
    tracing::debug!(path = %path.display(), items = todos.len(), "read todo list");
    Ok(todos)
}

pub fn save_list(path: &Path, todos: &[Todo]) -> Result<()> {
    let serialized = serde_json::to_string(todos).context("serializing todo list")?;
    fs::write(path, serialized).with_context(|| format!("writing {:?}", path))?;
    tracing::debug!(path = %path.display(), items = todos.len(), "saved todo list");
    Ok(())
}

/// The list file sits next to the config file.
pub fn list_path(config_path: &Path, config: &Config) -> PathBuf {
    match config_path.parent() {
        Some(dir) => dir.join(&config.current_list),
        None => PathBuf::from(&config.current_list),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_config_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(
            config,
            Config {
                width: 0,
                height: 0,
                left: 0,
                top: 0,
                current_list: DEFAULT_LIST.into(),
            }
        );
    }

    #[test]
    fn empty_list_name_is_defaulted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"width":300,"height":500,"left":10,"top":20,"currentList":""}"#)
            .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.width, 300);
        assert_eq!(config.top, 20);
        assert_eq!(config.current_list, DEFAULT_LIST);
    }

    #[test]
    fn partial_config_keeps_zero_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"currentList":"groceries.json"}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.width, 0);
        assert_eq!(config.current_list, "groceries.json");
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "{not json").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn config_uses_current_list_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        let config = Config {
            width: 60,
            height: 20,
            left: 4,
            top: 2,
            current_list: "work.json".into(),
        };
        save_config(&path, &config).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            r#"{"width":60,"height":20,"left":4,"top":2,"currentList":"work.json"}"#
        );
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn missing_list_is_empty() {
        let tmp = TempDir::new().unwrap();
        let todos = load_list(&tmp.path().join(DEFAULT_LIST)).unwrap();
        assert!(todos.is_empty());
    }

    #[test]
    fn malformed_list_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_LIST);
        fs::write(&path, r#"[{"done":"yes"}]"#).unwrap();
        assert!(load_list(&path).is_err());
    }

    #[test]
    fn list_file_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_LIST);
        let todos = vec![
            Todo {
                done: true,
                text: "water plants".into(),
            },
            Todo {
                done: false,
                text: "call \"mom\"".into(),
            },
        ];
        save_list(&path, &todos).unwrap();
        assert_eq!(load_list(&path).unwrap(), todos);
    }

    #[test]
    fn list_path_is_relative_to_config() {
        let config = Config {
            current_list: "work.json".into(),
            ..Config::default()
        };
        assert_eq!(
            list_path(Path::new("/tmp/todo/config.json"), &config),
            PathBuf::from("/tmp/todo/work.json")
        );
        assert_eq!(
            list_path(Path::new("config.json"), &config),
            PathBuf::from("work.json")
        );
    }
}
