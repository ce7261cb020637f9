use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::*;
use crate::navigation::Trigger;

/// Maps key names (`ArrowLeft`, `t`, ...) to navigation actions. Names are case sensitive.
pub type KeyMap = HashMap<String, Trigger>;

const CONFIG_PATH_ENV_VAR: &str = "CALNAV_CONFIG_FILE";

pub(crate) fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("calnav").join("config.toml"));
    }

    match dirs::home_dir() {
        Some(home) => locations.push(home.join(".calnav.toml")),
        None => log::warn!("Unable to find home directory"),
    }

    locations
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    key_map: KeyMap,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub key_map: KeyMap,
}

impl Default for Config {
    fn default() -> Config {
        let mut config = Config {
            key_map: HashMap::new(),
        };

        config
            .key_map
            .insert("ArrowLeft".to_owned(), Trigger::Previous);
        config.key_map.insert("ArrowRight".to_owned(), Trigger::Next);
        config.key_map.insert("t".to_owned(), Trigger::Today);
        config.key_map.insert("T".to_owned(), Trigger::Today);

        config
    }
}

impl Config {
    /// Bindings from the file are added on top of the default ones.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;

        let mut config = Config::default();
        config.key_map.extend(file.key_map);

        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::new(
                ErrorKind::ConfigNotFound,
                &format!("'{}'", path.display()),
            ),
            _ => Error::from(err),
        })?;

        Config::from_toml_str(&content)
    }

    pub fn trigger_for(&self, key: &str) -> Option<Trigger> {
        self.key_map.get(key).copied()
    }

    pub fn bound_keys(&self) -> String {
        self.key_map.keys().sorted().join(", ")
    }
}

/// Loads `path` if given. Otherwise the first existing default location is
/// used, falling back to the built-in bindings.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        log::info!("Loading config from '{}'", path.display());
        return Config::load(path);
    }

    match find_configfile_locations().into_iter().find(|p| p.is_file()) {
        Some(location) => {
            log::info!("Loading config from '{}'", location.display());
            Config::load(&location)
        }
        None => {
            log::debug!("No config file found, using default key bindings");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings() {
        let config = Config::default();
        assert_eq!(config.trigger_for("ArrowLeft"), Some(Trigger::Previous));
        assert_eq!(config.trigger_for("ArrowRight"), Some(Trigger::Next));
        assert_eq!(config.trigger_for("t"), Some(Trigger::Today));
        assert_eq!(config.trigger_for("T"), Some(Trigger::Today));
        assert_eq!(config.trigger_for("arrowleft"), None);
        assert_eq!(config.bound_keys(), "ArrowLeft, ArrowRight, T, t");
    }

    #[test]
    fn file_bindings_extend_defaults() {
        let config = Config::from_toml_str(
            r#"
            [key_map]
            h = "prev"
            l = "next"
            t = "next"
            "#,
        )
        .unwrap();

        assert_eq!(config.trigger_for("h"), Some(Trigger::Previous));
        assert_eq!(config.trigger_for("l"), Some(Trigger::Next));
        assert_eq!(config.trigger_for("t"), Some(Trigger::Next));
        assert_eq!(config.trigger_for("ArrowLeft"), Some(Trigger::Previous));
    }

    #[test]
    fn empty_file_keeps_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.key_map.len(), Config::default().key_map.len());
    }

    #[test]
    fn unknown_trigger_is_rejected() {
        let err = Config::from_toml_str("[key_map]\nx = \"sideways\"\n").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ConfigParse));
    }

    #[test]
    fn explicit_missing_file_fails() {
        let path = env::temp_dir().join("calnav-does-not-exist.toml");
        let err = load_suitable_config(Some(&path)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ConfigNotFound));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let path = env::temp_dir().join(format!("calnav-test-{}.toml", std::process::id()));
        fs::write(&path, "[key_map]\nPageUp = \"previous\"\n").unwrap();

        let config = load_suitable_config(Some(&path));
        let _ = fs::remove_file(&path);

        assert_eq!(config.unwrap().trigger_for("PageUp"), Some(Trigger::Previous));
    }
}
