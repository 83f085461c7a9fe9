use crate::core::db::ConnectionOptions;
use crate::core::{GameDbError, Result};
use crate::datasets::Dataset;
use crate::demo::SeedPolicy;
use crate::report::OutputFormat;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "gamedb";
const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Database file and connection settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
    pub foreign_keys: Option<bool>,
    pub busy_timeout_ms: Option<u64>,
}

/// Demo driver settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemoConfig {
    pub dataset: Option<Dataset>,
    pub seed: Option<SeedPolicy>,
    pub view_id: Option<i64>,
}

/// Report output settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
}

impl DatabaseConfig {
    /// Connection options with unset fields taken from the defaults
    pub fn connection_options(&self) -> ConnectionOptions {
        let defaults = ConnectionOptions::default();
        ConnectionOptions {
            foreign_keys: self.foreign_keys.unwrap_or(defaults.foreign_keys),
            busy_timeout: self
                .busy_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.busy_timeout),
        }
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = gamedb::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| GameDbError::Config(format!("{}: {}", path.display(), e)))?;
    parse_config(&content)
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| GameDbError::Config(e.to_string()))
}

/// Location of the per-user configuration file, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}

/// Loads the per-user configuration, falling back to defaults when the
/// file does not exist.
pub fn load_default_config() -> Result<Config> {
    match default_config_path() {
        Some(path) if path.exists() => load_config(path),
        _ => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"
[database]
path = "/tmp/games.db"
foreign_keys = false
busy_timeout_ms = 250

[demo]
dataset = "games"
seed = "if-empty"
view_id = 2

[output]
format = "json"
"#;

    #[test]
    fn test_parse_config() {
        let config = parse_config(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/games.db")));
        assert_eq!(config.demo.dataset, Some(Dataset::Games));
        assert_eq!(config.demo.seed, Some(SeedPolicy::IfEmpty));
        assert_eq!(config.demo.view_id, Some(2));
        assert_eq!(config.output.format, Some(OutputFormat::Json));

        let options = config.database.connection_options();
        assert!(!options.foreign_keys);
        assert_eq!(options.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.database.path.is_none());
        assert_eq!(config.database.connection_options(), ConnectionOptions::default());
    }

    #[test]
    fn test_invalid_config() {
        match parse_config("[demo]\ndataset = \"arcade\"\n").unwrap_err() {
            GameDbError::Config(_) => {}
            other => panic!("Expected Config error, got {other:?}"),
        }
        assert!(parse_config("[unknown]\nkey = 1\n").is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();
        assert_eq!(load_config(&path).unwrap().demo.view_id, Some(2));

        let missing = load_config(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, GameDbError::Config(_)));
    }
}
