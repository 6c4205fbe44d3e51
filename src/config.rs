use crate::entity::MatchingRule;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "TRANSFORM_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "transform.toml";
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transform: TransformConfig,
}

/// Settings of the generic local transform binary
#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    /// Maltego type of the returned entity
    #[serde(default = "default_entity_type")]
    pub entity_type: String,
    #[serde(default)]
    pub weight: i32,
    /// Matching rule applied to fields copied from the input
    #[serde(default)]
    pub matching_rule: MatchingRule,
    /// Label put on the edge to the returned entity, if any
    #[serde(default)]
    pub edge_label: Option<String>,
    #[serde(default = "default_report_progress")]
    pub report_progress: bool,
    /// Fallback log filter when RUST_LOG is unset. Logs share stderr with
    /// Maltego's debug/progress channel.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            entity_type: default_entity_type(),
            weight: 0,
            matching_rule: MatchingRule::default(),
            edge_label: None,
            report_progress: default_report_progress(),
            log_level: default_log_level(),
        }
    }
}

fn default_entity_type() -> String {
    "maltego.Phrase".to_string()
}

fn default_report_progress() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in TRANSFORM_CONFIG environment variable (must exist)
    /// 2. ./transform.toml in current directory (defaults apply when absent)
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(PathBuf::from(path))?,
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: PathBuf) -> Result<Self> {
        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.transform.entity_type.trim().is_empty() {
            anyhow::bail!("transform.entity_type must not be empty");
        }

        let level = self.transform.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            anyhow::bail!(
                "transform.log_level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.transform.log_level
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide cwd and env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    /// Restores cwd when dropped (e.g. on panic).
    struct CwdGuard(PathBuf);
    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }

    fn with_config_env(config_path: Option<&std::path::Path>, f: impl FnOnce()) {
        let original = std::env::var(CONFIG_ENV).ok();
        match config_path {
            Some(path) => std::env::set_var(CONFIG_ENV, path),
            None => std::env::remove_var(CONFIG_ENV),
        }
        f();
        std::env::remove_var(CONFIG_ENV);
        if let Some(val) = original {
            std::env::set_var(CONFIG_ENV, val);
        }
    }

    #[test]
    fn test_config_load_from_env_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        fs::write(
            &config_path,
            r#"
[transform]
entity_type = "maltego.Domain"
weight = 42
matching_rule = "strict"
edge_label = "found"
report_progress = false
log_level = "debug"
"#,
        )
        .unwrap();

        with_config_env(Some(&config_path), || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.transform.entity_type, "maltego.Domain");
            assert_eq!(config.transform.weight, 42);
            assert_eq!(config.transform.matching_rule, MatchingRule::Strict);
            assert_eq!(config.transform.edge_label.as_deref(), Some("found"));
            assert!(!config.transform.report_progress);
            assert_eq!(config.transform.log_level, "debug");
        });
    }

    #[test]
    fn test_config_defaults_without_file() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        let _cwd = CwdGuard(original_dir);
        std::env::set_current_dir(temp_dir.path()).unwrap();

        with_config_env(None, || {
            let config = Config::load().unwrap();
            assert_eq!(config.transform.entity_type, "maltego.Phrase");
            assert_eq!(config.transform.weight, 0);
            assert_eq!(config.transform.matching_rule, MatchingRule::Loose);
            assert_eq!(config.transform.edge_label, None);
            assert!(config.transform.report_progress);
            assert_eq!(config.transform.log_level, "warn");
        });
    }

    #[test]
    fn test_config_partial_section_uses_defaults() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "[transform]\nweight = 3\n").unwrap();

        with_config_env(Some(&config_path), || {
            let config = Config::load().unwrap();
            assert_eq!(config.transform.weight, 3);
            assert_eq!(config.transform.entity_type, "maltego.Phrase");
        });
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nonexistent.toml");

        with_config_env(Some(&missing), || {
            assert!(Config::load().is_err());
        });
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();

        let config_path = temp_dir.path().join("empty_type.toml");
        fs::write(&config_path, "[transform]\nentity_type = \"  \"\n").unwrap();
        with_config_env(Some(&config_path), || {
            let err = Config::load().unwrap_err();
            assert!(err.to_string().contains("entity_type"));
        });

        let config_path = temp_dir.path().join("bad_level.toml");
        fs::write(&config_path, "[transform]\nlog_level = \"loud\"\n").unwrap();
        with_config_env(Some(&config_path), || {
            let err = Config::load().unwrap_err();
            assert!(err.to_string().contains("log_level"));
        });

        let config_path = temp_dir.path().join("bad_rule.toml");
        fs::write(&config_path, "[transform]\nmatching_rule = \"fuzzy\"\n").unwrap();
        with_config_env(Some(&config_path), || {
            assert!(Config::load().is_err());
        });
    }
}
