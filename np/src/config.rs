//! NeoPrompt configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tagstore::LoadOptions;

use crate::expander::{DEFAULT_MAX_ROUNDS, ExpanderOptions};

/// Main NeoPrompt configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Where tag files come from
    pub tags: TagsConfig,

    /// Directive expansion settings
    pub expansion: ExpansionConfig,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.expansion.max_rounds == 0 {
            return Err(eyre::eyre!("expansion.max-rounds must be at least 1"));
        }
        if self.tags.extensions.is_empty() {
            return Err(eyre::eyre!("tags.extensions must name at least one extension"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .neoprompt.yml
        let local_config = PathBuf::from(".neoprompt.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/neoprompt/neoprompt.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("neoprompt").join("neoprompt.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are ignored here; `load` reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => [
                Some(PathBuf::from(".neoprompt.yml")),
                dirs::config_dir().map(|d| d.join("neoprompt").join("neoprompt.yml")),
            ]
            .into_iter()
            .flatten()
            .collect(),
        };

        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| Self::load_from_file(p).ok())
            .and_then(|config| config.log_level)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Tag directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    /// Directories searched for tag files; later ones override earlier ones
    pub paths: Vec<String>,

    /// File extensions treated as tag files
    pub extensions: Vec<String>,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            paths: vec!["~/.config/neoprompt/tags".to_string(), ".neoprompt/tags".to_string()],
            extensions: tagstore::DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl TagsConfig {
    /// Expand paths (resolve ~/ and relative paths)
    pub fn expanded_paths(&self) -> Vec<PathBuf> {
        self.paths
            .iter()
            .filter_map(|p| {
                if let Some(rest) = p.strip_prefix("~/") {
                    dirs::home_dir().map(|home| home.join(rest))
                } else {
                    Some(PathBuf::from(p))
                }
            })
            .collect()
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            extensions: self.extensions.clone(),
        }
    }
}

/// Expansion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Rounds allowed for directives nested inside tags
    #[serde(rename = "max-rounds")]
    pub max_rounds: usize,

    /// Fixed random seed for reproducible picks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Report the unexpanded prompt of rewritten channels
    #[serde(rename = "record-originals")]
    pub record_originals: bool,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            seed: None,
            record_originals: false,
        }
    }
}

impl ExpansionConfig {
    pub fn options(&self) -> ExpanderOptions {
        ExpanderOptions {
            max_rounds: self.max_rounds,
            record_originals: self.record_originals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.expansion.max_rounds, 10);
        assert!(!config.expansion.record_originals);
        assert_eq!(config.tags.extensions, vec!["yml"]);
        assert_eq!(config.tags.paths.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

tags:
  paths:
    - /srv/tags/remote
    - tags
  extensions: [yml, yaml]

expansion:
  max-rounds: 5
  seed: 1234
  record-originals: true
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(
            config.tags.expanded_paths(),
            vec![PathBuf::from("/srv/tags/remote"), PathBuf::from("tags")]
        );
        assert_eq!(config.tags.load_options().extensions, vec!["yml", "yaml"]);
        assert_eq!(config.expansion.max_rounds, 5);
        assert_eq!(config.expansion.seed, Some(1234));
        assert!(config.expansion.options().record_originals);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
expansion:
  seed: 7
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.expansion.seed, Some(7));

        // Defaults for unspecified
        assert_eq!(config.expansion.max_rounds, DEFAULT_MAX_ROUNDS);
        assert_eq!(config.tags.extensions, vec!["yml"]);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_rounds() {
        let mut config = Config::default();
        config.expansion.max_rounds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_home_paths_are_expanded() {
        let tags = TagsConfig {
            paths: vec!["~/tags".to_string()],
            ..Default::default()
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(tags.expanded_paths(), vec![home.join("tags")]);
        }
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("np.yml");
        fs::write(&path, "log-level: warn\nexpansion:\n  max-rounds: 3\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.expansion.max_rounds, 3);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }
}
