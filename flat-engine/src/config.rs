// Engine configuration
// Loaded from flatten.json; command-line flags override individual fields

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "flatten.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Longest embedding chain allowed before a type is reported
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Pick the earliest-declared path for ambiguous members instead of
    /// emitting a manual-resolution marker. Every choice is recorded in the plan.
    #[serde(default)]
    pub auto_resolve_ambiguity: bool,

    /// Report promoted-name collisions as violations
    #[serde(default = "default_true")]
    pub report_ambiguities: bool,
}

fn default_max_depth() -> usize {
    1
}
fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            auto_resolve_ambiguity: false,
            report_ambiguities: true,
        }
    }
}

impl EngineConfig {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Search `dir` and its ancestors for flatten.json, falling back to defaults
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut current = Some(dir.as_ref());
        while let Some(candidate) = current {
            let config_path = candidate.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                log::debug!("using configuration {}", config_path.display());
                return Self::from_file(config_path);
            }
            current = candidate.parent();
        }
        Ok(Self::default())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Example configuration file contents
    pub fn example() -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, 1);
        assert!(!config.auto_resolve_ambiguity);
        assert!(config.report_ambiguities);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"max_depth": 3}"#).unwrap();
        assert_eq!(config.max_depth, 3);
        assert!(!config.auto_resolve_ambiguity);
        assert!(config.report_ambiguities);
    }

    #[test]
    fn test_save_and_search_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = EngineConfig {
            max_depth: 2,
            auto_resolve_ambiguity: true,
            report_ambiguities: false,
        };
        config.save(dir.path().join(CONFIG_FILE_NAME)).unwrap();

        let loaded = EngineConfig::from_dir(&nested).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_example_config() {
        let example = EngineConfig::example().unwrap();
        assert!(example.contains("max_depth"));
        assert!(example.contains("auto_resolve_ambiguity"));
    }
}
