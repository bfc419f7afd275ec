//! Configuration system
//!
//! Query settings load from `.toml` or `.ron` files through the [`Config`]
//! trait. Every field has a default, so a partial file (or an empty one)
//! is a valid configuration.

use crate::traversal::cost::DEFAULT_MAX_COST_SOURCES;
use crate::traversal::QueryMode;
pub use serde::{Deserialize, Serialize};

/// File formats understood by [`Config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML, `.toml`
    Toml,
    /// Rusty Object Notation, `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format implied by the extension of `path`
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            Ok(Self::Toml)
        } else if path.ends_with(".ron") {
            Ok(Self::Ron)
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Parse configuration text in the given format
    fn from_str_as(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Render configuration text in the given format
    fn to_string_as(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_as(&contents, format)
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = self.to_string_as(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Settings for cost-accumulating queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Count leaf regions on bound overlap alone, skipping the exact test
    pub approximate: bool,
    /// Number of heaviest regions kept in a report
    pub max_cost_sources: usize,
    /// Stop once this much cost has been accumulated
    pub budget: Option<f32>,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            approximate: true,
            max_cost_sources: DEFAULT_MAX_COST_SOURCES,
            budget: None,
        }
    }
}

impl Config for CostConfig {}

/// Settings for traversal nodes and collision queries
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Count BV and leaf tests and measure query time
    pub collect_statistics: bool,
    /// Stop after this many contacts; unbounded when absent
    pub max_contacts: Option<usize>,
    /// Cost query settings
    pub cost: CostConfig,
}

impl TraversalConfig {
    /// Collision query mode implied by `max_contacts`
    pub fn query_mode(&self) -> QueryMode {
        QueryMode::from_limit(self.max_contacts)
    }
}

impl Config for TraversalConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TraversalConfig::default();
        assert!(!config.collect_statistics);
        assert_eq!(config.query_mode(), QueryMode::Exhaustive);
        assert!(config.cost.approximate);
        assert_eq!(config.cost.max_cost_sources, DEFAULT_MAX_COST_SOURCES);
        assert_eq!(config.cost.budget, None);
    }

    #[test]
    fn test_parse_partial_toml() {
        let text = "collect_statistics = true\nmax_contacts = 4\n\n[cost]\nbudget = 2.5\n";
        let config = TraversalConfig::from_str_as(text, ConfigFormat::Toml).unwrap();
        assert!(config.collect_statistics);
        assert_eq!(config.query_mode(), QueryMode::MaxContacts(4));
        assert_eq!(config.cost.budget, Some(2.5));
        assert!(config.cost.approximate);
    }

    #[test]
    fn test_parse_ron() {
        let text = "(collect_statistics: true, cost: (approximate: false, max_cost_sources: 3))";
        let config = TraversalConfig::from_str_as(text, ConfigFormat::Ron).unwrap();
        assert!(config.collect_statistics);
        assert_eq!(config.max_contacts, None);
        assert!(!config.cost.approximate);
        assert_eq!(config.cost.max_cost_sources, 3);
    }

    #[test]
    fn test_parse_error() {
        let result = TraversalConfig::from_str_as("collect_statistics = \"yes\"", ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let config = TraversalConfig {
            collect_statistics: true,
            max_contacts: Some(1),
            cost: CostConfig { approximate: false, max_cost_sources: 8, budget: Some(10.0) },
        };

        let dir = std::env::temp_dir();
        for extension in ["toml", "ron"] {
            let path = dir.join(format!("narrow_phase_config_{}.{extension}", std::process::id()));
            let path = path.to_string_lossy().into_owned();
            config.save_to_file(&path).unwrap();
            let loaded = TraversalConfig::load_from_file(&path).unwrap();
            std::fs::remove_file(&path).unwrap();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_unsupported_format() {
        let result = TraversalConfig::load_from_file("does_not_exist.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
        let result = TraversalConfig::default().save_to_file("settings.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = CostConfig::load_from_file("definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
