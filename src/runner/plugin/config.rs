//! Bridge configuration file parsing.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::runner::ds::error::{BridgeError, Result};

fn default_namespace() -> String {
    "core".to_string()
}

fn enabled_by_default() -> bool {
    true
}

/// An isolated module: gets its own loader, realm and dynamic bindings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModuleConfig {
    /// Module name, used for logging and error messages.
    pub name: String,
    /// Package paths loaded into the module's realm at startup.
    #[serde(default)]
    pub preload: Vec<String>,
    /// Whether the module is started.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Namespace used for unqualified names.
    #[serde(default = "default_namespace")]
    pub default_namespace: String,
    /// Alias declarations (`"text :as s"`) applied to every script.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Package paths loaded into the shared realm at startup.
    #[serde(default)]
    pub preload: Vec<String>,
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

impl BridgeConfig {
    pub fn new() -> Self {
        BridgeConfig {
            default_namespace: default_namespace(),
            requires: Vec::new(),
            preload: Vec::new(),
            modules: Vec::new(),
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// Expected format:
    /// ```json
    /// {
    ///   "requires": ["text :as s"],
    ///   "preload": ["text"],
    ///   "modules": [
    ///     { "name": "reports", "preload": ["io"], "enabled": true }
    ///   ]
    /// }
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON string. Blank input is the default config.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(content).map_err(|e| BridgeError::Config(e.to_string()))
    }

    pub fn enabled_modules(&self) -> impl Iterator<Item = &ModuleConfig> {
        self.modules.iter().filter(|m| m.enabled)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = BridgeConfig::parse("").unwrap();
        assert_eq!(config.default_namespace, "core");
        assert!(config.requires.is_empty());
        assert!(config.preload.is_empty());
        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_parse_modules() {
        let config = BridgeConfig::parse(
            r#"{
                "requires": ["text :as s"],
                "modules": [
                    { "name": "a", "preload": ["io"] },
                    { "name": "b", "enabled": false }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.requires, vec!["text :as s".to_string()]);
        assert_eq!(config.modules.len(), 2);
        assert!(config.modules[0].enabled);
        let names: Vec<&str> = config.enabled_modules().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        assert!(matches!(
            BridgeConfig::parse("{ \"requires\": "),
            Err(BridgeError::Config(_))
        ));
        assert!(matches!(
            BridgeConfig::parse("{ \"unknown\": 1 }"),
            Err(BridgeError::Config(_))
        ));
    }
}
