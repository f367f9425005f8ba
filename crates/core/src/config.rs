//! TOML configuration shared by every gatekeep entry point.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct GatekeepConfig {
    /// Where predicates come from.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// How rule text is compiled.
    #[serde(default)]
    pub parser: ParserSettings,
    /// Where compile warnings are sent.
    #[serde(default)]
    pub warnings: WarningConfig,
}

impl GatekeepConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Predicate registry configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    /// Module locations to load predicates from. Later entries win on a
    /// name collision.
    #[serde(default)]
    pub modules: Vec<String>,
}

/// Rule compilation settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ParserSettings {
    /// What to do with a rule segment that has no `:`.
    #[serde(default)]
    pub missing_colon: MissingColonPolicy,
}

/// Handling of a rule segment with no `accessType:` prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingColonPolicy {
    /// Record a compile error for the segment and keep scanning.
    #[default]
    Reject,
    /// Stop scanning and keep whatever compiled before the segment.
    ///
    /// Errors and warnings recorded before the segment are still reported.
    Abandon,
}

/// Warning log configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarningConfig {
    /// File that compile warnings are appended to.
    pub log_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = GatekeepConfig::from_toml_str("").unwrap();
        assert!(config.registry.modules.is_empty());
        assert_eq!(config.parser.missing_colon, MissingColonPolicy::Reject);
        assert!(config.warnings.log_file.is_none());
    }

    #[test]
    fn full_config() {
        let toml = r#"
            [registry]
            modules = ["world.magic.conditionals", "world.magic.overrides"]

            [parser]
            missing_colon = "abandon"

            [warnings]
            log_file = "/var/log/gatekeep/warnings.log"
        "#;

        let config = GatekeepConfig::from_toml_str(toml).unwrap();
        assert_eq!(
            config.registry.modules,
            ["world.magic.conditionals", "world.magic.overrides"]
        );
        assert_eq!(config.parser.missing_colon, MissingColonPolicy::Abandon);
        assert_eq!(
            config.warnings.log_file.as_deref(),
            Some("/var/log/gatekeep/warnings.log")
        );
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let toml = r#"
            [parser]
        "#;
        let config = GatekeepConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.parser.missing_colon, MissingColonPolicy::Reject);
        assert!(config.registry.modules.is_empty());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let toml = r#"
            [parser]
            missing_colon = "ignore"
        "#;
        let err = GatekeepConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = GatekeepConfig::load(Path::new("/nonexistent/gatekeep.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/gatekeep.toml"));
    }
}
