use thiserror::Error;

/// Errors raised by predicate functions while a rule is being checked.
///
/// The engine never catches these; they surface directly to the caller of
/// `check`.
#[derive(Debug, Error)]
pub enum PredicateError {
    /// The predicate could not produce an answer.
    #[error("predicate '{name}' failed: {message}")]
    Failed {
        /// Name the predicate was registered under.
        name: String,
        /// Human-readable failure description.
        message: String,
    },

    /// The predicate was called with arguments it cannot use.
    #[error("predicate '{name}' received an invalid argument: {message}")]
    InvalidArgument {
        /// Name the predicate was registered under.
        name: String,
        /// Which argument was wrong, and why.
        message: String,
    },
}

impl PredicateError {
    /// Shorthand for [`PredicateError::Failed`].
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`PredicateError::InvalidArgument`].
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_error_display_messages() {
        let err = PredicateError::failed("has_mana", "actor has no mana pool");
        assert_eq!(
            err.to_string(),
            "predicate 'has_mana' failed: actor has no mana pool"
        );

        let err = PredicateError::invalid_argument("knows_spell", "missing keyword 'name'");
        assert_eq!(
            err.to_string(),
            "predicate 'knows_spell' received an invalid argument: missing keyword 'name'"
        );
    }

    #[test]
    fn config_io_error_keeps_path() {
        let err = ConfigError::Io {
            path: "/etc/gatekeep.toml".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/etc/gatekeep.toml"));
        assert!(msg.contains("file missing"));
    }

    #[test]
    fn config_parse_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: ConfigError = toml_err.into();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid config:"));
    }
}
