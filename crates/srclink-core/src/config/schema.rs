//! Schema for srclink.toml.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, PatternError};
use crate::source::{DEFAULT_DISCOVERY_TIMEOUT, Pattern, PatternTable, TemplateSet};

/// Resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Upper bound, in seconds, on a metadata discovery request
    pub discovery_timeout_secs: u64,
    /// User-Agent sent with discovery requests
    pub user_agent: String,
    /// Extra hosting patterns, tried before the built-in ones
    pub patterns: Vec<PatternConfig>,
}

/// A hosting pattern declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    /// Regular expression with a `repo` named group
    pub regex: String,
    /// Directory URL template
    #[serde(default)]
    pub directory: String,
    /// File URL template
    #[serde(default)]
    pub file: String,
    /// Line URL template
    #[serde(default)]
    pub line: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            discovery_timeout_secs: DEFAULT_DISCOVERY_TIMEOUT.as_secs(),
            user_agent: concat!("srclink/", env!("CARGO_PKG_VERSION")).to_string(),
            patterns: Vec::new(),
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    /// Check values and compile every configured pattern.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discovery_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.custom_patterns()?;
        Ok(())
    }

    /// The pattern table: configured patterns followed by the built-in ones.
    pub fn pattern_table(&self) -> Result<PatternTable, PatternError> {
        Ok(PatternTable::with_builtin(self.custom_patterns()?))
    }

    fn custom_patterns(&self) -> Result<Vec<Pattern>, PatternError> {
        self.patterns.iter().map(PatternConfig::compile).collect()
    }
}

impl PatternConfig {
    pub fn compile(&self) -> Result<Pattern, PatternError> {
        let templates = TemplateSet::new(
            self.directory.clone(),
            self.file.clone(),
            self.line.clone(),
        );
        Pattern::new(&self.regex, templates)
    }
}
