//! Resolver configuration.
//!
//! Configuration is read from `srclink.toml`, either at an explicit path or
//! in the user's config directory. A missing default file means defaults.

pub mod parser;
pub mod schema;

use std::path::{Path, PathBuf};

pub use parser::{parse_config, parse_config_str};
pub use schema::{PatternConfig, ResolverConfig};

use crate::error::ConfigError;

/// File name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "srclink.toml";

/// Location of the per-user configuration file, if a config dir exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("srclink").join(CONFIG_FILE_NAME))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, the per-user file is used when
/// present, otherwise the defaults.
pub fn load(path: Option<&Path>) -> Result<ResolverConfig, ConfigError> {
    if let Some(path) = path {
        return parse_config(path);
    }
    match default_config_path() {
        Some(path) if path.exists() => parse_config(&path),
        _ => Ok(ResolverConfig::default()),
    }
}
