//! TOML parser with helpful error messages

use std::path::Path;

use super::schema::ResolverConfig;
use crate::error::ConfigError;

/// Parse srclink.toml and validate it.
pub fn parse_config(path: &Path) -> Result<ResolverConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&content, path)
}

/// Parse srclink.toml content; `origin` is only used in error messages.
pub fn parse_config_str(content: &str, origin: &Path) -> Result<ResolverConfig, ConfigError> {
    let config: ResolverConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        context: error_context(&source, content),
        source,
    })?;

    config.validate()?;
    Ok(config)
}

/// Describe where a TOML error happened, with the surrounding lines.
fn error_context(error: &toml::de::Error, content: &str) -> String {
    let Some(span) = error.span() else {
        return String::new();
    };
    let line_num = content[..span.start.min(content.len())]
        .matches('\n')
        .count()
        + 1;
    format!(
        " at line {}:\n{}",
        line_num,
        get_line_context(content, line_num)
    )
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
