//! Standard library special case.
//!
//! The standard library is published as a module whose versions do not match
//! the repository's tag names, and whose packages live under a fixed
//! directory rather than at the repository root.

use semver::Version;

use crate::error::{SourceError, SourceResult};
use crate::source::TemplateSet;

/// Maps standard library versions to repository locations.
pub trait StdlibSource: Send + Sync {
    /// Module path that selects the special case.
    fn module_path(&self) -> &str;

    /// Repository tag for a module version.
    fn tag_for_version(&self, version: &str) -> SourceResult<String>;

    /// Directory of the library inside the repository for a module version.
    fn directory(&self, version: &str) -> String;

    fn repo_url(&self) -> &str;

    fn templates(&self) -> TemplateSet;
}

/// The Go standard library, hosted on the GitHub mirror.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoStdlib;

impl GoStdlib {
    pub const MODULE_PATH: &'static str = "std";
    pub const REPO_URL: &'static str = "https://github.com/golang/go";
}

impl StdlibSource for GoStdlib {
    fn module_path(&self) -> &str {
        Self::MODULE_PATH
    }

    fn tag_for_version(&self, version: &str) -> SourceResult<String> {
        let v = parse_version(version)?;

        if v.major == 1 && v.minor == 0 && v.patch == 0 && v.pre.is_empty() {
            return Ok("go1".to_string());
        }

        let mut tag = format!("go{}.{}", v.major, v.minor);
        if v.patch != 0 {
            tag.push_str(&format!(".{}", v.patch));
        }

        if !v.pre.is_empty() {
            let pre = v.pre.as_str();
            let suffix = pre
                .split_once('.')
                .filter(|(kind, n)| {
                    matches!(*kind, "beta" | "rc") && n.parse::<u32>().is_ok()
                })
                .map(|(kind, n)| format!("{kind}{n}"))
                .ok_or_else(|| invalid(version, format!("unsupported pre-release {pre:?}")))?;
            tag.push_str(&suffix);
        }

        Ok(tag)
    }

    fn directory(&self, version: &str) -> String {
        // Packages moved from src/pkg to src in go1.4.
        match parse_version(version) {
            Ok(v) if v < Version::new(1, 4, 0) => "src/pkg".to_string(),
            _ => "src".to_string(),
        }
    }

    fn repo_url(&self) -> &str {
        Self::REPO_URL
    }

    fn templates(&self) -> TemplateSet {
        TemplateSet::GITHUB
    }
}

fn parse_version(version: &str) -> SourceResult<Version> {
    let raw = version
        .strip_prefix('v')
        .ok_or_else(|| invalid(version, "missing \"v\" prefix"))?;
    Version::parse(raw).map_err(|e| invalid(version, e.to_string()))
}

fn invalid(version: &str, reason: impl Into<String>) -> SourceError {
    SourceError::InvalidVersion {
        version: version.to_string(),
        reason: reason.into(),
    }
}
