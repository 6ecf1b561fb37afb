//! Known repository hosting patterns.
//!
//! A [`PatternTable`] is an ordered list of regular expressions, each paired
//! with the URL templates for one hosting convention. Matching is first-wins
//! in table order, so more specific conventions must come before general
//! ones.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{PatternError, SourceError, SourceResult};

use super::template::TemplateSet;

/// Name of the capture group holding the repository part of a match.
pub const REPO_GROUP: &str = "repo";

static BUILTIN: LazyLock<PatternTable> = LazyLock::new(|| {
    PatternTable::from_specs(BUILTIN_SPECS).unwrap_or_else(|e| panic!("built-in pattern table: {e}"))
});

/// A matcher paired with the URL templates for what it matches.
#[derive(Debug, Clone)]
pub struct Pattern {
    re: Regex,
    templates: TemplateSet,
}

impl Pattern {
    /// Compile `pattern` and check that it has a `repo` capture group.
    pub fn new(pattern: &str, templates: TemplateSet) -> Result<Self, PatternError> {
        let re = Regex::new(pattern).map_err(|source| PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        Self::from_regex(re, templates)
    }

    /// Wrap an already compiled regex, checking for the `repo` group.
    pub fn from_regex(re: Regex, templates: TemplateSet) -> Result<Self, PatternError> {
        let has_repo = re.capture_names().flatten().any(|n| n == REPO_GROUP);
        if !has_repo {
            return Err(PatternError::MissingRepoGroup {
                pattern: re.as_str().to_string(),
            });
        }
        Ok(Self { re, templates })
    }

    pub fn as_str(&self) -> &str {
        self.re.as_str()
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }
}

/// Result of matching an identifier against a [`PatternTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMatch {
    /// Repository, without scheme (e.g., "github.com/org/repo")
    pub repo: String,
    /// Module directory relative to the repository root
    pub dir: String,
    /// URL templates for the matching convention
    pub templates: TemplateSet,
}

/// Ordered, validated set of hosting patterns.
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: Vec<Pattern>,
}

impl PatternTable {
    /// Build a table from patterns, which are validated on construction.
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    /// Build a table from raw `(regex, templates)` pairs, validating each.
    pub fn from_specs<'a, I>(specs: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (&'a str, TemplateSet)>,
    {
        let patterns = specs
            .into_iter()
            .map(|(re, templates)| Pattern::new(re, templates))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns))
    }

    /// The process-wide built-in table.
    ///
    /// Initialised and validated on first use; invalid built-in data aborts.
    pub fn builtin() -> &'static PatternTable {
        &BUILTIN
    }

    /// Return a new table with `custom` placed ahead of the built-in patterns.
    pub fn with_builtin(custom: Vec<Pattern>) -> Self {
        let mut patterns = custom;
        patterns.extend(Self::builtin().patterns.iter().cloned());
        Self::new(patterns)
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Match a module path or repository reference against the table.
    ///
    /// The first pattern whose match starts at the beginning of `identifier`
    /// wins. The directory is everything after the match, minus one leading
    /// and one trailing `/`.
    pub fn match_static(&self, identifier: &str) -> SourceResult<StaticMatch> {
        for pattern in &self.patterns {
            let Some(caps) = pattern.re.captures(identifier) else {
                continue;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() != 0 {
                continue;
            }

            let repo = caps
                .name(REPO_GROUP)
                .map(|m| m.as_str())
                .unwrap_or_default();
            let rest = &identifier[whole.end()..];
            let dir = rest.strip_prefix('/').unwrap_or(rest);
            let dir = dir.strip_suffix('/').unwrap_or(dir);

            debug!(
                identifier,
                pattern = pattern.as_str(),
                repo,
                dir,
                "matched static pattern"
            );

            return Ok(StaticMatch {
                repo: repo.to_string(),
                dir: dir.to_string(),
                templates: pattern.templates.clone(),
            });
        }

        Err(SourceError::NotFound {
            identifier: identifier.to_string(),
        })
    }
}

/// Patterns for module paths and repository URLs, most specific first.
///
/// The last entry is the generic VCS-suffix form: it recovers the repository
/// and directory but has no URL convention, and it must stay last.
const BUILTIN_SPECS: [(&str, TemplateSet); 4] = [
    (
        r"^(?P<repo>github\.com/[a-z0-9A-Z_.\-]+/[a-z0-9A-Z_.\-]+)",
        TemplateSet::GITHUB,
    ),
    (
        r"^(?P<repo>bitbucket\.org/[a-z0-9A-Z_.\-]+/[a-z0-9A-Z_.\-]+)",
        TemplateSet::BITBUCKET,
    ),
    // Module paths need the ".git" suffix; repo URLs from meta tags do not.
    (
        r"^(?P<repo>[^.]+\.googlesource\.com/[^.]+)(\.git|$)",
        TemplateSet::GITILES,
    ),
    (
        r"^(?P<repo>([a-z0-9.\-]+\.)+[a-z0-9.\-]+(:[0-9]+)?(/~?[A-Za-z0-9_.\-]+)+?)\.(bzr|fossil|git|hg|svn)",
        TemplateSet::EMPTY,
    ),
];
