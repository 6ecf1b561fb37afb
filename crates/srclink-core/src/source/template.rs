//! URL templates and placeholder expansion.

use std::borrow::Cow;

use serde::Serialize;

/// How to build URLs for one hosting convention.
///
/// The empty value means the repository layout is known but no browsable URL
/// convention is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TemplateSet {
    /// Template for a directory, with `{repo}`, `{commit}` and `{dir}`
    pub directory: Cow<'static, str>,
    /// Template for a file, with `{repo}`, `{commit}` and `{file}`
    pub file: Cow<'static, str>,
    /// Template for a line, with `{repo}`, `{commit}`, `{file}` and `{line}`
    pub line: Cow<'static, str>,
}

impl TemplateSet {
    pub const EMPTY: TemplateSet = TemplateSet {
        directory: Cow::Borrowed(""),
        file: Cow::Borrowed(""),
        line: Cow::Borrowed(""),
    };

    /// GitHub-style `tree`/`blob` URLs with `#L` line anchors.
    pub const GITHUB: TemplateSet = TemplateSet {
        directory: Cow::Borrowed("{repo}/tree/{commit}/{dir}"),
        file: Cow::Borrowed("{repo}/blob/{commit}/{file}"),
        line: Cow::Borrowed("{repo}/blob/{commit}/{file}#L{line}"),
    };

    /// Bitbucket-style `src` URLs with `#lines-` anchors.
    pub const BITBUCKET: TemplateSet = TemplateSet {
        directory: Cow::Borrowed("{repo}/src/{commit}/{dir}"),
        file: Cow::Borrowed("{repo}/src/{commit}/{file}"),
        line: Cow::Borrowed("{repo}/src/{commit}/{file}#lines-{line}"),
    };

    /// Gitiles-style `+` URLs with bare line anchors.
    pub const GITILES: TemplateSet = TemplateSet {
        directory: Cow::Borrowed("{repo}/+/{commit}/{dir}"),
        file: Cow::Borrowed("{repo}/+/{commit}/{file}"),
        line: Cow::Borrowed("{repo}/+/{commit}/{file}#{line}"),
    };

    /// Build a template set from owned strings, e.g. from configuration.
    pub fn new(
        directory: impl Into<String>,
        file: impl Into<String>,
        line: impl Into<String>,
    ) -> Self {
        Self {
            directory: Cow::Owned(directory.into()),
            file: Cow::Owned(file.into()),
            line: Cow::Owned(line.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty() && self.file.is_empty() && self.line.is_empty()
    }
}

/// Replace every `{key}` in `template` with its value from `substitutions`.
///
/// Expansion is a single left-to-right pass: substituted text is never
/// scanned again, and the result does not depend on the order of
/// `substitutions`. Unknown `{...}` tokens are left untouched.
pub fn expand(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];

        let replacement = candidate.find('}').and_then(|close| {
            let key = &candidate[..close];
            substitutions
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });

        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &candidate[close + 1..];
            }
            None => {
                out.push('{');
                rest = candidate;
            }
        }
    }

    out.push_str(rest);
    out
}
