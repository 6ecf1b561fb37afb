//! Resolved source location of a module.

use serde::Serialize;

use super::path;
use super::template::{TemplateSet, expand};

/// Where a module's source lives, and how to link into it.
///
/// Built once per resolution and never mutated. When [`has_templates`]
/// is false the URL builders return the unexpanded (empty) templates, so
/// callers should check it rather than inspect URLs.
///
/// [`has_templates`]: SourceInfo::has_templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    /// URL of the repository containing the module
    repo_url: String,
    /// Directory of the module relative to the repository root
    module_dir: String,
    /// Tag or commit ID corresponding to the version
    commit: String,
    templates: TemplateSet,
}

impl SourceInfo {
    pub fn new(
        repo_url: impl Into<String>,
        module_dir: impl Into<String>,
        commit: impl Into<String>,
        templates: TemplateSet,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            module_dir: module_dir.into(),
            commit: commit.into(),
            templates,
        }
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn module_dir(&self) -> &str {
        &self.module_dir
    }

    pub fn commit(&self) -> &str {
        &self.commit
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    /// Whether a URL convention is known for the repository host.
    pub fn has_templates(&self) -> bool {
        !self.templates.is_empty()
    }

    /// URL of the module's home directory.
    pub fn module_url(&self) -> String {
        self.directory_url("")
    }

    /// URL of a directory relative to the module's home directory.
    pub fn directory_url(&self, dir: &str) -> String {
        let dir = path::join(&[self.module_dir.as_str(), dir]);
        let url = expand(
            &self.templates.directory,
            &[
                ("repo", self.repo_url.as_str()),
                ("commit", self.commit.as_str()),
                ("dir", dir.as_str()),
            ],
        );
        match url.strip_suffix('/') {
            Some(trimmed) => trimmed.to_string(),
            None => url,
        }
    }

    /// URL of a file relative to the module's home directory.
    pub fn file_url(&self, pathname: &str) -> String {
        let file = path::join(&[self.module_dir.as_str(), pathname]);
        expand(
            &self.templates.file,
            &[
                ("repo", self.repo_url.as_str()),
                ("commit", self.commit.as_str()),
                ("file", file.as_str()),
            ],
        )
    }

    /// URL of a line in a file relative to the module's home directory.
    ///
    /// Lines are 1-based; `0` is passed through as-is.
    pub fn line_url(&self, pathname: &str, line: u32) -> String {
        let file = path::join(&[self.module_dir.as_str(), pathname]);
        let line = line.to_string();
        expand(
            &self.templates.line,
            &[
                ("repo", self.repo_url.as_str()),
                ("commit", self.commit.as_str()),
                ("file", file.as_str()),
                ("line", line.as_str()),
            ],
        )
    }
}
