//! `go-import` / `go-source` meta tag discovery.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::error::DiscoveryError;

use super::transport::Transport;

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("meta tag pattern is valid"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)(name|content)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute pattern is valid")
});

static HEAD_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>|<body[\s>]").expect("head end pattern is valid"));

/// Repository location advertised by a module's host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMeta {
    /// Portion of the module path that names the repository root
    pub repo_root_prefix: String,
    /// URL of the repository
    pub repo_url: String,
}

impl SourceMeta {
    pub fn new(repo_root_prefix: impl Into<String>, repo_url: impl Into<String>) -> Self {
        Self {
            repo_root_prefix: repo_root_prefix.into(),
            repo_url: repo_url.into(),
        }
    }
}

/// Finds the repository for a module path from host-provided metadata.
#[async_trait]
pub trait MetaFetcher: Send + Sync {
    async fn fetch_meta(
        &self,
        transport: &dyn Transport,
        module_path: &str,
    ) -> Result<SourceMeta, DiscoveryError>;
}

/// Reads `go-import` and `go-source` tags from `https://<module>?go-get=1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoImportMetaFetcher;

impl GoImportMetaFetcher {
    /// URL of the page that carries the metadata for `module_path`.
    pub fn meta_url(module_path: &str) -> Result<Url, DiscoveryError> {
        Url::parse(&format!("https://{module_path}?go-get=1")).map_err(|source| {
            DiscoveryError::InvalidModulePath {
                module_path: module_path.to_string(),
                source,
            }
        })
    }
}

#[async_trait]
impl MetaFetcher for GoImportMetaFetcher {
    async fn fetch_meta(
        &self,
        transport: &dyn Transport,
        module_path: &str,
    ) -> Result<SourceMeta, DiscoveryError> {
        let url = Self::meta_url(module_path)?;
        debug!(%url, "fetching module metadata");
        let body = transport.get(&url).await?;
        parse_meta(&body, module_path).map_err(|e| match e {
            DiscoveryError::NoMetaTags { .. } => DiscoveryError::NoMetaTags {
                url: url.to_string(),
            },
            other => other,
        })
    }
}

/// Extract the repository location for `module_path` from an HTML page.
///
/// Only tags in the document head are considered, and only those whose
/// prefix is a path prefix of `module_path`. A `go-source` tag with the same
/// prefix overrides the `go-import` repository unless its home is `_`.
pub fn parse_meta(html: &str, module_path: &str) -> Result<SourceMeta, DiscoveryError> {
    let head = match HEAD_END_RE.find(html) {
        Some(m) => &html[..m.start()],
        None => html,
    };

    let mut found: Option<SourceMeta> = None;

    for tag in META_TAG_RE.find_iter(head) {
        let (name, content) = meta_attrs(tag.as_str());
        let (Some(name), Some(content)) = (name, content) else {
            continue;
        };

        let fields: Vec<&str> = content.split_whitespace().collect();
        let Some(&prefix) = fields.first() else {
            continue;
        };
        if !has_path_prefix(module_path, prefix) {
            continue;
        }

        match name.as_str() {
            "go-import" => {
                if fields.len() != 3 {
                    return Err(DiscoveryError::InvalidMetaTag { content });
                }
                // Module proxy entries do not point at a repository.
                if fields[1] == "mod" {
                    continue;
                }
                if found.is_some() {
                    return Err(DiscoveryError::AmbiguousMetaTags {
                        module_path: module_path.to_string(),
                    });
                }
                found = Some(SourceMeta::new(prefix, fields[2]));
            }
            "go-source" => {
                if fields.len() != 4 {
                    return Err(DiscoveryError::InvalidMetaTag { content });
                }
                let Some(meta) = found.as_mut() else {
                    return Err(DiscoveryError::SourceWithoutImport {
                        module_path: module_path.to_string(),
                    });
                };
                if meta.repo_root_prefix != prefix {
                    return Err(DiscoveryError::PrefixMismatch {
                        import_prefix: meta.repo_root_prefix.clone(),
                        source_prefix: prefix.to_string(),
                    });
                }
                if fields[1] != "_" {
                    meta.repo_url = fields[1].to_string();
                }
                break;
            }
            _ => {}
        }
    }

    found.ok_or_else(|| DiscoveryError::NoMetaTags {
        url: module_path.to_string(),
    })
}

fn meta_attrs(tag: &str) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut content = None;
    for caps in ATTR_RE.captures_iter(tag) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| unescape(m.as_str()));
        match caps[1].to_ascii_lowercase().as_str() {
            "name" => name = value,
            "content" => content = value,
            _ => {}
        }
    }
    (name, content)
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn has_path_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
