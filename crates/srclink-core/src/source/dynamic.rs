//! Fallback resolution through host metadata.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use url::Url;

use crate::discovery::{MetaFetcher, Transport};
use crate::error::{ResultExt, SourceError, SourceResult};

use super::info::SourceInfo;
use super::path;
use super::pattern::PatternTable;
use super::template::TemplateSet;
use super::version::commit_from_version;

/// Upper bound on a single discovery request.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Resolves modules whose path matches no static pattern.
///
/// The host is asked for its metadata tags, and the repository URL found
/// there is matched against the pattern table to recover URL templates.
pub struct DynamicResolver<'a> {
    pub patterns: &'a PatternTable,
    pub transport: &'a dyn Transport,
    pub fetcher: &'a dyn MetaFetcher,
    pub timeout: Duration,
}

impl DynamicResolver<'_> {
    /// Resolve `module_path` at `version` from host metadata.
    ///
    /// Fails with [`SourceError::Canceled`] if `cancel` fires (or already
    /// has) and with [`SourceError::TimedOut`] once `timeout` elapses. No
    /// request is made when `cancel` is already canceled.
    pub async fn resolve(
        &self,
        cancel: &CancellationToken,
        module_path: &str,
        version: &str,
    ) -> SourceResult<SourceInfo> {
        self.resolve_inner(cancel, module_path, version)
            .await
            .with_context("module_info_dynamic", module_path, version)
    }

    async fn resolve_inner(
        &self,
        cancel: &CancellationToken,
        module_path: &str,
        version: &str,
    ) -> SourceResult<SourceInfo> {
        if cancel.is_cancelled() {
            return Err(SourceError::Canceled);
        }

        let fetch = self.fetcher.fetch_meta(self.transport, module_path);
        let meta = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SourceError::Canceled),
            res = tokio::time::timeout(self.timeout, fetch) => match res {
                Ok(meta) => meta?,
                Err(_) => return Err(SourceError::TimedOut(self.timeout)),
            },
        };

        debug!(
            module_path,
            repo_root_prefix = %meta.repo_root_prefix,
            repo_url = %meta.repo_url,
            "discovered repository from meta tags"
        );

        let repo_url =
            Url::parse(&meta.repo_url).map_err(|source| SourceError::MalformedRepoUrl {
                url: meta.repo_url.clone(),
                source,
            })?;

        // Templates come only from known hosts; go-source templates have no
        // commit placeholder.
        let host = repo_url.host_str().unwrap_or_default();
        let templates = match self
            .patterns
            .match_static(&path::join(&[host, repo_url.path()]))
        {
            Ok(m) => m.templates,
            Err(_) => TemplateSet::EMPTY,
        };
        if templates.is_empty() {
            error!(
                repo_url = %meta.repo_url,
                module_path,
                "no URL templates for repository from meta tag"
            );
        }

        let dir = module_path
            .strip_prefix(meta.repo_root_prefix.as_str())
            .unwrap_or(module_path);
        let dir = dir.strip_prefix('/').unwrap_or(dir);
        let dir = dir.strip_suffix('/').unwrap_or(dir);

        let repo_url = meta.repo_url.strip_suffix('/').unwrap_or(&meta.repo_url);

        Ok(SourceInfo::new(
            repo_url,
            dir,
            commit_from_version(version, dir),
            templates,
        ))
    }
}
