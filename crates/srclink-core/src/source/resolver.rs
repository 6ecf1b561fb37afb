//! Source resolver implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ResolverConfig;
use crate::discovery::{GoImportMetaFetcher, MetaFetcher, ReqwestTransport, Transport};
use crate::error::{ConfigError, ResultExt, SourceError, SourceResult};
use crate::stdlib::{GoStdlib, StdlibSource};

use super::dynamic::{DEFAULT_DISCOVERY_TIMEOUT, DynamicResolver};
use super::info::SourceInfo;
use super::pattern::PatternTable;
use super::version::commit_from_version;

/// Resolves module paths and versions to source locations.
///
/// Resolution tries, in order: the standard library special case, the
/// static pattern table, and host metadata discovery. The resolver holds no
/// mutable state and can be shared across tasks.
#[derive(Clone)]
pub struct SourceResolver {
    patterns: PatternTable,
    transport: Arc<dyn Transport>,
    fetcher: Arc<dyn MetaFetcher>,
    stdlib: Arc<dyn StdlibSource>,
    discovery_timeout: Duration,
}

impl fmt::Debug for SourceResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceResolver")
            .field("patterns", &self.patterns.len())
            .field("stdlib", &self.stdlib.module_path())
            .field("discovery_timeout", &self.discovery_timeout)
            .finish_non_exhaustive()
    }
}

impl SourceResolver {
    /// Create a resolver with the built-in patterns and default collaborators.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            patterns: PatternTable::builtin().clone(),
            transport,
            fetcher: Arc::new(GoImportMetaFetcher),
            stdlib: Arc::new(GoStdlib),
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }

    /// Create a resolver from configuration, using a reqwest transport.
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.user_agent)?;
        Ok(Self::new(Arc::new(transport))
            .with_patterns(config.pattern_table()?)
            .with_discovery_timeout(config.discovery_timeout()))
    }

    /// Replace the pattern table.
    pub fn with_patterns(mut self, patterns: PatternTable) -> Self {
        self.patterns = patterns;
        self
    }

    /// Replace the metadata fetcher.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn MetaFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the standard library special case.
    pub fn with_stdlib(mut self, stdlib: Arc<dyn StdlibSource>) -> Self {
        self.stdlib = stdlib;
        self
    }

    /// Set the upper bound on a discovery request.
    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    pub fn discovery_timeout(&self) -> Duration {
        self.discovery_timeout
    }

    /// Determine the repository, module directory and commit for a module.
    ///
    /// May fetch from arbitrary hosts when no static pattern applies, so it
    /// can be slow; `cancel` aborts an in-flight fetch.
    pub async fn module_info(
        &self,
        cancel: &CancellationToken,
        module_path: &str,
        version: &str,
    ) -> SourceResult<SourceInfo> {
        self.module_info_inner(cancel, module_path, version)
            .await
            .with_context("module_info", module_path, version)
    }

    async fn module_info_inner(
        &self,
        cancel: &CancellationToken,
        module_path: &str,
        version: &str,
    ) -> SourceResult<SourceInfo> {
        if module_path == self.stdlib.module_path() {
            let commit = self.stdlib.tag_for_version(version)?;
            return Ok(SourceInfo::new(
                self.stdlib.repo_url(),
                self.stdlib.directory(version),
                commit,
                self.stdlib.templates(),
            ));
        }

        match self.patterns.match_static(module_path) {
            Ok(m) => Ok(SourceInfo::new(
                format!("https://{}", m.repo),
                m.dir.as_str(),
                commit_from_version(version, &m.dir),
                m.templates,
            )),
            Err(SourceError::NotFound { .. }) => {
                debug!(module_path, "no static pattern, trying metadata discovery");
                self.dynamic()
                    .resolve(cancel, module_path, version)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    fn dynamic(&self) -> DynamicResolver<'_> {
        DynamicResolver {
            patterns: &self.patterns,
            transport: self.transport.as_ref(),
            fetcher: self.fetcher.as_ref(),
            timeout: self.discovery_timeout,
        }
    }
}
