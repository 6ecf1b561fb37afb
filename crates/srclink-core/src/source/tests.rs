//! Tests for the source module.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::*;
use crate::discovery::{MetaFetcher, SourceMeta, Transport};
use crate::error::{DiscoveryError, SourceError, TransportError};

/// Transport that must never be reached.
struct UnusedTransport;

#[async_trait]
impl Transport for UnusedTransport {
    async fn get(&self, url: &Url) -> Result<String, TransportError> {
        panic!("unexpected request to {url}");
    }
}

/// Fetcher returning a canned answer and counting calls.
struct CannedFetcher {
    meta: Result<SourceMeta, fn() -> DiscoveryError>,
    calls: AtomicUsize,
}

impl CannedFetcher {
    fn ok(prefix: &str, repo_url: &str) -> Arc<Self> {
        Arc::new(Self {
            meta: Ok(SourceMeta::new(prefix, repo_url)),
            calls: AtomicUsize::new(0),
        })
    }

    fn err(make: fn() -> DiscoveryError) -> Arc<Self> {
        Arc::new(Self {
            meta: Err(make),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetaFetcher for CannedFetcher {
    async fn fetch_meta(
        &self,
        _transport: &dyn Transport,
        _module_path: &str,
    ) -> Result<SourceMeta, DiscoveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.meta {
            Ok(meta) => Ok(meta.clone()),
            Err(make) => Err(make()),
        }
    }
}

/// Fetcher for paths that must resolve without discovery.
struct PanickingFetcher;

#[async_trait]
impl MetaFetcher for PanickingFetcher {
    async fn fetch_meta(
        &self,
        _transport: &dyn Transport,
        module_path: &str,
    ) -> Result<SourceMeta, DiscoveryError> {
        panic!("unexpected discovery for {module_path}");
    }
}

/// Fetcher that never completes.
struct HangingFetcher;

#[async_trait]
impl MetaFetcher for HangingFetcher {
    async fn fetch_meta(
        &self,
        _transport: &dyn Transport,
        _module_path: &str,
    ) -> Result<SourceMeta, DiscoveryError> {
        std::future::pending().await
    }
}

fn resolver_with(fetcher: Arc<dyn MetaFetcher>) -> SourceResolver {
    SourceResolver::new(Arc::new(UnusedTransport)).with_fetcher(fetcher)
}

fn static_resolver() -> SourceResolver {
    resolver_with(Arc::new(PanickingFetcher))
}

mod static_resolution_tests {
    use super::*;

    #[tokio::test]
    async fn github_tagged_version() {
        let resolver = static_resolver();
        let info = resolver
            .module_info(&CancellationToken::new(), "github.com/org/repo", "v1.2.3")
            .await
            .unwrap();

        assert_eq!(info.repo_url(), "https://github.com/org/repo");
        assert_eq!(info.module_dir(), "");
        assert_eq!(info.commit(), "v1.2.3");
        assert_eq!(info.module_url(), "https://github.com/org/repo/tree/v1.2.3");
        assert_eq!(
            info.file_url("x"),
            "https://github.com/org/repo/blob/v1.2.3/x"
        );
    }

    #[tokio::test]
    async fn trailing_slash_does_not_reach_commit() {
        let resolver = static_resolver();
        let info = resolver
            .module_info(&CancellationToken::new(), "github.com/org/repo/sub/", "v1.2.3")
            .await
            .unwrap();

        assert_eq!(info.module_dir(), "sub");
        assert_eq!(info.commit(), "sub/v1.2.3");
    }

    #[tokio::test]
    async fn nested_module_uses_prefixed_tag() {
        let resolver = static_resolver();
        let info = resolver
            .module_info(&CancellationToken::new(), "github.com/org/repo/sub", "v1.2.3")
            .await
            .unwrap();

        assert_eq!(info.module_dir(), "sub");
        assert_eq!(info.commit(), "sub/v1.2.3");
        assert_eq!(
            info.line_url("a.go", 9),
            "https://github.com/org/repo/blob/sub/v1.2.3/sub/a.go#L9"
        );
    }

    #[tokio::test]
    async fn pseudo_version_uses_hash() {
        let resolver = static_resolver();
        let info = resolver
            .module_info(
                &CancellationToken::new(),
                "bitbucket.org/team/proj",
                "v0.0.0-20190101000000-abcdef123456",
            )
            .await
            .unwrap();

        assert_eq!(info.commit(), "abcdef123456");
        assert_eq!(
            info.module_url(),
            "https://bitbucket.org/team/proj/src/abcdef123456"
        );
    }

    #[tokio::test]
    async fn generic_vcs_path_has_no_templates() {
        let resolver = static_resolver();
        let info = resolver
            .module_info(&CancellationToken::new(), "example.com/r.git/pkg", "v1.0.0")
            .await
            .unwrap();

        assert_eq!(info.repo_url(), "https://example.com/r");
        assert_eq!(info.module_dir(), "pkg");
        assert_eq!(info.commit(), "pkg/v1.0.0");
        assert!(!info.has_templates());
    }

    #[tokio::test]
    async fn static_match_ignores_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let resolver = static_resolver();

        let info = resolver
            .module_info(&cancel, "github.com/org/repo", "v1.0.0")
            .await
            .unwrap();
        assert_eq!(info.commit(), "v1.0.0");
    }
}

mod stdlib_tests {
    use super::*;

    #[tokio::test]
    async fn stdlib_uses_go_repo() {
        let resolver = static_resolver();
        let info = resolver
            .module_info(&CancellationToken::new(), "std", "v1.12.5")
            .await
            .unwrap();

        assert_eq!(info.repo_url(), "https://github.com/golang/go");
        assert_eq!(info.module_dir(), "src");
        assert_eq!(info.commit(), "go1.12.5");
        assert_eq!(
            info.directory_url("net/http"),
            "https://github.com/golang/go/tree/go1.12.5/src/net/http"
        );
    }

    #[tokio::test]
    async fn stdlib_invalid_version_is_surfaced() {
        let resolver = static_resolver();
        let err = resolver
            .module_info(&CancellationToken::new(), "std", "latest")
            .await
            .unwrap_err();

        assert!(matches!(
            err.root_cause(),
            SourceError::InvalidVersion { .. }
        ));
        assert!(err.to_string().contains("module_info"));
    }
}

mod dynamic_resolution_tests {
    use super::*;

    #[tokio::test]
    async fn discovered_github_repo_gets_templates() {
        let fetcher = CannedFetcher::ok("example.org/a/b", "https://github.com/a/b");
        let resolver = resolver_with(fetcher.clone());

        let info = resolver
            .module_info(&CancellationToken::new(), "example.org/a/b", "v1.0.0")
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(info.repo_url(), "https://github.com/a/b");
        assert_eq!(
            info.file_url("main.go"),
            "https://github.com/a/b/blob/v1.0.0/main.go"
        );
        assert_eq!(info.module_url(), "https://github.com/a/b/tree/v1.0.0");
    }

    #[tokio::test]
    async fn nested_module_under_discovered_root() {
        let fetcher = CannedFetcher::ok("example.org/a", "https://github.com/a/b/");
        let resolver = resolver_with(fetcher);

        let info = resolver
            .module_info(&CancellationToken::new(), "example.org/a/tools/lint", "v0.3.0")
            .await
            .unwrap();

        assert_eq!(info.repo_url(), "https://github.com/a/b");
        assert_eq!(info.module_dir(), "tools/lint");
        assert_eq!(info.commit(), "tools/lint/v0.3.0");
        assert_eq!(
            info.module_url(),
            "https://github.com/a/b/tree/tools/lint/v0.3.0/tools/lint"
        );
    }

    #[tokio::test]
    async fn googlesource_repo_url_matches_gitiles() {
        let fetcher = CannedFetcher::ok("golang.org/x/image", "https://go.googlesource.com/image");
        let resolver = resolver_with(fetcher);

        let info = resolver
            .module_info(
                &CancellationToken::new(),
                "golang.org/x/image",
                "v0.0.0-20190910094157-69e4b8554b2a",
            )
            .await
            .unwrap();

        assert_eq!(info.commit(), "69e4b8554b2a");
        assert_eq!(
            info.line_url("draw/draw.go", 5),
            "https://go.googlesource.com/image/+/69e4b8554b2a/draw/draw.go#5"
        );
    }

    #[tokio::test]
    async fn unknown_host_yields_empty_templates() {
        let fetcher = CannedFetcher::ok("example.org/a", "https://code.example.org/a");
        let resolver = resolver_with(fetcher);

        let info = resolver
            .module_info(&CancellationToken::new(), "example.org/a", "v1.0.0")
            .await
            .unwrap();

        assert!(!info.has_templates());
        assert_eq!(info.repo_url(), "https://code.example.org/a");
        assert_eq!(info.commit(), "v1.0.0");
        assert_eq!(info.file_url("main.go"), "");
    }

    #[tokio::test]
    async fn discovery_failure_is_wrapped() {
        let fetcher = CannedFetcher::err(|| DiscoveryError::NoMetaTags {
            url: "https://example.org/a?go-get=1".to_string(),
        });
        let resolver = resolver_with(fetcher);

        let err = resolver
            .module_info(&CancellationToken::new(), "example.org/a", "v1.0.0")
            .await
            .unwrap_err();

        assert!(matches!(
            err.root_cause(),
            SourceError::Discovery(DiscoveryError::NoMetaTags { .. })
        ));
        assert!(!err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("example.org/a"));
        assert!(msg.contains("v1.0.0"));
    }

    #[tokio::test]
    async fn malformed_repo_url_is_reported() {
        let fetcher = CannedFetcher::ok("example.org/a", "not a url");
        let resolver = resolver_with(fetcher);

        let err = resolver
            .module_info(&CancellationToken::new(), "example.org/a", "v1.0.0")
            .await
            .unwrap_err();

        assert!(matches!(
            err.root_cause(),
            SourceError::MalformedRepoUrl { url, .. } if url == "not a url"
        ));
    }

    #[tokio::test]
    async fn already_canceled_never_fetches() {
        let fetcher = CannedFetcher::ok("example.org/a", "https://github.com/a/b");
        let resolver = resolver_with(fetcher.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resolver
            .module_info(&cancel, "example.org/a", "v1.0.0")
            .await
            .unwrap_err();

        assert!(err.is_canceled());
        assert!(!err.is_timed_out());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_fetch() {
        let resolver = resolver_with(Arc::new(HangingFetcher));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = resolver
            .module_info(&cancel, "example.org/a", "v1.0.0")
            .await
            .unwrap_err();
        assert!(err.is_canceled());
    }

    #[tokio::test]
    async fn slow_fetch_times_out() {
        let resolver = resolver_with(Arc::new(HangingFetcher))
            .with_discovery_timeout(Duration::from_millis(20));

        let err = resolver
            .module_info(&CancellationToken::new(), "example.org/a", "v1.0.0")
            .await
            .unwrap_err();

        assert!(err.is_timed_out());
        assert!(!err.is_canceled());
    }
}

mod concurrency_tests {
    use super::*;

    #[test]
    fn resolver_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SourceResolver>();
        assert_send_sync::<SourceInfo>();
        assert_send_sync::<PatternTable>();
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let fetcher = CannedFetcher::ok("example.org/a", "https://github.com/a/b");
        let resolver = Arc::new(resolver_with(fetcher.clone()));

        let mut handles = Vec::new();
        for i in 0..8 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move {
                let version = format!("v1.{i}.0");
                let info = resolver
                    .module_info(&CancellationToken::new(), "example.org/a", &version)
                    .await
                    .unwrap();
                (version, info)
            }));
        }

        for handle in handles {
            let (version, info) = handle.await.unwrap();
            assert_eq!(info.commit(), version);
        }
        assert_eq!(fetcher.calls(), 8);
    }
}
