//! Error types for source resolution.
//!
//! Errors from the lower layers (transport, metadata discovery, pattern
//! validation) are kept as their own enums and carried as the cause of a
//! [`SourceError`], so callers can always reach the original failure through
//! [`std::error::Error::source`] or [`SourceError::root_cause`].

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for source resolution.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors surfaced while resolving a module to its source repository.
#[derive(Debug, Error)]
pub enum SourceError {
    /// No static pattern matched. Used internally to trigger discovery.
    #[error("no known repository pattern matches {identifier:?}")]
    NotFound {
        /// The module path or repository reference that was matched
        identifier: String,
    },

    /// The version cannot be mapped to a commit.
    #[error("invalid version {version:?}: {reason}")]
    InvalidVersion {
        /// The offending version string
        version: String,
        /// Why it was rejected
        reason: String,
    },

    /// Host metadata could not be fetched or understood.
    #[error("metadata discovery failed")]
    Discovery(#[from] DiscoveryError),

    /// The discovered repository URL is not a valid URL.
    #[error("malformed repository URL {url:?}")]
    MalformedRepoUrl {
        /// The URL as reported by the host
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The caller canceled the operation.
    #[error("operation canceled")]
    Canceled,

    /// The bounded discovery request ran past its deadline.
    #[error("operation timed out after {0:?}")]
    TimedOut(Duration),

    /// An error annotated with the operation and its arguments.
    #[error("{operation}({module_path:?}, {version:?})")]
    Context {
        operation: &'static str,
        module_path: String,
        version: String,
        #[source]
        source: Box<SourceError>,
    },
}

impl SourceError {
    /// Wrap this error with the operation and arguments that produced it.
    pub fn with_context(
        self,
        operation: &'static str,
        module_path: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::Context {
            operation,
            module_path: module_path.into(),
            version: version.into(),
            source: Box::new(self),
        }
    }

    /// Strip every [`SourceError::Context`] layer and return the underlying error.
    pub fn root_cause(&self) -> &SourceError {
        let mut current = self;
        while let Self::Context { source, .. } = current {
            current = source;
        }
        current
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::NotFound { .. })
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self.root_cause(), Self::Canceled)
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self.root_cause(), Self::TimedOut(_))
    }
}

/// Extension trait for attaching call context to a [`SourceResult`].
pub trait ResultExt<T> {
    fn with_context(
        self,
        operation: &'static str,
        module_path: &str,
        version: &str,
    ) -> SourceResult<T>;
}

impl<T> ResultExt<T> for SourceResult<T> {
    fn with_context(
        self,
        operation: &'static str,
        module_path: &str,
        version: &str,
    ) -> SourceResult<T> {
        self.map_err(|e| e.with_context(operation, module_path, version))
    }
}

/// Errors from the metadata discovery collaborator.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The page carrying the metadata could not be retrieved.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The page has no usable metadata tag for the module.
    #[error("no go-import meta tag found at {url}")]
    NoMetaTags { url: String },

    /// A metadata tag was present but could not be parsed.
    #[error("malformed meta tag content {content:?}")]
    InvalidMetaTag { content: String },

    /// More than one `go-import` tag applies to the module path.
    #[error("more than one go-import meta tag found for {module_path:?}")]
    AmbiguousMetaTags { module_path: String },

    /// A `go-source` tag appeared before any matching `go-import` tag.
    #[error("go-source meta tag without go-import for {module_path:?}")]
    SourceWithoutImport { module_path: String },

    /// `go-import` and `go-source` disagree on the repository root.
    #[error("go-import prefix {import_prefix:?} and go-source prefix {source_prefix:?} differ")]
    PrefixMismatch {
        import_prefix: String,
        source_prefix: String,
    },

    /// The module path cannot be turned into a request URL.
    #[error("cannot build discovery URL for {module_path:?}")]
    InvalidModulePath {
        module_path: String,
        #[source]
        source: url::ParseError,
    },
}

/// Errors from the HTTP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    /// Network or HTTP client error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Errors raised while building a pattern table.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid pattern {pattern:?}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("pattern {pattern:?} missing <repo> group")]
    MissingRepoGroup { pattern: String },
}

/// Errors from loading resolver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error in {}{context}", .path.display())]
    Parse {
        path: PathBuf,
        /// Offending line with its neighbours, if the location is known
        context: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("discovery_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("failed to build HTTP transport")]
    Transport(#[from] TransportError),
}
