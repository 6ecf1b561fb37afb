//! srclink Core Library
//!
//! Finds the public repository, module directory and commit for a module
//! version, and builds links to its directories, files and lines.

pub mod config;
pub mod discovery;
pub mod error;
pub mod source;
pub mod stdlib;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{PatternConfig, ResolverConfig};

    // Errors
    pub use crate::error::{ConfigError, DiscoveryError, SourceError, SourceResult};

    // Discovery
    pub use crate::discovery::{GoImportMetaFetcher, MetaFetcher, ReqwestTransport, Transport};

    // Resolution
    pub use crate::source::{PatternTable, SourceInfo, SourceResolver, TemplateSet};

    // Standard library
    pub use crate::stdlib::{GoStdlib, StdlibSource};
}
