//! Repository discovery through host-provided metadata.
//!
//! Used when a module path matches no known hosting pattern. The host is
//! asked for its `go-import` / `go-source` meta tags over a [`Transport`].

mod meta;
mod transport;

pub use meta::{GoImportMetaFetcher, MetaFetcher, SourceMeta, parse_meta};
pub use transport::{ReqwestTransport, Transport};
