//! Source locations for modules.
//!
//! This module finds the public repository that hosts a module and builds
//! links into it:
//! - Static matching of module paths against known hosting patterns
//! - Discovery through host meta tags when no pattern matches
//! - Mapping versions to tags or commit hashes
//! - Expanding URL templates for directories, files and lines

mod dynamic;
mod info;
pub mod path;
mod pattern;
mod resolver;
mod template;
mod version;

pub use dynamic::{DEFAULT_DISCOVERY_TIMEOUT, DynamicResolver};
pub use info::SourceInfo;
pub use pattern::{Pattern, PatternTable, REPO_GROUP, StaticMatch};
pub use resolver::SourceResolver;
pub use template::{TemplateSet, expand};
pub use version::{commit_from_version, is_pseudo_version};

#[cfg(test)]
mod tests;
