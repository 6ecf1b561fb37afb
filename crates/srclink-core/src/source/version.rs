//! Mapping module versions to commits.

use std::sync::LazyLock;

use regex::Regex;

const INCOMPATIBLE_SUFFIX: &str = "+incompatible";

static PSEUDO_VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v[0-9]+\.(0\.0-|[0-9]+\.[0-9]+-([^+]*\.)?0\.)[0-9]{14}-[A-Za-z0-9]+(\+incompatible)?$",
    )
    .expect("pseudo-version pattern is valid")
});

/// Return a string that refers to the commit corresponding to `version`.
///
/// The result is the revision hash for pseudo-versions, otherwise a tag.
/// `dir` is the module directory relative to the repository root; tags for
/// nested modules are prefixed with it.
pub fn commit_from_version(version: &str, dir: &str) -> String {
    let v = version.strip_suffix(INCOMPATIBLE_SUFFIX).unwrap_or(version);
    if is_pseudo_version(v) {
        return match v.rfind('-') {
            Some(idx) => v[idx + 1..].to_string(),
            None => v.to_string(),
        };
    }

    if dir.is_empty() {
        v.to_string()
    } else {
        format!("{dir}/{v}")
    }
}

/// Report whether `v` looks like a pseudo-version.
///
/// This is a heuristic: a hyphen count plus a shape check, not a full
/// version parser.
pub fn is_pseudo_version(v: &str) -> bool {
    v.matches('-').count() >= 2 && PSEUDO_VERSION_RE.is_match(v)
}
