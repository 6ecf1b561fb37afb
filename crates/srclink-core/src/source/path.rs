//! Slash-separated path helpers for repository-relative paths.

/// Join path elements with `/` and clean the result.
///
/// Empty elements are ignored; if every element is empty the result is the
/// empty string.
pub fn join(elems: &[&str]) -> String {
    let joined = elems
        .iter()
        .filter(|e| !e.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return joined;
    }
    clean(&joined)
}

/// Return the shortest equivalent of a slash-separated path.
///
/// Repeated separators collapse, `.` elements are dropped, and `..` removes
/// the preceding element when there is one. A rooted path stays rooted; a
/// relative path that cleans to nothing becomes `.`.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for elem in path.split('/') {
        match elem {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}
