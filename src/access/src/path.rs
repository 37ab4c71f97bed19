//! Module path helpers
//!
//! Paths are opaque hierarchical strings: segments separated by `/`,
//! with no leading or trailing delimiter once canonical:
//! - `app/widgets/button`
//! - `app/widgets` (ancestor of the above)
//!
//! Nothing here touches the file system.

/// Segment delimiter
pub const DELIMITER: char = '/';

/// Strips every leading and trailing delimiter
pub fn trim(path: &str) -> &str {
    path.trim_matches(DELIMITER)
}

/// Joins two path fragments, skipping empty ones
///
/// # Examples
///
/// ```
/// use modvis_access::path::join;
///
/// assert_eq!(join("app", "widgets/"), "app/widgets");
/// assert_eq!(join("", "widgets"), "widgets");
/// ```
pub fn join(parent: &str, child: &str) -> String {
    let parent = trim(parent);
    let child = trim(child);

    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{}{}{}", parent, DELIMITER, child),
    }
}

/// Number of segments in a path
pub fn depth(path: &str) -> usize {
    path.split(DELIMITER).count()
}

/// Returns the segments of a path
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(DELIMITER)
}

/// Checks that a path is non-empty and has no empty segments
pub fn is_canonical(path: &str) -> bool {
    !path.is_empty() && segments(path).all(|segment| !segment.is_empty())
}

/// Checks if `ancestor` is a strict structural ancestor of `path`
///
/// Compares whole segments, so `app` is an ancestor of `app/x`
/// but not of `application/x`.
pub fn is_ancestor(ancestor: &str, path: &str) -> bool {
    if ancestor.is_empty() || ancestor.len() >= path.len() {
        return false;
    }

    path.strip_prefix(ancestor)
        .map_or(false, |rest| rest.starts_with(DELIMITER))
}

/// Returns the part of `path` below `location`
///
/// An empty location returns the path unchanged, and so does a location
/// that is not an ancestor of the path.
pub fn relative<'a>(path: &'a str, location: &str) -> &'a str {
    if is_ancestor(location, path) {
        &path[location.len() + DELIMITER.len_utf8()..]
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim() {
        assert_eq!(trim("/app/widgets/"), "app/widgets");
        assert_eq!(trim("//app//"), "app");
        assert_eq!(trim("app"), "app");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("app", "widgets"), "app/widgets");
        assert_eq!(join("/app/", "/widgets/"), "app/widgets");
        assert_eq!(join("", "widgets"), "widgets");
        assert_eq!(join("app", ""), "app");
    }

    #[test]
    fn test_depth() {
        assert_eq!(depth("app"), 1);
        assert_eq!(depth("app/widgets/button"), 3);
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical("app"));
        assert!(is_canonical("app/widgets/button"));
        assert!(!is_canonical(""));
        assert!(!is_canonical("/app"));
        assert!(!is_canonical("app/"));
        assert!(!is_canonical("app//widgets"));
    }

    #[test]
    fn test_is_ancestor() {
        assert!(is_ancestor("app", "app/widgets"));
        assert!(is_ancestor("app", "app/widgets/button"));
        assert!(!is_ancestor("app", "app"));
        assert!(!is_ancestor("app", "application/x"));
        assert!(!is_ancestor("app/widgets", "app"));
        assert!(!is_ancestor("", "app"));
    }

    #[test]
    fn test_relative() {
        assert_eq!(relative("app/widgets/button", "app"), "widgets/button");
        assert_eq!(relative("app/widgets", ""), "app/widgets");
        assert_eq!(relative("vendor/lib", "app"), "vendor/lib");
    }
}
