//! Path normalization.
//!
//! Masks and request paths are compared in one canonical form: a single
//! leading slash, no trailing slash, no repeated slashes. The root path is
//! `/`.

/// Normalizes a path or path template.
///
/// ```
/// use meridian_core::normalize_path;
///
/// assert_eq!(normalize_path("//a//b/"), "/a/b");
/// assert_eq!(normalize_path("a/b"), "/a/b");
/// assert_eq!(normalize_path(""), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Joins a controller base path and a method path into a normalized mask.
///
/// ```
/// use meridian_core::join_paths;
///
/// assert_eq!(join_paths("orders", "{orderId}/items"), "/orders/{orderId}/items");
/// assert_eq!(join_paths("/", "/"), "/");
/// ```
#[must_use]
pub fn join_paths(base: &str, path: &str) -> String {
    normalize_path(&format!("{base}/{path}"))
}

/// Splits a normalized path into its segments. The root path has none.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_collapses_and_trims() {
        assert_eq!(normalize_path("//a//b/"), normalize_path("/a/b"));
        assert_eq!(normalize_path("/users/"), "/users");
        assert_eq!(normalize_path("///"), "/");
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("orders/", "/items"), "/orders/items");
        assert_eq!(join_paths("", "health"), "/health");
        assert_eq!(join_paths("api", ""), "/api");
    }

    #[test]
    fn test_segments() {
        let parts: Vec<_> = segments("/orders/{orderId}/items").collect();
        assert_eq!(parts, vec!["orders", "{orderId}", "items"]);
        assert_eq!(segments("/").count(), 0);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(path in "[a-z{}/]{0,24}") {
            let once = normalize_path(&path);
            prop_assert_eq!(normalize_path(&once), once.clone());
            prop_assert!(once.starts_with('/'));
            prop_assert!(once == "/" || !once.ends_with('/'));
            prop_assert!(!once.contains("//"));
        }
    }
}
