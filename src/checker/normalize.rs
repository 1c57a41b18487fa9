// src/checker/normalize.rs
// =============================================================================
// This module normalizes robots directive strings.
//
// The same directive can be written many ways:
//   "NoIndex ,  NoFollow"
//   "noindex,nofollow"
//   "  NOINDEX, nofollow  "
// All of them normalize to "noindex,nofollow", so the header and meta tag
// checks can share one simple substring test.
//
// Rust concepts:
// - &str vs String: we borrow the input and return a new owned String
// - Iterators: split / map / collect
// =============================================================================

use serde::Serialize;

// The two directives we care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Directive {
    /// Page must not be indexed
    NoIndex,
    /// Links on the page must not be followed
    NoFollow,
}

impl Directive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::NoIndex => "noindex",
            Directive::NoFollow => "nofollow",
        }
    }
}

// Normalizes a robots directive value
//
// Steps:
// 1. Lower-case everything
// 2. Trim leading/trailing whitespace
// 3. Remove whitespace around every comma
//
// Example:
//   "NoIndex ,  nofollow" -> "noindex,nofollow"
//
// Applying it twice gives the same result as applying it once.
pub fn normalize(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(",")
}

// Checks whether a normalized value carries noindex or nofollow
//
// Plain substring test: matches inside longer lists like
// "max-snippet:-1,noindex" without parsing the whole robots grammar.
pub fn has_exclusion(normalized: &str) -> bool {
    !directives(normalized).is_empty()
}

// Lists which exclusion directives appear in a normalized value
pub fn directives(normalized: &str) -> Vec<Directive> {
    [Directive::NoIndex, Directive::NoFollow]
        .into_iter()
        .filter(|d| normalized.contains(d.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_around_commas() {
        assert_eq!(normalize("NoIndex ,  nofollow"), "noindex,nofollow");
        assert_eq!(normalize("noindex,nofollow"), "noindex,nofollow");
        assert_eq!(normalize("\tNOINDEX,\n FOLLOW  "), "noindex,follow");
    }

    #[test]
    fn test_keeps_inner_whitespace() {
        // Only whitespace next to a comma is removed
        assert_eq!(normalize("max snippet , noindex"), "max snippet,noindex");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "",
            "   ",
            ",",
            " , , ",
            "NoIndex ,  nofollow",
            "max-snippet:-1, NOINDEX",
            "  all  ",
            "a ,b, c ,d",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_has_exclusion() {
        assert!(has_exclusion("noindex"));
        assert!(has_exclusion("max-snippet:-1,noindex"));
        assert!(has_exclusion("index,nofollow"));
        assert!(!has_exclusion("index,follow"));
        assert!(!has_exclusion("max-snippet:-1"));
        assert!(!has_exclusion(""));
    }

    #[test]
    fn test_directives_lists_both() {
        assert_eq!(
            directives("noindex,nofollow"),
            vec![Directive::NoIndex, Directive::NoFollow]
        );
        assert_eq!(directives("nofollow"), vec![Directive::NoFollow]);
        assert!(directives("all").is_empty());
    }
}
