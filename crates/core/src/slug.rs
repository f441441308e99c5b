//! Canonical slug derivation and humanization.
//!
//! Slugs are the join key between categories and products, so both backends
//! must derive them identically. `slugify` is idempotent: re-slugging a slug
//! returns it unchanged.

/// Convert free text to a canonical URL-safe slug.
///
/// Lowercases, trims, collapses every run of non-alphanumeric characters to a
/// single hyphen, and strips leading/trailing hyphens. Empty or
/// all-punctuation input produces an empty string; callers must treat an
/// empty slug as "no identifier".
///
/// # Example
///
/// ```
/// use toolkart_core::slug::slugify;
///
/// assert_eq!(slugify("  Power Tools! "), "power-tools");
/// assert_eq!(slugify("---"), "");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    out
}

/// Convert a slug back to display text by title-casing each segment.
///
/// Lossy inverse of [`slugify`]: original casing and punctuation are not
/// recoverable, but `slugify(humanize(slugify(x))) == slugify(x)` holds.
#[must_use]
pub fn humanize(slug: &str) -> String {
    slug.split('-')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Power Tools"), "power-tools");
        assert_eq!(slugify("Hand  Tools"), "hand-tools");
        assert_eq!(slugify("3M Safety"), "3m-safety");
    }

    #[test]
    fn test_slugify_collapses_punctuation_runs() {
        assert_eq!(slugify("Drills & Drivers!!"), "drills-drivers");
        assert_eq!(slugify("a---b___c"), "a-b-c");
    }

    #[test]
    fn test_slugify_strips_edge_hyphens() {
        assert_eq!(slugify("--edge--"), "edge");
        assert_eq!(slugify("  trimmed  "), "trimmed");
    }

    #[test]
    fn test_slugify_empty_and_punctuation_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn test_slugify_idempotent() {
        for input in ["Power Tools", "a---b", "  Mixed CASE 42 ", "émile"] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("power-tools"), "Power Tools");
        assert_eq!(humanize("general"), "General");
        assert_eq!(humanize(""), "");
        assert_eq!(humanize("-double--hyphen-"), "Double Hyphen");
    }

    #[test]
    fn test_reslug_after_humanize_is_stable() {
        for input in ["Power Tools", "Drills & Drivers", "3M Safety Gear"] {
            let slug = slugify(input);
            assert_eq!(slugify(&humanize(&slug)), slug);
        }
    }
}
