//! Delimited property-value handling.
//!
//! Build-definition properties carry lists as single `;`-delimited strings.
//! These helpers split, test, and aggregate such values the way the rest of
//! the pipeline expects: whitespace-trimmed, empties dropped.

/// The keyword that, when present in an explicit source or fallback-folder
/// list, means "use an empty list" instead of falling through to defaults.
pub const CLEAR_KEYWORD: &str = "clear";

/// Split a `;`-delimited property value, trimming entries and dropping
/// empty ones.
pub fn split_delimited(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Whether a property value means `true` (case-insensitive).
///
/// Blank values fall back to `default`.
pub fn is_true(value: &str, default: bool) -> bool {
    if value.trim().is_empty() {
        default
    } else {
        value.trim().eq_ignore_ascii_case("true")
    }
}

/// Whether a list contains the `clear` keyword (case-insensitive).
pub fn contains_clear_keyword(values: &[String]) -> bool {
    values
        .iter()
        .any(|value| value.eq_ignore_ascii_case(CLEAR_KEYWORD))
}

/// Aggregate additional per-project values, subtracting an excludes list.
///
/// Order is preserved and duplicates are dropped; exclusion is
/// case-insensitive to match how the values are compared elsewhere.
pub fn aggregate_values(values: &[String], excludes: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(values.len());

    for value in values {
        let excluded = excludes.iter().any(|e| e.eq_ignore_ascii_case(value));
        let duplicate = result.iter().any(|r| r.eq_ignore_ascii_case(value));
        if !excluded && !duplicate {
            result.push(value.clone());
        }
    }

    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn split_trims_and_drops_empties() {
        assert_eq!(
            split_delimited(" a ; ;b;; c"),
            vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]
        );
    }

    #[test]
    fn split_empty_value() {
        assert!(split_delimited("").is_empty());
        assert!(split_delimited(" ; ; ").is_empty());
    }

    #[test]
    fn is_true_cases() {
        assert!(is_true("true", false));
        assert!(is_true("TRUE", false));
        assert!(!is_true("false", true));
        assert!(!is_true("yes", false));
        assert!(is_true("", true));
        assert!(!is_true("  ", false));
    }

    #[test]
    fn clear_keyword_detection() {
        assert!(contains_clear_keyword(&["Clear".to_owned()]));
        assert!(contains_clear_keyword(&[
            "https://a".to_owned(),
            "clear".to_owned()
        ]));
        assert!(!contains_clear_keyword(&["clearly-not".to_owned()]));
        assert!(!contains_clear_keyword(&[]));
    }

    #[test]
    fn aggregate_subtracts_excludes() {
        let values = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let excludes = vec!["B".to_owned()];
        assert_eq!(
            aggregate_values(&values, &excludes),
            vec!["a".to_owned(), "c".to_owned()]
        );
    }

    #[test]
    fn aggregate_drops_duplicates() {
        let values = vec!["a".to_owned(), "A".to_owned(), "a".to_owned()];
        assert_eq!(aggregate_values(&values, &[]), vec!["a".to_owned()]);
    }
}
