//! Search-term sanitization for the full-text query store

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Anything that is neither a word character nor a double quote
    static ref INVALID_SEARCH_CHARS: Regex = Regex::new(r#"[^\w"]"#).unwrap();
}

/// Reduce free text to something the full-text index accepts.
///
/// Operators and punctuation become spaces, quotes survive only when they
/// pair up, and blank input yields `None` so callers can match nothing
/// instead of everything.
pub fn sanitize_query_syntax(terms: &str) -> Option<String> {
    let terms = remove_invalid_search_characters(terms);
    let terms = remove_unbalanced_quotes(&terms);
    let terms = terms.trim();

    (!terms.is_empty()).then(|| terms.to_string())
}

fn remove_invalid_search_characters(terms: &str) -> String {
    INVALID_SEARCH_CHARS.replace_all(terms, " ").into_owned()
}

fn remove_unbalanced_quotes(terms: &str) -> String {
    if terms.matches('"').count() % 2 == 0 {
        terms.to_string()
    } else {
        terms.replace('"', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_become_spaces() {
        assert_eq!(sanitize_query_syntax("logo* OR -brand").as_deref(), Some("logo  OR  brand"));
    }

    #[test]
    fn test_balanced_quotes_kept() {
        assert_eq!(
            sanitize_query_syntax("\"new logo\" draft").as_deref(),
            Some("\"new logo\" draft")
        );
    }

    #[test]
    fn test_unbalanced_quotes_removed() {
        assert_eq!(sanitize_query_syntax("\"new logo").as_deref(), Some("new logo"));
    }

    #[test]
    fn test_blank_is_none() {
        assert_eq!(sanitize_query_syntax(""), None);
        assert_eq!(sanitize_query_syntax("  ?! "), None);
    }
}
