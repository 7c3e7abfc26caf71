//! Sort criteria and filter thresholds for the results list.

use std::cmp::Ordering;

use crate::dom::markup::parse_float_prefix;

use super::ResultItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    SimilarityDesc,
    SimilarityAsc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    /// Parse a sort control value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "similarity-desc" => Some(Self::SimilarityDesc),
            "similarity-asc" => Some(Self::SimilarityAsc),
            "name-asc" => Some(Self::NameAsc),
            "name-desc" => Some(Self::NameDesc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimilarityDesc => "similarity-desc",
            Self::SimilarityAsc => "similarity-asc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    pub fn compare(&self, a: &ResultItem, b: &ResultItem) -> Ordering {
        match self {
            Self::SimilarityDesc => b.score.total_cmp(&a.score),
            Self::SimilarityAsc => a.score.total_cmp(&b.score),
            Self::NameAsc => collate(&a.title, &b.title),
            Self::NameDesc => collate(&b.title, &a.title),
        }
    }
}

/// Case-insensitive ordering with a case-sensitive tiebreak.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Minimum score from a filter control value; absent or unparsable means 0.
pub fn parse_threshold(value: &str) -> f64 {
    parse_float_prefix(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_known_orders() {
        for order in [
            SortOrder::SimilarityDesc,
            SortOrder::SimilarityAsc,
            SortOrder::NameAsc,
            SortOrder::NameDesc,
        ] {
            assert_eq!(SortOrder::parse(order.as_str()), Some(order));
        }
        assert_eq!(SortOrder::parse("relevance"), None);
        assert_eq!(SortOrder::parse(""), None);
    }

    #[test]
    fn test_collate_ignores_case_first() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Zeta", "alpha"), Ordering::Greater);
        assert_ne!(collate("abc", "ABC"), Ordering::Equal);
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.7"), 0.7);
        assert_eq!(parse_threshold(""), 0.0);
        assert_eq!(parse_threshold("all"), 0.0);
    }
}
