//! Attribute code filters and their CQL rendering

use std::cmp::Ordering;

/// Orders legend codes by numeric value.
///
/// Ties between equal values ("1" and "01") fall back to the text so the
/// order stays total. Numeric codes come before anything non-numeric, which
/// compares lexically.
pub fn compare_codes(a: &str, b: &str) -> Ordering {
    match (numeric_value(a), numeric_value(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Spellings like "inf" or "NaN" parse as floats but are not codes with a value
fn numeric_value(code: &str) -> Option<f64> {
    code.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Set of selected codes, kept sorted with [`compare_codes`]. Empty means no filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeFilter {
    codes: Vec<String>,
}

impl CodeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut filter = Self::new();
        for code in codes {
            filter.insert(code.into());
        }
        filter
    }

    fn position(&self, code: &str) -> Result<usize, usize> {
        self.codes
            .binary_search_by(|probe| compare_codes(probe, code))
    }

    fn insert(&mut self, code: String) -> bool {
        match self.position(&code) {
            Ok(_) => false,
            Err(index) => {
                self.codes.insert(index, code);
                true
            }
        }
    }

    /// Adds the code if absent, removes it otherwise. Returns whether it is now selected.
    pub fn toggle(&mut self, code: &str) -> bool {
        match self.position(code) {
            Ok(index) => {
                self.codes.remove(index);
                false
            }
            Err(index) => {
                self.codes.insert(index, code.to_string());
                true
            }
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.position(code).is_ok()
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }
}

/// Builds `ATTR IN ('a','b')` for a non-empty code list.
///
/// `None` means the parameter must be dropped from the request, not sent as an
/// always-true expression. Codes pass through unvalidated; single quotes are
/// doubled so the literal stays closed.
pub fn build_cql_filter(attribute: &str, codes: &[String]) -> Option<String> {
    if codes.is_empty() {
        return None;
    }

    let values = codes
        .iter()
        .map(|code| format!("'{}'", code.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(",");

    Some(format!("{attribute} IN ({values})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_order() {
        let mut codes = vec!["10", "9", "01", "1", "05"];
        codes.sort_by(|a, b| compare_codes(a, b));
        assert_eq!(codes, vec!["01", "1", "05", "9", "10"]);
    }

    #[test]
    fn test_non_numeric_after_numeric() {
        let mut codes = vec!["b", "99", "a", "02"];
        codes.sort_by(|a, b| compare_codes(a, b));
        assert_eq!(codes, vec!["02", "99", "a", "b"]);
    }

    #[test]
    fn test_non_finite_spellings_sort_as_text() {
        let mut filter = CodeFilter::new();
        for code in ["+5", "+inf", "1", "NaN"] {
            filter.toggle(code);
        }
        assert_eq!(filter.codes(), &["1", "+5", "+inf", "NaN"]);
        assert_eq!(compare_codes("inf", "7"), Ordering::Greater);
    }

    #[test]
    fn test_toggle_keeps_sorted() {
        let mut filter = CodeFilter::new();
        assert!(filter.toggle("05"));
        assert!(filter.toggle("01"));
        assert_eq!(filter.codes(), &["01", "05"]);

        assert!(!filter.toggle("05"));
        assert_eq!(filter.codes(), &["01"]);
        assert!(filter.contains("01"));
        assert!(!filter.contains("05"));
    }

    #[test]
    fn test_odd_click_counts_survive() {
        let clicks = [
            "93", "01", "05", "93", "28", "01", "99", "05", "05", "93", "02", "99",
        ];
        let mut filter = CodeFilter::new();
        for code in clicks {
            filter.toggle(code);
        }

        let mut expected: Vec<&str> = Vec::new();
        for code in clicks {
            let count = clicks.iter().filter(|c| **c == code).count();
            if count % 2 == 1 && !expected.contains(&code) {
                expected.push(code);
            }
        }
        expected.sort_by(|a, b| compare_codes(a, b));

        assert_eq!(filter.codes(), expected.as_slice());
        assert_eq!(filter.codes(), &["02", "05", "28", "93"]);
    }

    #[test]
    fn test_from_codes_dedups() {
        let filter = CodeFilter::from_codes(["3", "1", "3"]);
        assert_eq!(filter.codes(), &["1", "3"]);
    }

    #[test]
    fn test_cql_expression() {
        let codes = vec!["01".to_string(), "05".to_string()];
        let first = build_cql_filter("SLTP_CD", &codes);
        assert_eq!(first.as_deref(), Some("SLTP_CD IN ('01','05')"));
        assert_eq!(build_cql_filter("SLTP_CD", &codes), first);
    }

    #[test]
    fn test_empty_filter_has_no_expression() {
        assert_eq!(build_cql_filter("FRTP_CD", &[]), None);
    }

    #[test]
    fn test_quotes_are_escaped() {
        let codes = vec!["o'k".to_string()];
        assert_eq!(
            build_cql_filter("FRTP_CD", &codes).as_deref(),
            Some("FRTP_CD IN ('o''k')")
        );
    }
}
