//! Query-string normalization
//!
//! Multi-valued parameters arrive as repeated keys (`?party=ALP&party=LP`).
//! [`ParamMap::list`] turns them into a de-duplicated list without blanks and
//! [`ParamMap::str`] yields `""` for anything absent, so filter building never
//! deals with missing values.

use chrono::NaiveDate;
use hansard_common::db::House;
use hansard_common::time::parse_filter_date;
use std::collections::HashMap;

/// All values of every query parameter, in arrival order
#[derive(Debug, Clone, Default)]
pub struct ParamMap {
    values: HashMap<String, Vec<String>>,
}

impl ParamMap {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            values.entry(key.into()).or_default().push(value.into());
        }
        Self { values }
    }

    /// Trimmed, non-blank, de-duplicated values (first occurrence wins)
    pub fn list(&self, key: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for value in self.values.get(key).into_iter().flatten() {
            let value = value.trim();
            if !value.is_empty() && !out.iter().any(|v| v == value) {
                out.push(value.to_string());
            }
        }
        out
    }

    /// First value, trimmed; `""` when absent
    pub fn str(&self, key: &str) -> String {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// First non-blank value among several aliases
    pub fn str_any(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|key| self.str(key))
            .find(|value| !value.is_empty())
            .unwrap_or_default()
    }

    /// Integer value; unparseable or absent yields `None`
    pub fn int(&self, keys: &[&str]) -> Option<i64> {
        keys.iter().find_map(|key| self.str(key).parse().ok())
    }

    fn opt(&self, key: &str) -> Option<String> {
        Some(self.str(key)).filter(|v| !v.is_empty())
    }
}

impl From<Vec<(String, String)>> for ParamMap {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::from_pairs(pairs)
    }
}

/// Normalized record filters. Lists are OR-combined within themselves,
/// distinct fields are AND-combined, and empty fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilters {
    pub parties: Vec<String>,
    pub electorates: Vec<String>,
    pub houses: Vec<House>,
    pub categories: Vec<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Free-text query; never blank when present
    pub text: Option<String>,
    pub talker_id: Option<String>,
    pub bill_id: Option<String>,
}

impl QueryFilters {
    pub fn from_params(params: &ParamMap) -> Self {
        let mut houses: Vec<House> = Vec::new();
        for house in params.list("house").iter().filter_map(|h| House::from_str(h)) {
            if !houses.contains(&house) {
                houses.push(house);
            }
        }

        Self {
            parties: params.list("party"),
            electorates: params.list("electorate"),
            houses,
            categories: params.list("debate_category"),
            from: parse_filter_date(&params.str("from")),
            to: parse_filter_date(&params.str("to")),
            text: Some(params.str_any(&["query", "q"])).filter(|t| !t.is_empty()),
            talker_id: params.opt("talker_id"),
            bill_id: params.opt("bill_id"),
        }
    }

    /// Filters restricted to a single bill
    pub fn for_bill(bill_id: impl Into<String>) -> Self {
        Self::default().with_bill(bill_id)
    }

    pub fn with_bill(mut self, bill_id: impl Into<String>) -> Self {
        self.bill_id = Some(bill_id.into());
        self
    }

    /// True when a filter can only be evaluated after joining talkers
    pub fn needs_talker_join(&self) -> bool {
        !self.parties.is_empty() || !self.electorates.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParamMap {
        ParamMap::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_list_dedups_and_drops_blanks() {
        let p = params(&[("party", "ALP"), ("party", " "), ("party", "LP"), ("party", "ALP")]);
        assert_eq!(p.list("party"), vec!["ALP", "LP"]);
        assert!(p.list("electorate").is_empty());
    }

    #[test]
    fn test_str_defaults_to_empty() {
        let p = params(&[("from", " 2025-01-01 "), ("from", "2026-01-01")]);
        assert_eq!(p.str("from"), "2025-01-01");
        assert_eq!(p.str("to"), "");
    }

    #[test]
    fn test_filters_ignore_malformed_dates() {
        let filters = QueryFilters::from_params(&params(&[("from", "garbage"), ("to", "2025-02-01")]));
        assert_eq!(filters.from, None);
        assert_eq!(filters.to, NaiveDate::from_ymd_opt(2025, 2, 1));
    }

    #[test]
    fn test_filters_blank_text_is_absent() {
        let filters = QueryFilters::from_params(&params(&[("query", "   ")]));
        assert_eq!(filters.text, None);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_filters_houses_parsed() {
        let filters = QueryFilters::from_params(&params(&[
            ("house", "senate"),
            ("house", "hor"),
            ("house", "lords"),
            ("house", "Senate"),
        ]));
        assert_eq!(filters.houses, vec![House::Senate, House::Hor]);
    }

    #[test]
    fn test_talker_join_needed_for_party_or_electorate() {
        let mut filters = QueryFilters::default();
        assert!(!filters.needs_talker_join());
        filters.electorates.push("Canberra".to_string());
        assert!(filters.needs_talker_join());
    }
}
