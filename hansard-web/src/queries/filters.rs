//! SQL fragments shared by the aggregation queries
//!
//! Queries alias `parts` as `p` and `talkers` as `t`. Filter clauses are
//! appended as `AND ...` after a query's own base condition.

use sqlx::{QueryBuilder, Sqlite};

use crate::params::QueryFilters;

/// Every `parts` column, in [`SpeechPart`](hansard_common::db::SpeechPart) order
pub(crate) const PART_COLUMNS: &str = "p.speech_id, p.part_seq, p.speech_seq, p.debate_seq, \
     p.subdebate_1_seq, p.subdebate_2_seq, p.debate_title, p.debate_category, \
     p.subdebate_1_title, p.subdebate_2_title, p.type, p.house, p.date, p.bill_ids, \
     p.content, p.talker_id, p.part_type";

/// Talker fields as flattened onto a part
pub(crate) const TALKER_COLUMNS: &str =
    "t.name AS talker_name, t.party AS talker_party, t.electorate AS talker_electorate";

/// Canonical order of proceedings within a sitting day
pub(crate) const READING_ORDER: &str =
    "p.debate_seq, p.subdebate_1_seq, p.subdebate_2_seq, p.speech_seq";

/// Title shown for a part's debate
pub(crate) const DISPLAY_TITLE: &str = "COALESCE(p.subdebate_1_title, p.debate_title)";

/// Which parts represent a speech
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeadRule {
    /// `part_seq = 0`
    Head,
    /// Head parts plus bill first-reading markers
    HeadOrFirstReading,
    /// Every fragment
    AnyPart,
}

impl HeadRule {
    pub(crate) fn condition(self) -> &'static str {
        match self {
            HeadRule::Head => "p.part_seq = 0",
            HeadRule::HeadOrFirstReading => "(p.part_seq = 0 OR p.type = 'first_reading')",
            HeadRule::AnyPart => "1 = 1",
        }
    }
}

/// How the bill filter is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BillColumn {
    /// The part's `bill_ids` array contains the bill
    Contains,
    /// An unwound or extracted bill id expression equals the bill
    Value(&'static str),
}

/// Build an FTS5 query matching every term of `text`; `None` for blank text
pub fn fts_query(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

/// Append `AND` clauses for every active filter. The free-text stage comes
/// first so the remaining predicates only see matching parts. Party and
/// electorate clauses reference `t`; callers join talkers when
/// [`QueryFilters::needs_talker_join`] holds.
pub(crate) fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filters: &QueryFilters, bill: BillColumn) {
    if let Some(fts) = filters.text.as_deref().and_then(fts_query) {
        qb.push(" AND p.rowid IN (SELECT rowid FROM parts_fts WHERE parts_fts MATCH ");
        qb.push_bind(fts);
        qb.push(")");
    }

    push_in(
        qb,
        "p.house",
        filters.houses.iter().map(|h| h.as_str().to_string()).collect(),
    );
    push_in(qb, "p.debate_category", filters.categories.clone());
    push_in(qb, "t.party", filters.parties.clone());
    push_in(qb, "t.electorate", filters.electorates.clone());

    if let Some(from) = filters.from {
        qb.push(" AND p.date >= ").push_bind(from);
    }
    if let Some(to) = filters.to {
        qb.push(" AND p.date <= ").push_bind(to);
    }
    if let Some(talker_id) = &filters.talker_id {
        qb.push(" AND p.talker_id = ").push_bind(talker_id.clone());
    }
    if let Some(bill_id) = &filters.bill_id {
        match bill {
            BillColumn::Contains => {
                qb.push(" AND EXISTS (SELECT 1 FROM json_each(p.bill_ids) WHERE json_each.value = ")
                    .push_bind(bill_id.clone())
                    .push(")");
            }
            BillColumn::Value(column) => {
                qb.push(format!(" AND {column} = ")).push_bind(bill_id.clone());
            }
        }
    }
}

/// `AND column IN (?, ?, ...)`; nothing for an empty set
fn push_in(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, values: Vec<String>) {
    if values.is_empty() {
        return;
    }
    qb.push(format!(" AND {column} IN ("));
    let mut separated = qb.separated(", ");
    for value in values {
        separated.push_bind(value);
    }
    separated.push_unseparated(")");
}

/// `FROM parts p` with the talker join the filters require
pub(crate) fn push_parts_source(qb: &mut QueryBuilder<'_, Sqlite>, filters: &QueryFilters) {
    qb.push(" FROM parts p");
    if filters.needs_talker_join() {
        qb.push(" JOIN talkers t ON t.id = p.talker_id");
    }
}
