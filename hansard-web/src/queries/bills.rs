//! Bill listings
//!
//! A bill has no record of its own: its identity is the id found in parts'
//! `bill_ids`, and its title is derived from those parts by a
//! [`BillTitleStrategy`].

use chrono::NaiveDate;
use hansard_common::db::House;
use hansard_common::Result;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use super::filters::{push_filters, BillColumn, HeadRule, DISPLAY_TITLE};
use crate::pagination::{Page, PageRequest};
use crate::params::QueryFilters;
use crate::store::{QueryContext, RecordStore};

/// Number of bills returned by [`bill_discussion`]
pub const TOP_BILLS_LIMIT: i64 = 10;

/// Heuristic choosing a bill's canonical title among its parts' titles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillTitleStrategy {
    /// Title of the first part in reading order (date, then speech id, break ties)
    FirstInReadingOrder,
    /// Shortest non-null title; shorter parent-debate titles tend to be the bill name
    Shortest,
}

impl BillTitleStrategy {
    /// Window ordering over the `scoped` columns; row 1 carries the title
    fn window_order(self) -> &'static str {
        match self {
            BillTitleStrategy::FirstInReadingOrder => {
                "debate_seq, subdebate_1_seq, subdebate_2_seq, speech_seq, date, speech_id"
            }
            BillTitleStrategy::Shortest => {
                "title IS NULL, LENGTH(title), date, debate_seq, subdebate_1_seq, subdebate_2_seq, speech_seq, speech_id"
            }
        }
    }
}

/// Row of the single-bill listing
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct BillListRow {
    pub id: String,
    pub title: Option<String>,
    pub date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub house: House,
}

/// Row of the top-bills summary
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct BillDiscussionRow {
    pub bill_id: String,
    pub bill_title: Option<String>,
    pub speech_count: i64,
    pub talker_count: i64,
    pub latest_speech_date: NaiveDate,
}

/// Row of the detailed bill listing
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct BillDetailRow {
    pub id: String,
    pub bill_title: Option<String>,
    pub latest_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub latest_house: House,
    pub num_speeches: i64,
}

/// Which parts feed a bill query and how they map to bills
#[derive(Debug, Clone, Copy)]
struct BillScope {
    head: HeadRule,
    /// One row per (part, bill) pair instead of requiring a single bill
    unwind: bool,
    strategy: BillTitleStrategy,
}

/// `WITH scoped AS (...), ranked AS (...)`: one `scoped` row per qualifying
/// (part, bill) and the strategy's title choice in `ranked` row 1
fn bill_scope<'a>(filters: &QueryFilters, scope: BillScope) -> QueryBuilder<'a, Sqlite> {
    let bill_expr = if scope.unwind {
        "b.value"
    } else {
        "json_extract(p.bill_ids, '$[0]')"
    };

    let mut qb = QueryBuilder::new(format!(
        "WITH scoped AS (SELECT {bill_expr} AS bill_id, p.speech_id, p.talker_id, p.date, p.house, \
         {DISPLAY_TITLE} AS title, p.debate_seq, p.subdebate_1_seq, p.subdebate_2_seq, p.speech_seq \
         FROM parts p"
    ));
    if scope.unwind {
        qb.push(" JOIN json_each(p.bill_ids) AS b");
    }
    qb.push(" LEFT JOIN talkers t ON t.id = p.talker_id WHERE ");
    qb.push(scope.head.condition());
    if !scope.unwind {
        qb.push(" AND json_array_length(p.bill_ids) = 1");
    }
    push_filters(&mut qb, filters, BillColumn::Value(bill_expr));
    qb.push(format!(
        "), ranked AS (SELECT bill_id, title, date, house, \
         ROW_NUMBER() OVER (PARTITION BY bill_id ORDER BY {}) AS rn FROM scoped) ",
        scope.strategy.window_order()
    ));
    qb
}

/// Bills referenced by exactly one head or first-reading part each, newest first.
///
/// Parts that mention no bill or several bills are left out: their
/// attribution is ambiguous.
pub async fn bills_list(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
    page: PageRequest,
) -> Result<Page<BillListRow>> {
    let scope = BillScope {
        head: HeadRule::HeadOrFirstReading,
        unwind: false,
        strategy: BillTitleStrategy::FirstInReadingOrder,
    };

    ctx.run("bills_list", async {
        let mut rows_qb = bill_scope(filters, scope);
        rows_qb.push(
            "SELECT bill_id AS id, title, date, house FROM ranked WHERE rn = 1 \
             ORDER BY date DESC, title IS NULL, title ASC, bill_id ASC LIMIT ",
        );
        rows_qb.push_bind(page.limit());
        rows_qb.push(" OFFSET ");
        rows_qb.push_bind(page.offset());
        let rows: Vec<BillListRow> = rows_qb
            .build_query_as()
            .fetch_all(store.pool())
            .await?;

        let mut count_qb = bill_scope(filters, scope);
        count_qb.push("SELECT COUNT(*) FROM ranked WHERE rn = 1");
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(store.pool())
            .await?;

        debug!(query = "bills_list", rows = rows.len(), total, "Query complete");
        Ok(Page::new(rows, total as u64))
    })
    .await
}

/// The most discussed bills: head parts credited to every bill they mention
pub async fn bill_discussion(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
) -> Result<Page<BillDiscussionRow>> {
    let scope = BillScope {
        head: HeadRule::Head,
        unwind: true,
        strategy: BillTitleStrategy::Shortest,
    };

    ctx.run("bill_discussion", async {
        let mut qb = bill_scope(filters, scope);
        qb.push(
            "SELECT s.bill_id AS bill_id, r.title AS bill_title, COUNT(*) AS speech_count, \
             COUNT(DISTINCT s.talker_id) AS talker_count, MAX(s.date) AS latest_speech_date \
             FROM scoped s JOIN ranked r ON r.bill_id = s.bill_id AND r.rn = 1 \
             GROUP BY s.bill_id, r.title \
             ORDER BY speech_count DESC, latest_speech_date DESC, s.bill_id ASC LIMIT ",
        );
        qb.push_bind(TOP_BILLS_LIMIT);
        let rows: Vec<BillDiscussionRow> = qb.build_query_as().fetch_all(store.pool()).await?;

        debug!(query = "bill_discussion", rows = rows.len(), "Query complete");
        Ok(Page::complete(rows))
    })
    .await
}

/// Every bill mentioned by any part, with its latest activity
pub async fn bills_detailed(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
    page: PageRequest,
) -> Result<Page<BillDetailRow>> {
    let scope = BillScope {
        head: HeadRule::AnyPart,
        unwind: true,
        strategy: BillTitleStrategy::Shortest,
    };

    ctx.run("bills_detailed", async {
        let mut rows_qb = bill_scope(filters, scope);
        rows_qb.push(
            "SELECT s.bill_id AS id, r.title AS bill_title, MAX(s.date) AS latest_date, \
             (SELECT l.house FROM scoped l WHERE l.bill_id = s.bill_id \
              ORDER BY l.date DESC, l.debate_seq DESC, l.subdebate_1_seq DESC, \
              l.subdebate_2_seq DESC, l.speech_seq DESC LIMIT 1) AS latest_house, \
             COUNT(DISTINCT s.speech_id) AS num_speeches \
             FROM scoped s JOIN ranked r ON r.bill_id = s.bill_id AND r.rn = 1 \
             GROUP BY s.bill_id, r.title \
             ORDER BY latest_date DESC, s.bill_id ASC LIMIT ",
        );
        rows_qb.push_bind(page.limit());
        rows_qb.push(" OFFSET ");
        rows_qb.push_bind(page.offset());
        let rows: Vec<BillDetailRow> = rows_qb
            .build_query_as()
            .fetch_all(store.pool())
            .await?;

        let mut count_qb = bill_scope(filters, scope);
        count_qb.push("SELECT COUNT(DISTINCT bill_id) FROM scoped");
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(store.pool())
            .await?;

        debug!(query = "bills_detailed", rows = rows.len(), total, "Query complete");
        Ok(Page::new(rows, total as u64))
    })
    .await
}
