//! Speeches over time
//!
//! Days without speeches are reported as zero rows over the backfill window
//! so a chart's time axis has no gaps.

use chrono::NaiveDate;
use hansard_common::db::OverTimeRow;
use hansard_common::time::BackfillWindow;
use hansard_common::Result;
use sqlx::QueryBuilder;
use std::collections::BTreeMap;
use tracing::debug;

use super::filters::{push_filters, push_parts_source, BillColumn, HeadRule};
use crate::params::QueryFilters;
use crate::store::{QueryContext, RecordStore};

/// Merge zero rows for every window date missing from `rows`; the result is
/// ascending by date with each date once
pub fn backfill(rows: Vec<OverTimeRow>, window: &[NaiveDate]) -> Vec<OverTimeRow> {
    let mut by_date: BTreeMap<NaiveDate, OverTimeRow> = BTreeMap::new();
    for row in rows {
        by_date
            .entry(row.date)
            .and_modify(|existing| {
                existing.hor += row.hor;
                existing.senate += row.senate;
            })
            .or_insert(row);
    }
    for date in window {
        by_date.entry(*date).or_insert_with(|| OverTimeRow::zero(*date));
    }
    by_date.into_values().collect()
}

/// Head parts per sitting date and chamber, backfilled over `window`
pub async fn speeches_over_time(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
    window: &BackfillWindow,
    today: NaiveDate,
) -> Result<Vec<OverTimeRow>> {
    ctx.run("speeches_over_time", async {
        let mut qb = QueryBuilder::new(
            "SELECT p.date AS date, SUM(p.house = 'hor') AS hor, SUM(p.house = 'senate') AS senate",
        );
        push_parts_source(&mut qb, filters);
        qb.push(" WHERE ");
        qb.push(HeadRule::Head.condition());
        push_filters(&mut qb, filters, BillColumn::Contains);
        qb.push(" GROUP BY p.date ORDER BY p.date");

        let counts: Vec<(NaiveDate, i64, i64)> = qb.build_query_as().fetch_all(store.pool()).await?;
        let rows = counts
            .into_iter()
            .map(|(date, hor, senate)| OverTimeRow {
                date,
                hor: hor.max(0) as u64,
                senate: senate.max(0) as u64,
            })
            .collect();

        let series = backfill(rows, &window.dates(today));
        debug!(query = "speeches_over_time", rows = series.len(), "Query complete");
        Ok(series)
    })
    .await
}
