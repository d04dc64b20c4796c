//! Chronological speech list of a bill

use hansard_common::db::{DayBucket, PartWithTalker};
use hansard_common::Result;
use sqlx::QueryBuilder;
use tracing::debug;

use super::filters::{push_filters, BillColumn, HeadRule, PART_COLUMNS, READING_ORDER, TALKER_COLUMNS};
use crate::params::QueryFilters;
use crate::store::{QueryContext, RecordStore};

/// Group parts by sitting date: newest day first, each day's parts in
/// ascending reading order
pub fn bucket_by_day(mut parts: Vec<PartWithTalker>) -> Vec<DayBucket> {
    parts.sort_by(|a, b| {
        let (a, b) = (&a.part, &b.part);
        (a.date, a.debate_seq, a.subdebate_1_seq, a.subdebate_2_seq, a.speech_seq)
            .cmp(&(b.date, b.debate_seq, b.subdebate_1_seq, b.subdebate_2_seq, b.speech_seq))
    });

    let mut buckets: Vec<DayBucket> = Vec::new();
    for entry in parts {
        match buckets.last_mut() {
            Some(bucket) if bucket.date == entry.part.date => bucket.parts.push(entry),
            _ => buckets.push(DayBucket {
                date: entry.part.date,
                parts: vec![entry],
            }),
        }
    }
    buckets.reverse();
    buckets
}

/// Head parts and first-reading markers of a bill, bucketed by day
pub async fn speech_list(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
) -> Result<Vec<DayBucket>> {
    ctx.run("speech_list", async {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {PART_COLUMNS}, {TALKER_COLUMNS} \
             FROM parts p LEFT JOIN talkers t ON t.id = p.talker_id WHERE "
        ));
        qb.push(HeadRule::HeadOrFirstReading.condition());
        push_filters(&mut qb, filters, BillColumn::Contains);
        qb.push(format!(" ORDER BY p.date, {READING_ORDER}, p.speech_id"));

        let parts: Vec<PartWithTalker> = qb.build_query_as().fetch_all(store.pool()).await?;
        let count = parts.len();
        let buckets = bucket_by_day(parts);

        debug!(query = "speech_list", parts = count, days = buckets.len(), "Query complete");
        Ok(buckets)
    })
    .await
}
