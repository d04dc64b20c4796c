//! Speaker rankings

use hansard_common::db::{House, SpeakerRow};
use hansard_common::metrics::divisiveness;
use hansard_common::Result;
use serde::Serialize;
use sqlx::QueryBuilder;
use tracing::debug;

use super::filters::{push_filters, BillColumn, HeadRule, READING_ORDER};
use crate::pagination::Page;
use crate::params::QueryFilters;
use crate::store::{QueryContext, RecordStore};

#[derive(sqlx::FromRow)]
struct SpeakerRecord {
    id: String,
    name: Option<String>,
    party: Option<String>,
    electorate: Option<String>,
    count: i64,
    #[sqlx(try_from = "String")]
    house: House,
    stance: Option<f64>,
}

impl From<SpeakerRecord> for SpeakerRow {
    fn from(record: SpeakerRecord) -> Self {
        SpeakerRow {
            id: record.id,
            name: record.name,
            party: record.party,
            electorate: record.electorate,
            count: record.count.max(0) as u64,
            house: record.house,
            stance: record.stance,
        }
    }
}

/// Talkers ranked by number of speeches (head parts). House and stance come
/// from each talker's first speech in reading order. Talkers missing from
/// the store keep their id with a null name and party.
pub async fn top_speakers(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
) -> Result<Page<SpeakerRow>> {
    ctx.run("top_speakers", async {
        let mut qb = QueryBuilder::new(format!(
            "WITH scoped AS (SELECT p.talker_id, p.speech_id, p.house, \
             ROW_NUMBER() OVER (PARTITION BY p.talker_id ORDER BY p.date, {READING_ORDER}, p.speech_id) AS rn, \
             COUNT(*) OVER (PARTITION BY p.talker_id) AS count \
             FROM parts p LEFT JOIN talkers t ON t.id = p.talker_id \
             WHERE p.talker_id IS NOT NULL AND "
        ));
        qb.push(HeadRule::Head.condition());
        push_filters(&mut qb, filters, BillColumn::Contains);
        qb.push(
            ") SELECT s.talker_id AS id, t.name, t.party, t.electorate, s.count, s.house, st.stance \
             FROM scoped s \
             LEFT JOIN talkers t ON t.id = s.talker_id \
             LEFT JOIN speech_stats st ON st.speech_id = s.speech_id \
             WHERE s.rn = 1 \
             ORDER BY s.count DESC, t.name IS NULL, t.name ASC, s.talker_id ASC",
        );

        let records: Vec<SpeakerRecord> = qb.build_query_as().fetch_all(store.pool()).await?;
        let rows: Vec<SpeakerRow> = records.into_iter().map(SpeakerRow::from).collect();

        debug!(query = "top_speakers", rows = rows.len(), "Query complete");
        Ok(Page::complete(rows))
    })
    .await
}

/// A talker's precomputed divisiveness on bill debates
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DivisivenessRow {
    pub id: String,
    pub name: String,
    pub party: Option<String>,
    pub electorate: Option<String>,
    #[sqlx(try_from = "String")]
    pub house: House,
    pub divisiveness: f64,
}

/// Talkers who spoke on at least one bill, most divisive first. Talkers
/// without a score are left out.
pub async fn divisiveness_ranking(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
) -> Result<Page<DivisivenessRow>> {
    ctx.run("divisiveness_ranking", async {
        let mut qb = QueryBuilder::new(format!(
            "WITH qualifying AS (SELECT p.talker_id, p.house, \
             ROW_NUMBER() OVER (PARTITION BY p.talker_id ORDER BY p.date, {READING_ORDER}, p.speech_id) AS rn \
             FROM parts p JOIN talkers t ON t.id = p.talker_id \
             WHERE json_array_length(p.bill_ids) > 0 AND "
        ));
        qb.push(HeadRule::Head.condition());
        push_filters(&mut qb, filters, BillColumn::Contains);
        qb.push(
            ") SELECT t.id, t.name, t.party, t.electorate, q.house, t.bill_divisiveness AS divisiveness \
             FROM qualifying q JOIN talkers t ON t.id = q.talker_id \
             WHERE q.rn = 1 AND t.bill_divisiveness IS NOT NULL \
             ORDER BY t.bill_divisiveness DESC, t.name ASC, t.id ASC",
        );

        let rows: Vec<DivisivenessRow> = qb
            .build_query_as::<DivisivenessRow>()
            .fetch_all(store.pool())
            .await?
            .into_iter()
            .filter(|row| divisiveness(Some(row.divisiveness)).is_some())
            .collect();

        debug!(query = "divisiveness_ranking", rows = rows.len(), "Query complete");
        Ok(Page::complete(rows))
    })
    .await
}
