//! Per-speech sentiment rows

use hansard_common::db::{House, SentimentRow};
use hansard_common::metrics::speech_tone_positivity;
use hansard_common::Result;
use sqlx::types::Json;
use sqlx::QueryBuilder;
use tracing::debug;

use super::filters::{push_filters, BillColumn, HeadRule, READING_ORDER};
use crate::params::QueryFilters;
use crate::store::{QueryContext, RecordStore};

#[derive(sqlx::FromRow)]
struct SentimentRecord {
    talker_id: String,
    speech_id: String,
    name: Option<String>,
    party: Option<String>,
    electorate: Option<String>,
    #[sqlx(try_from = "String")]
    house: House,
    stance: f64,
    tone: Option<Json<Vec<String>>>,
}

impl From<SentimentRecord> for SentimentRow {
    fn from(record: SentimentRecord) -> Self {
        let tone = record.tone.map(|tags| tags.0);
        SentimentRow {
            tone_value: tone.as_deref().map(speech_tone_positivity),
            tone,
            talker_id: record.talker_id,
            speech_id: record.speech_id,
            name: record.name,
            party: record.party,
            electorate: record.electorate,
            house: record.house,
            stance: record.stance,
        }
    }
}

/// Annotated head parts in reading order. Speeches without a known talker,
/// without stats, or whose stats carry no stance produce no row.
pub async fn sentiment_rows(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
) -> Result<Vec<SentimentRow>> {
    ctx.run("sentiment_rows", async {
        let mut qb = QueryBuilder::new(
            "SELECT p.talker_id, p.speech_id, t.name, t.party, t.electorate, p.house, st.stance, st.tone \
             FROM parts p \
             JOIN talkers t ON t.id = p.talker_id \
             JOIN speech_stats st ON st.speech_id = p.speech_id \
             WHERE st.stance IS NOT NULL AND ",
        );
        qb.push(HeadRule::Head.condition());
        push_filters(&mut qb, filters, BillColumn::Contains);
        qb.push(format!(" ORDER BY p.date, {READING_ORDER}, p.speech_id"));

        let records: Vec<SentimentRecord> = qb.build_query_as().fetch_all(store.pool()).await?;
        let rows: Vec<SentimentRow> = records.into_iter().map(SentimentRow::from).collect();

        debug!(query = "sentiment_rows", rows = rows.len(), "Query complete");
        Ok(rows)
    })
    .await
}
