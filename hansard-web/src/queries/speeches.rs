//! Speech listing and detail

use hansard_common::db::{PartWithTalker, SpeechStats};
use hansard_common::metrics::{speech_tone_positivity, StanceLabel};
use hansard_common::{Error, Result};
use serde::Serialize;
use sqlx::QueryBuilder;
use tracing::debug;

use super::filters::{
    push_filters, push_parts_source, BillColumn, PART_COLUMNS, READING_ORDER, TALKER_COLUMNS,
};
use crate::pagination::{Page, PageRequest};
use crate::params::QueryFilters;
use crate::store::{QueryContext, RecordStore};

/// Speeches are head parts of type `speech`
const SPEECH_CONDITION: &str = "p.part_seq = 0 AND p.type = 'speech'";

/// Shape of the listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechListingPlan {
    /// Join talkers first because the filters need talker attributes
    JoinThenPage,
    /// Sort and page the parts alone, then join talkers onto that page only
    PageThenJoin,
}

impl SpeechListingPlan {
    pub fn for_filters(filters: &QueryFilters) -> Self {
        if filters.needs_talker_join() {
            SpeechListingPlan::JoinThenPage
        } else {
            SpeechListingPlan::PageThenJoin
        }
    }
}

fn listing_order() -> String {
    format!("p.date DESC, {READING_ORDER}, p.speech_id")
}

/// Speeches matching the filters, newest first
pub async fn speeches(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
    page: PageRequest,
) -> Result<Page<PartWithTalker>> {
    let plan = SpeechListingPlan::for_filters(filters);

    ctx.run("speeches", async {
        let mut rows_qb = match plan {
            SpeechListingPlan::JoinThenPage => {
                let mut qb = QueryBuilder::new(format!(
                    "SELECT {PART_COLUMNS}, {TALKER_COLUMNS} \
                     FROM parts p JOIN talkers t ON t.id = p.talker_id WHERE {SPEECH_CONDITION}"
                ));
                push_filters(&mut qb, filters, BillColumn::Contains);
                qb.push(format!(" ORDER BY {} LIMIT ", listing_order()));
                qb.push_bind(page.limit());
                qb.push(" OFFSET ");
                qb.push_bind(page.offset());
                qb
            }
            SpeechListingPlan::PageThenJoin => {
                let mut qb = QueryBuilder::new(format!(
                    "SELECT {PART_COLUMNS}, {TALKER_COLUMNS} FROM \
                     (SELECT p.* FROM parts p WHERE {SPEECH_CONDITION}"
                ));
                push_filters(&mut qb, filters, BillColumn::Contains);
                qb.push(format!(" ORDER BY {} LIMIT ", listing_order()));
                qb.push_bind(page.limit());
                qb.push(" OFFSET ");
                qb.push_bind(page.offset());
                qb.push(format!(
                    ") p LEFT JOIN talkers t ON t.id = p.talker_id ORDER BY {}",
                    listing_order()
                ));
                qb
            }
        };
        let rows: Vec<PartWithTalker> = rows_qb
            .build_query_as()
            .fetch_all(store.pool())
            .await?;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*)");
        push_parts_source(&mut count_qb, filters);
        count_qb.push(format!(" WHERE {SPEECH_CONDITION}"));
        push_filters(&mut count_qb, filters, BillColumn::Contains);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(store.pool())
            .await?;

        debug!(query = "speeches", ?plan, rows = rows.len(), total, "Query complete");
        Ok(Page::new(rows, total as u64))
    })
    .await
}

/// A whole speech with its annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechDetail {
    pub speech_id: String,
    pub parts: Vec<PartWithTalker>,
    pub summary: Option<String>,
    pub stance: Option<f64>,
    pub stance_label: Option<StanceLabel>,
    pub tone: Option<Vec<String>>,
    pub tone_value: Option<f64>,
}

/// All parts of a speech in order, with talker and stats when present
pub async fn speech_detail(
    store: &RecordStore,
    ctx: &QueryContext,
    speech_id: &str,
) -> Result<SpeechDetail> {
    ctx.run("speech_detail", async {
        let parts: Vec<PartWithTalker> = sqlx::query_as(&format!(
            "SELECT {PART_COLUMNS}, {TALKER_COLUMNS} \
             FROM parts p LEFT JOIN talkers t ON t.id = p.talker_id \
             WHERE p.speech_id = ? ORDER BY p.part_seq"
        ))
        .bind(speech_id)
        .fetch_all(store.pool())
        .await?;

        if parts.is_empty() {
            return Err(Error::NotFound(format!("speech {speech_id}")));
        }

        let stats: Option<SpeechStats> = sqlx::query_as(
            "SELECT speech_id, summary, stance, tone FROM speech_stats WHERE speech_id = ?",
        )
        .bind(speech_id)
        .fetch_optional(store.pool())
        .await?;

        let (summary, stance, tone) = match stats {
            Some(stats) => (stats.summary, stats.stance, stats.tone.map(|t| t.0)),
            None => (None, None, None),
        };

        Ok(SpeechDetail {
            speech_id: speech_id.to_string(),
            stance_label: stance.map(StanceLabel::from_stance),
            tone_value: tone.as_deref().map(speech_tone_positivity),
            parts,
            summary,
            stance,
            tone,
        })
    })
    .await
}
