//! Member listing, member detail and talker lookups

use hansard_common::db::{House, SpeechPart, Talker};
use hansard_common::{Error, Result};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

use super::filters::{push_filters, BillColumn, HeadRule, PART_COLUMNS, READING_ORDER};
use crate::pagination::{Page, PageRequest};
use crate::params::QueryFilters;
use crate::store::{QueryContext, RecordStore};

pub const TALKER_SEARCH_DEFAULT_LIMIT: u32 = 20;
pub const TALKER_SEARCH_MAX_LIMIT: u32 = 50;
pub const TALKER_SPEECHES_DEFAULT_LIMIT: u32 = 20;
pub const TALKER_SPEECHES_MAX_LIMIT: u32 = 100;

/// A member who has given at least one speech
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MemberRow {
    pub id: String,
    pub name: String,
    pub party: Option<String>,
    pub electorate: Option<String>,
    /// Chamber of the member's first qualifying speech
    #[sqlx(try_from = "String")]
    pub house: House,
}

/// Push the qualifying-speech predicate for talker `t`
fn push_speech_exists(qb: &mut QueryBuilder<'_, Sqlite>, filters: &QueryFilters) {
    qb.push("p.talker_id = t.id AND p.type = 'speech' AND p.part_seq = 0");
    if !filters.houses.is_empty() {
        qb.push(" AND p.house IN (");
        let mut separated = qb.separated(", ");
        for house in &filters.houses {
            separated.push_bind(house.as_str());
        }
        separated.push_unseparated(")");
    }
}

/// Talker predicates: party, electorate and case-insensitive name substring
fn push_talker_filters(qb: &mut QueryBuilder<'_, Sqlite>, filters: &QueryFilters) {
    qb.push(" WHERE EXISTS (SELECT 1 FROM parts p WHERE ");
    push_speech_exists(qb, filters);
    qb.push(")");

    for (column, values) in [("t.party", &filters.parties), ("t.electorate", &filters.electorates)] {
        if values.is_empty() {
            continue;
        }
        qb.push(format!(" AND {column} IN ("));
        let mut separated = qb.separated(", ");
        for value in values {
            separated.push_bind(value.clone());
        }
        separated.push_unseparated(")");
    }

    if let Some(name) = &filters.text {
        qb.push(" AND instr(lower(t.name), lower(")
            .push_bind(name.clone())
            .push(")) > 0");
    }
}

/// Talkers with at least one speech under the house filter, by name.
///
/// Starts from talkers and only probes parts for existence, so the cost does
/// not grow with the number of speeches each member gave. `filters.text` is
/// matched against member names here, not against speech content.
pub async fn members(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
    page: PageRequest,
) -> Result<Page<MemberRow>> {
    ctx.run("members", async {
        let mut rows_qb = QueryBuilder::new(
            "SELECT t.id, t.name, t.party, t.electorate, (SELECT p.house FROM parts p WHERE ",
        );
        push_speech_exists(&mut rows_qb, filters);
        rows_qb.push(format!(" ORDER BY p.date, {READING_ORDER} LIMIT 1) AS house FROM talkers t"));
        push_talker_filters(&mut rows_qb, filters);
        rows_qb.push(" ORDER BY t.name ASC, t.id ASC LIMIT ");
        rows_qb.push_bind(page.limit());
        rows_qb.push(" OFFSET ");
        rows_qb.push_bind(page.offset());
        let rows: Vec<MemberRow> = rows_qb
            .build_query_as()
            .fetch_all(store.pool())
            .await?;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM talkers t");
        push_talker_filters(&mut count_qb, filters);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(store.pool())
            .await?;

        debug!(query = "members", rows = rows.len(), total, "Query complete");
        Ok(Page::new(rows, total as u64))
    })
    .await
}

/// A member with their speeches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberDetail {
    pub talker: Talker,
    pub speeches: Vec<SpeechPart>,
}

/// Talker record plus head parts of their speeches, newest first.
/// Category and date filters apply to the speeches.
pub async fn member_detail(
    store: &RecordStore,
    ctx: &QueryContext,
    talker_id: &str,
    filters: &QueryFilters,
) -> Result<MemberDetail> {
    ctx.run("member_detail", async {
        let talker: Talker = sqlx::query_as(
            "SELECT id, name, electorate, party, divisiveness, bill_divisiveness FROM talkers WHERE id = ?",
        )
        .bind(talker_id)
        .fetch_optional(store.pool())
        .await?
        .ok_or_else(|| Error::NotFound(format!("member {talker_id}")))?;

        let speech_filters = QueryFilters {
            categories: filters.categories.clone(),
            from: filters.from,
            to: filters.to,
            talker_id: Some(talker_id.to_string()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new(format!("SELECT {PART_COLUMNS} FROM parts p WHERE "));
        qb.push(HeadRule::Head.condition());
        push_filters(&mut qb, &speech_filters, BillColumn::Contains);
        qb.push(format!(" ORDER BY p.date DESC, {READING_ORDER}, p.speech_id"));
        let speeches: Vec<SpeechPart> = qb.build_query_as().fetch_all(store.pool()).await?;

        debug!(query = "member_detail", speeches = speeches.len(), "Query complete");
        Ok(MemberDetail { talker, speeches })
    })
    .await
}

/// Talkers whose name, id, electorate or party contains `q` (case-insensitive)
pub async fn talker_search(
    store: &RecordStore,
    ctx: &QueryContext,
    q: &str,
    limit: Option<u32>,
) -> Result<Vec<Talker>> {
    let limit = limit
        .unwrap_or(TALKER_SEARCH_DEFAULT_LIMIT)
        .clamp(1, TALKER_SEARCH_MAX_LIMIT);
    let q = q.trim().to_lowercase();

    ctx.run("talker_search", async {
        let talkers: Vec<Talker> = sqlx::query_as(
            "SELECT id, name, electorate, party, divisiveness, bill_divisiveness FROM talkers \
             WHERE ?1 = '' \
                OR instr(lower(name), ?1) > 0 \
                OR instr(lower(id), ?1) > 0 \
                OR instr(lower(COALESCE(electorate, '')), ?1) > 0 \
                OR instr(lower(COALESCE(party, '')), ?1) > 0 \
             ORDER BY name ASC, id ASC LIMIT ?2",
        )
        .bind(&q)
        .bind(i64::from(limit))
        .fetch_all(store.pool())
        .await?;

        debug!(query = "talker_search", rows = talkers.len(), "Query complete");
        Ok(talkers)
    })
    .await
}

/// A talker's parts, newest first, keeping each speech's fragments in order
pub async fn talker_speeches(
    store: &RecordStore,
    ctx: &QueryContext,
    talker_id: &str,
    limit: Option<u32>,
) -> Result<Vec<SpeechPart>> {
    let limit = limit
        .unwrap_or(TALKER_SPEECHES_DEFAULT_LIMIT)
        .clamp(1, TALKER_SPEECHES_MAX_LIMIT);

    ctx.run("talker_speeches", async {
        let parts: Vec<SpeechPart> = sqlx::query_as(&format!(
            "SELECT {PART_COLUMNS} FROM parts p WHERE p.talker_id = ? \
             ORDER BY p.date DESC, p.speech_id ASC, p.part_seq ASC LIMIT ?"
        ))
        .bind(talker_id)
        .bind(i64::from(limit))
        .fetch_all(store.pool())
        .await?;

        debug!(query = "talker_speeches", rows = parts.len(), "Query complete");
        Ok(parts)
    })
    .await
}
