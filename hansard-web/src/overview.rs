//! Bill overview materializer
//!
//! A bill overview bundles the five per-bill facets. It can be computed live
//! by fanning out the facet queries concurrently, or read from the
//! `bill_overview` table that the `materialize` job keeps up to date. The
//! read path applies no staleness policy of its own; `updated_at` is exposed
//! for callers that care.

use chrono::{DateTime, NaiveDate, Utc};
use hansard_common::db::{BillOverview, BillOverviewDoc};
use hansard_common::time::BackfillWindow;
use hansard_common::Result;
use tracing::{debug, info};

use crate::params::QueryFilters;
use crate::queries::{
    party_speech_proportions, sentiment_rows, speech_list, speeches_over_time, top_speakers,
};
use crate::store::{QueryContext, RecordStore};

/// Compute all five facets for one bill. Any facet failing fails the whole call.
pub async fn compute_overview(
    store: &RecordStore,
    ctx: &QueryContext,
    bill_id: &str,
    window: &BackfillWindow,
    today: NaiveDate,
) -> Result<BillOverview> {
    let filters = QueryFilters::for_bill(bill_id);

    let (proportions, over_time, speakers, days, sentiment) = tokio::try_join!(
        party_speech_proportions(store, ctx, &filters),
        speeches_over_time(store, ctx, &filters, window, today),
        top_speakers(store, ctx, &filters),
        speech_list(store, ctx, &filters),
        sentiment_rows(store, ctx, &filters),
    )?;

    debug!(bill_id, "Computed bill overview");
    Ok(BillOverview {
        party_speech_proportions: proportions,
        speeches_over_time: over_time,
        top_speakers: speakers.rows,
        speech_list: days,
        sentiment,
    })
}

/// Read the materialized overview of a bill, if one has been written
pub async fn load_overview(
    store: &RecordStore,
    ctx: &QueryContext,
    bill_id: &str,
) -> Result<Option<BillOverviewDoc>> {
    ctx.run("load_overview", async {
        let row: Option<(String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT overview, updated_at FROM bill_overview WHERE bill_id = ?",
        )
        .bind(bill_id)
        .fetch_optional(store.pool())
        .await?;

        let Some((overview, updated_at)) = row else {
            return Ok(None);
        };
        let overview: BillOverview = serde_json::from_str(&overview)?;
        Ok(Some(BillOverviewDoc {
            bill_id: bill_id.to_string(),
            overview,
            updated_at,
        }))
    })
    .await
}

/// Recompute one bill's overview and upsert it. `store` must wrap a
/// read-write pool.
pub async fn refresh_overview(
    store: &RecordStore,
    ctx: &QueryContext,
    bill_id: &str,
    window: &BackfillWindow,
    today: NaiveDate,
) -> Result<BillOverviewDoc> {
    let overview = compute_overview(store, ctx, bill_id, window, today).await?;
    let updated_at = Utc::now();
    let json = serde_json::to_string(&overview)?;

    ctx.run("store_overview", async {
        sqlx::query(
            "INSERT INTO bill_overview (bill_id, overview, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(bill_id) DO UPDATE SET overview = excluded.overview, updated_at = excluded.updated_at",
        )
        .bind(bill_id)
        .bind(&json)
        .bind(updated_at)
        .execute(store.pool())
        .await?;
        Ok(())
    })
    .await?;

    debug!(bill_id, "Stored bill overview");
    Ok(BillOverviewDoc {
        bill_id: bill_id.to_string(),
        overview,
        updated_at,
    })
}

/// Every bill id mentioned by any part, ascending
pub async fn all_bill_ids(store: &RecordStore, ctx: &QueryContext) -> Result<Vec<String>> {
    ctx.run("all_bill_ids", async {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT b.value FROM parts p JOIN json_each(p.bill_ids) AS b ORDER BY 1",
        )
        .fetch_all(store.pool())
        .await?;
        Ok(ids)
    })
    .await
}

/// Refresh the overview of every bill; returns the number written
pub async fn refresh_all(
    store: &RecordStore,
    ctx: &QueryContext,
    window: &BackfillWindow,
    today: NaiveDate,
) -> Result<usize> {
    let bill_ids = all_bill_ids(store, ctx).await?;
    info!("Refreshing {} bill overviews", bill_ids.len());

    for (index, bill_id) in bill_ids.iter().enumerate() {
        refresh_overview(store, ctx, bill_id, window, today).await?;
        if (index + 1) % 100 == 0 {
            info!("Refreshed {}/{} bill overviews", index + 1, bill_ids.len());
        }
    }

    info!("Refreshed {} bill overviews", bill_ids.len());
    Ok(bill_ids.len())
}
