//! Values offered by the filter widgets

use hansard_common::Result;
use serde::Serialize;
use tracing::debug;

use crate::store::{QueryContext, RecordStore};

/// Distinct filterable values, each sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub parties: Vec<String>,
    pub electorates: Vec<String>,
}

async fn distinct(store: &RecordStore, ctx: &QueryContext, name: &'static str, sql: &'static str) -> Result<Vec<String>> {
    ctx.run(name, async {
        let values: Vec<String> = sqlx::query_scalar(sql).fetch_all(store.pool()).await?;
        Ok(values)
    })
    .await
}

/// Debate categories, parties and electorates, fetched concurrently
pub async fn filter_options(store: &RecordStore, ctx: &QueryContext) -> Result<FilterOptions> {
    let (categories, parties, electorates) = tokio::try_join!(
        distinct(
            store,
            ctx,
            "filter_categories",
            "SELECT DISTINCT debate_category FROM parts WHERE debate_category IS NOT NULL AND debate_category != '' ORDER BY 1",
        ),
        distinct(
            store,
            ctx,
            "filter_parties",
            "SELECT DISTINCT party FROM talkers WHERE party IS NOT NULL AND party != '' ORDER BY 1",
        ),
        distinct(
            store,
            ctx,
            "filter_electorates",
            "SELECT DISTINCT electorate FROM talkers WHERE electorate IS NOT NULL AND electorate != '' ORDER BY 1",
        ),
    )?;

    debug!(
        categories = categories.len(),
        parties = parties.len(),
        electorates = electorates.len(),
        "Loaded filter options"
    );
    Ok(FilterOptions {
        categories,
        parties,
        electorates,
    })
}
