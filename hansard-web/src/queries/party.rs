//! Party speech proportions

use hansard_common::db::{PartyProportions, PartyShare};
use hansard_common::metrics::{proportion, UNKNOWN_PARTY};
use hansard_common::Result;
use sqlx::QueryBuilder;
use tracing::debug;

use super::filters::{push_filters, BillColumn, HeadRule};
use crate::params::QueryFilters;
use crate::store::{QueryContext, RecordStore};

#[derive(sqlx::FromRow)]
struct PartyCount {
    party: String,
    count: i64,
}

/// Turn per-party counts into percentages of their sum, keeping the order
pub fn to_proportions(counts: Vec<(String, u64)>) -> PartyProportions {
    let total: u64 = counts.iter().map(|(_, count)| count).sum();
    PartyProportions(
        counts
            .into_iter()
            .map(|(party, count)| PartyShare {
                proportion: proportion(count, total),
                party,
                count,
            })
            .collect(),
    )
}

/// Share of attributed head parts per party, largest first. Parts whose
/// talker is unknown to the store are not counted; talkers without a party
/// count as "Unknown".
pub async fn party_speech_proportions(
    store: &RecordStore,
    ctx: &QueryContext,
    filters: &QueryFilters,
) -> Result<PartyProportions> {
    ctx.run("party_speech_proportions", async {
        let mut qb = QueryBuilder::new(format!(
            "SELECT COALESCE(t.party, '{UNKNOWN_PARTY}') AS party, COUNT(*) AS count \
             FROM parts p JOIN talkers t ON t.id = p.talker_id WHERE "
        ));
        qb.push(HeadRule::Head.condition());
        push_filters(&mut qb, filters, BillColumn::Contains);
        qb.push(" GROUP BY 1 ORDER BY count DESC, party ASC");

        let counts: Vec<PartyCount> = qb.build_query_as().fetch_all(store.pool()).await?;
        let proportions = to_proportions(
            counts
                .into_iter()
                .map(|row| (row.party, row.count.max(0) as u64))
                .collect(),
        );

        debug!(query = "party_speech_proportions", parties = proportions.0.len(), "Query complete");
        Ok(proportions)
    })
    .await
}
