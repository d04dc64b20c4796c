//! Bill endpoints

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use chrono::{DateTime, Utc};
use hansard_common::config::OverviewSource;
use hansard_common::db::{BillOverview, PartyProportions, SpeakerRow};
use hansard_common::metrics::{group_sentiment, SentimentGroupBy, SentimentPoint};
use hansard_common::time::today;
use serde::Serialize;
use tracing::{debug, info};

use super::RequestScope;
use crate::error::{ApiError, ApiResult};
use crate::overview::{compute_overview, load_overview};
use crate::pagination::{Page, PageRequest, PageResponse, BILL_PAGE_BOUNDS};
use crate::params::QueryFilters;
use crate::queries::{self, BillDetailRow, BillDiscussionRow, BillListRow, DivisivenessRow};
use crate::AppState;

type Pairs = Query<Vec<(String, String)>>;

/// GET /api/bills
pub async fn list_bills(
    State(state): State<AppState>,
    Query(pairs): Pairs,
) -> ApiResult<Json<PageResponse<BillListRow>>> {
    let scope = RequestScope::new(&state, pairs);
    let page = PageRequest::from_params(&scope.params, BILL_PAGE_BOUNDS);
    let rows = queries::bills_list(&state.store, &scope.ctx, &scope.filters(), page).await?;
    Ok(Json(PageResponse::new(rows, page)))
}

/// GET /api/bills/detailed
pub async fn bills_detailed(
    State(state): State<AppState>,
    Query(pairs): Pairs,
) -> ApiResult<Json<PageResponse<BillDetailRow>>> {
    let scope = RequestScope::new(&state, pairs);
    let page = PageRequest::from_params(&scope.params, BILL_PAGE_BOUNDS);
    let rows = queries::bills_detailed(&state.store, &scope.ctx, &scope.filters(), page).await?;
    Ok(Json(PageResponse::new(rows, page)))
}

/// GET /api/bills/discussion
pub async fn bills_discussion(
    State(state): State<AppState>,
    Query(pairs): Pairs,
) -> ApiResult<Json<Page<BillDiscussionRow>>> {
    let scope = RequestScope::new(&state, pairs);
    Ok(Json(
        queries::bill_discussion(&state.store, &scope.ctx, &scope.filters()).await?,
    ))
}

/// Everything the bills landing page shows
#[derive(Debug, Serialize)]
pub struct BillsSummary {
    pub discussion: Vec<BillDiscussionRow>,
    pub speakers: Vec<SpeakerRow>,
    pub divisiveness: Vec<DivisivenessRow>,
    pub party_proportions: PartyProportions,
    pub bills: PageResponse<BillListRow>,
}

/// GET /api/bills/summary
pub async fn bills_summary(
    State(state): State<AppState>,
    Query(pairs): Pairs,
) -> ApiResult<Json<BillsSummary>> {
    let scope = RequestScope::new(&state, pairs);
    let filters = scope.filters();
    let page = PageRequest::from_params(&scope.params, BILL_PAGE_BOUNDS);
    let (store, ctx) = (&state.store, &scope.ctx);

    let (discussion, speakers, divisiveness, party_proportions, bills) = tokio::try_join!(
        queries::bill_discussion(store, ctx, &filters),
        queries::top_speakers(store, ctx, &filters),
        queries::divisiveness_ranking(store, ctx, &filters),
        queries::party_speech_proportions(store, ctx, &filters),
        queries::bills_list(store, ctx, &filters, page),
    )?;

    Ok(Json(BillsSummary {
        discussion: discussion.rows,
        speakers: speakers.rows,
        divisiveness: divisiveness.rows,
        party_proportions,
        bills: PageResponse::new(bills, page),
    }))
}

/// GET /api/speakers
pub async fn speakers(
    State(state): State<AppState>,
    Query(pairs): Pairs,
) -> ApiResult<Json<Page<SpeakerRow>>> {
    let scope = RequestScope::new(&state, pairs);
    Ok(Json(
        queries::top_speakers(&state.store, &scope.ctx, &scope.filters()).await?,
    ))
}

/// GET /api/divisiveness
pub async fn divisiveness(
    State(state): State<AppState>,
    Query(pairs): Pairs,
) -> ApiResult<Json<Page<DivisivenessRow>>> {
    let scope = RequestScope::new(&state, pairs);
    Ok(Json(
        queries::divisiveness_ranking(&state.store, &scope.ctx, &scope.filters()).await?,
    ))
}

/// GET /api/party-proportions
pub async fn party_proportions(
    State(state): State<AppState>,
    Query(pairs): Pairs,
) -> ApiResult<Json<PartyProportions>> {
    let scope = RequestScope::new(&state, pairs);
    Ok(Json(
        queries::party_speech_proportions(&state.store, &scope.ctx, &scope.filters()).await?,
    ))
}

/// Bill overview with its provenance
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub bill_id: String,
    pub title: Option<String>,
    pub source: &'static str,
    /// When the materialized document was written; absent for live overviews
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub overview: BillOverview,
}

/// GET /api/bills/:id/overview?source=live|materialized
///
/// A bill without a materialized document is computed live.
pub async fn bill_overview(
    State(state): State<AppState>,
    Path(bill_id): Path<String>,
    Query(pairs): Pairs,
) -> ApiResult<Json<OverviewResponse>> {
    let scope = RequestScope::new(&state, pairs);
    let source = OverviewSource::from_str(&scope.params.str("source"))
        .unwrap_or(state.config.overview_source);

    if source == OverviewSource::Materialized {
        if let Some(doc) = load_overview(&state.store, &scope.ctx, &bill_id).await? {
            return Ok(Json(OverviewResponse {
                title: doc.overview.title().map(str::to_string),
                bill_id: doc.bill_id,
                source: OverviewSource::Materialized.as_str(),
                updated_at: Some(doc.updated_at),
                overview: doc.overview,
            }));
        }
        debug!(bill_id = %bill_id, "No materialized overview, computing live");
    }

    let overview = compute_overview(
        &state.store,
        &scope.ctx,
        &bill_id,
        &state.config.backfill,
        today(),
    )
    .await?;
    if overview.speech_list.is_empty() && overview.top_speakers.is_empty() {
        return Err(ApiError::NotFound(format!("bill {bill_id}")));
    }

    Ok(Json(OverviewResponse {
        title: overview.title().map(str::to_string),
        bill_id,
        source: OverviewSource::Live.as_str(),
        updated_at: None,
        overview,
    }))
}

#[derive(Debug, Serialize)]
pub struct SentimentResponse {
    pub bill_id: String,
    pub group_by: SentimentGroupBy,
    pub points: Vec<SentimentPoint>,
}

/// GET /api/bills/:id/sentiment?group_by=speech|member|party
pub async fn bill_sentiment(
    State(state): State<AppState>,
    Path(bill_id): Path<String>,
    Query(pairs): Pairs,
) -> ApiResult<Json<SentimentResponse>> {
    let scope = RequestScope::new(&state, pairs);
    let group_by = SentimentGroupBy::parse_or_default(&scope.params.str("group_by"));
    let rows = queries::sentiment_rows(
        &state.store,
        &scope.ctx,
        &QueryFilters::for_bill(bill_id.clone()),
    )
    .await?;

    Ok(Json(SentimentResponse {
        points: group_sentiment(&rows, group_by),
        bill_id,
        group_by,
    }))
}

/// GET /bill/lookup?id=
///
/// Redirects to the bill's overview; a blank id goes back to the root.
pub async fn bill_lookup(Query(pairs): Pairs) -> Redirect {
    let params = crate::params::ParamMap::from(pairs);
    let id = params.str("id");
    if id.is_empty() {
        return Redirect::to("/");
    }
    info!(bill_id = %id, "Bill lookup");
    Redirect::to(&format!("/api/bills/{}/overview", urlencoding::encode(&id)))
}
