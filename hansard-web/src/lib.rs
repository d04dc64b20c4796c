//! hansard-web library - Hansard query service
//!
//! Read-only aggregation over talkers, speech parts and speech stats,
//! served as a JSON API.

use std::sync::Arc;

use axum::Router;
use hansard_common::config::HansardConfig;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod overview;
pub mod pagination;
pub mod params;
pub mod queries;
pub mod store;

use store::RecordStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store over the read-only pool
    pub store: RecordStore,
    /// Resolved service configuration
    pub config: Arc<HansardConfig>,
}

impl AppState {
    pub fn new(store: RecordStore, config: HansardConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let bills = Router::new()
        .route("/api/bills", get(api::list_bills))
        .route("/api/bills/detailed", get(api::bills_detailed))
        .route("/api/bills/discussion", get(api::bills_discussion))
        .route("/api/bills/summary", get(api::bills_summary))
        .route("/api/bills/:id/overview", get(api::bill_overview))
        .route("/api/bills/:id/sentiment", get(api::bill_sentiment))
        .route("/api/speakers", get(api::speakers))
        .route("/api/divisiveness", get(api::divisiveness))
        .route("/api/party-proportions", get(api::party_proportions))
        .route("/bill/lookup", get(api::bill_lookup));

    let records = Router::new()
        .route("/api/speeches", get(api::list_speeches))
        .route("/api/speeches/:id", get(api::get_speech))
        .route("/api/members", get(api::list_members))
        .route("/api/members/:id", get(api::get_member))
        .route("/api/talkers", get(api::search_talkers))
        .route("/api/talkers/:id/speeches", get(api::talker_speeches))
        .route("/api/filters", get(api::get_filter_options));

    let public = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(bills)
        .merge(records)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
