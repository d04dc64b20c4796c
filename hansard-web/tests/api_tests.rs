//! Integration tests for the HTTP API
//!
//! Routes are exercised with `oneshot` against a router over a seeded store.

mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use hansard_common::config::{HansardConfig, OverviewSource};
use hansard_common::time::BackfillWindow;
use hansard_web::overview::refresh_overview;
use hansard_web::{build_router, AppState};
use helpers::{seed_parliament, TestStore};
use serde_json::Value;
use tower::util::ServiceExt;

fn test_config(overview_source: OverviewSource) -> HansardConfig {
    HansardConfig {
        overview_source,
        backfill: BackfillWindow::SittingDays(vec![NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()]),
        ..HansardConfig::default()
    }
}

fn setup_app(seeded: &TestStore, overview_source: OverviewSource) -> Router {
    build_router(AppState::new(seeded.store.clone(), test_config(overview_source)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, body)
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let seeded = seed_parliament().await;
    let (status, body) = get(setup_app(&seeded, OverviewSource::Live), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "hansard-web");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let seeded = seed_parliament().await;
    let (status, body) = get(setup_app(&seeded, OverviewSource::Live), "/api/buildinfo").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Listings
// =============================================================================

#[tokio::test]
async fn test_bills_listing_is_paginated() {
    let seeded = seed_parliament().await;
    let (status, body) = get(setup_app(&seeded, OverviewSource::Live), "/api/bills?page=1&pageSize=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["page_size"], 1);
    assert_eq!(body["has_next"], true);
    assert_eq!(body["rows"][0]["id"], "b2");
    assert_eq!(body["rows"][0]["house"], "hor");
}

#[tokio::test]
async fn test_out_of_range_page_size_is_clamped() {
    let seeded = seed_parliament().await;
    let (status, body) = get(
        setup_app(&seeded, OverviewSource::Live),
        "/api/speeches?page=0&pageSize=5000",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 100);
    assert_eq!(body["rows"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_bills_summary() {
    let seeded = seed_parliament().await;
    let (status, body) = get(setup_app(&seeded, OverviewSource::Live), "/api/bills/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["discussion"][0]["bill_id"], "b1");
    assert_eq!(body["speakers"][0]["id"], "t1");
    assert_eq!(body["divisiveness"][0]["id"], "t1");
    assert!(body["party_proportions"]["ALP"].is_number());
    assert_eq!(body["bills"]["total"], 2);
}

#[tokio::test]
async fn test_repeated_party_filter() {
    let seeded = seed_parliament().await;
    let (status, body) = get(
        setup_app(&seeded, OverviewSource::Live),
        "/api/party-proportions?party=LP&party=LP&party=",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"LP": 100.0}));
}

#[tokio::test]
async fn test_filter_options_endpoint() {
    let seeded = seed_parliament().await;
    let (status, body) = get(setup_app(&seeded, OverviewSource::Live), "/api/filters").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parties"], serde_json::json!(["ALP", "LP"]));
}

// =============================================================================
// Bill pages
// =============================================================================

#[tokio::test]
async fn test_live_overview() {
    let seeded = seed_parliament().await;
    let (status, body) = get(setup_app(&seeded, OverviewSource::Live), "/api/bills/b1/overview").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bill_id"], "b1");
    assert_eq!(body["title"], "Bill for b1");
    assert_eq!(body["source"], "live");
    assert!(body["updated_at"].is_null());
    assert_eq!(body["party_speech_proportions"]["ALP"], 50.0);
    assert_eq!(body["speech_list"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_bill_overview_is_not_found() {
    let seeded = seed_parliament().await;
    let (status, body) = get(setup_app(&seeded, OverviewSource::Live), "/api/bills/b9/overview").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_materialized_overview_falls_back_to_live() {
    let seeded = seed_parliament().await;
    let app = setup_app(&seeded, OverviewSource::Materialized);

    let (status, body) = get(app.clone(), "/api/bills/b1/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "live");

    let config = test_config(OverviewSource::Materialized);
    refresh_overview(
        &seeded.store,
        &seeded.ctx(),
        "b1",
        &config.backfill,
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
    )
    .await
    .unwrap();

    let (status, body) = get(app.clone(), "/api/bills/b1/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "materialized");
    assert!(body["updated_at"].is_string());
    assert_eq!(body["title"], "Bill for b1");

    // An explicit source wins over the configured one
    let (_, body) = get(app, "/api/bills/b1/overview?source=live").await;
    assert_eq!(body["source"], "live");
}

#[tokio::test]
async fn test_bill_sentiment_grouping() {
    let seeded = seed_parliament().await;
    let app = setup_app(&seeded, OverviewSource::Live);

    let (status, body) = get(app.clone(), "/api/bills/b1/sentiment?group_by=party").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["group_by"], "party");
    let keys: Vec<&str> = body["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["ALP", "LP"]);

    let (_, body) = get(app, "/api/bills/b1/sentiment?group_by=bogus").await;
    assert_eq!(body["group_by"], "speech");
    assert_eq!(body["points"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bill_lookup_redirects() {
    let seeded = seed_parliament().await;
    let app = setup_app(&seeded, OverviewSource::Live);

    let request = Request::builder()
        .uri("/bill/lookup?id=b%201")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/api/bills/b%201/overview"
    );

    let request = Request::builder()
        .uri("/bill/lookup?id=%20")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()[header::LOCATION], "/");
}

// =============================================================================
// Speeches, members and talkers
// =============================================================================

#[tokio::test]
async fn test_speech_detail_endpoint() {
    let seeded = seed_parliament().await;
    let app = setup_app(&seeded, OverviewSource::Live);

    let (status, body) = get(app.clone(), "/api/speeches/s1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stance_label"], "In Favor");
    assert_eq!(body["parts"][0]["talker_name"], "A. Member");
    assert_eq!(body["parts"][0]["type"], "speech");

    let (status, _) = get(app, "/api/speeches/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_member_endpoints() {
    let seeded = seed_parliament().await;
    let app = setup_app(&seeded, OverviewSource::Live);

    let (status, body) = get(app.clone(), "/api/members?house=senate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["rows"][0]["id"], "t2");

    let (status, body) = get(app.clone(), "/api/members/t1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["talker"]["name"], "A. Member");
    assert_eq!(body["speeches"].as_array().unwrap().len(), 3);

    let (status, _) = get(app, "/api/members/t9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_talker_endpoints() {
    let seeded = seed_parliament().await;
    let app = setup_app(&seeded, OverviewSource::Live);

    let (status, body) = get(app.clone(), "/api/talkers?q=ALP").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"].as_array().unwrap().len(), 2);

    let (status, body) = get(app.clone(), "/api/talkers?limit=ten").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = get(app, "/api/talkers/t2/speeches?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"].as_array().unwrap().len(), 2);
    assert_eq!(body["value"][0]["speech_id"], "s5");
}
