//! Integration tests for the aggregation queries against a seeded store

mod helpers;

use chrono::NaiveDate;
use hansard_common::db::{House, PartKind};
use hansard_common::metrics::StanceLabel;
use hansard_common::time::BackfillWindow;
use hansard_common::Error;
use hansard_web::overview::{all_bill_ids, compute_overview, load_overview, refresh_all, refresh_overview};
use hansard_web::pagination::{PageRequest, PageResponse, BILL_PAGE_BOUNDS, SPEECH_PAGE_BOUNDS};
use hansard_web::params::{ParamMap, QueryFilters};
use hansard_web::queries;
use helpers::{head_part, seed, seed_parliament, talkers};
use serde_json::{json, Value};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn first_page() -> PageRequest {
    PageRequest::new(1, 20, BILL_PAGE_BOUNDS)
}

fn filters(pairs: &[(&str, &str)]) -> QueryFilters {
    QueryFilters::from_params(&ParamMap::from_pairs(pairs.iter().copied()))
}

// =============================================================================
// Single-member scenario
// =============================================================================

#[tokio::test]
async fn test_single_speech_bill_and_proportions() {
    let seeded = seed(
        json!([{"id": "t1", "name": "A. Member", "party": "ALP"}]),
        json!([head_part("s1", "t1", &["b1"], "2025-01-01", "hor")]),
        Value::Array(Vec::new()),
    )
    .await;
    let ctx = seeded.ctx();

    let bills = queries::bills_list(&seeded.store, &ctx, &QueryFilters::default(), first_page())
        .await
        .unwrap();
    assert_eq!(bills.total, 1);
    assert_eq!(bills.rows.len(), 1);
    assert_eq!(bills.rows[0].id, "b1");
    assert_eq!(bills.rows[0].date, date(2025, 1, 1));
    assert_eq!(bills.rows[0].house, House::Hor);

    let proportions =
        queries::party_speech_proportions(&seeded.store, &ctx, &QueryFilters::for_bill("b1"))
            .await
            .unwrap();
    assert_eq!(serde_json::to_value(&proportions).unwrap(), json!({"ALP": 100.0}));
}

// =============================================================================
// Bills
// =============================================================================

#[tokio::test]
async fn test_bills_list_requires_exactly_one_bill() {
    let seeded = seed_parliament().await;
    let page = queries::bills_list(&seeded.store, &seeded.ctx(), &QueryFilters::default(), first_page())
        .await
        .unwrap();

    let ids: Vec<&str> = page.rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["b2", "b1"]);
    assert_eq!(page.total, 2);

    // b2 is only listed through s4; s5 mentions two bills and is ignored
    assert_eq!(page.rows[0].date, date(2025, 1, 3));
    assert_eq!(page.rows[0].house, House::Hor);
    assert_eq!(page.rows[1].date, date(2025, 1, 1));
    assert_eq!(page.rows[1].title.as_deref(), Some("Bill for b1"));
}

#[tokio::test]
async fn test_bill_discussion_credits_every_bill() {
    let seeded = seed_parliament().await;
    let page = queries::bill_discussion(&seeded.store, &seeded.ctx(), &QueryFilters::default())
        .await
        .unwrap();

    assert_eq!(page.rows.len(), 2);
    let b1 = &page.rows[0];
    assert_eq!(b1.bill_id, "b1");
    assert_eq!(b1.speech_count, 4);
    assert_eq!(b1.talker_count, 3);
    assert_eq!(b1.latest_speech_date, date(2025, 1, 3));

    let b2 = &page.rows[1];
    assert_eq!(b2.bill_id, "b2");
    assert_eq!(b2.speech_count, 2);
}

#[tokio::test]
async fn test_bills_detailed_counts_distinct_speeches() {
    let seeded = seed_parliament().await;
    let page = queries::bills_detailed(&seeded.store, &seeded.ctx(), &QueryFilters::default(), first_page())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    let b1 = page.rows.iter().find(|row| row.id == "b1").unwrap();
    assert_eq!(b1.num_speeches, 4);
    assert_eq!(b1.latest_date, date(2025, 1, 3));
    assert_eq!(b1.latest_house, House::Senate);
}

#[tokio::test]
async fn test_first_reading_marker_and_unknown_talker() {
    let parts = json!([
        {
            "speech_id": "fr1",
            "part_seq": 2,
            "type": "first_reading",
            "bill_ids": ["b9"],
            "date": "2025-03-01",
            "house": "hor",
            "debate_title": "BILLS",
            "subdebate_1_title": "B9 Bill",
            "content": "Bill read a first time.",
        },
        head_part("g1", "ghost", &["b9"], "2025-03-02", "senate"),
    ]);
    let seeded = seed(talkers(), parts, Value::Array(Vec::new())).await;
    let ctx = seeded.ctx();
    let bill = QueryFilters::for_bill("b9");

    let bills = queries::bills_list(&seeded.store, &ctx, &QueryFilters::default(), first_page())
        .await
        .unwrap();
    assert_eq!(bills.total, 1);
    assert_eq!(bills.rows[0].id, "b9");
    assert_eq!(bills.rows[0].title.as_deref(), Some("B9 Bill"));
    assert_eq!(bills.rows[0].date, date(2025, 3, 1));

    let days = queries::speech_list(&seeded.store, &ctx, &bill).await.unwrap();
    assert_eq!(days.len(), 2);
    let marker = &days[1].parts[0];
    assert_eq!(marker.part.kind, PartKind::FirstReading);
    assert_eq!(marker.part.part_seq, 2);
    let ghost = &days[0].parts[0];
    assert_eq!(ghost.part.talker_id.as_deref(), Some("ghost"));
    assert_eq!(ghost.talker.talker_name, None);
    assert_eq!(ghost.talker.talker_party, None);

    let speakers = queries::top_speakers(&seeded.store, &ctx, &bill).await.unwrap();
    assert_eq!(speakers.rows.len(), 1);
    assert_eq!(speakers.rows[0].id, "ghost");
    assert_eq!(speakers.rows[0].name, None);
    assert_eq!(speakers.rows[0].count, 1);
    assert_eq!(speakers.rows[0].house, House::Senate);
}

// =============================================================================
// Filters
// =============================================================================

#[tokio::test]
async fn test_blank_text_query_is_a_no_op() {
    let seeded = seed_parliament().await;
    let ctx = seeded.ctx();
    let page = PageRequest::new(1, 100, SPEECH_PAGE_BOUNDS);

    let unfiltered = queries::speeches(&seeded.store, &ctx, &QueryFilters::default(), page)
        .await
        .unwrap();
    let blank = queries::speeches(&seeded.store, &ctx, &filters(&[("query", "   ")]), page)
        .await
        .unwrap();

    assert_eq!(unfiltered.total, 6);
    assert_eq!(blank.total, unfiltered.total);
    assert_eq!(blank.rows, unfiltered.rows);
}

#[tokio::test]
async fn test_text_query_matches_content() {
    let seeded = seed_parliament().await;
    let page = PageRequest::new(1, 100, SPEECH_PAGE_BOUNDS);
    let result = queries::speeches(&seeded.store, &seeded.ctx(), &filters(&[("q", "s4")]), page)
        .await
        .unwrap();

    assert_eq!(result.total, 1);
    assert_eq!(result.rows[0].part.speech_id, "s4");
    assert_eq!(result.rows[0].talker.talker_name.as_deref(), Some("A. Member"));
}

#[tokio::test]
async fn test_talker_filters_join_talkers() {
    let seeded = seed_parliament().await;
    let page = PageRequest::new(1, 100, SPEECH_PAGE_BOUNDS);
    let result = queries::speeches(
        &seeded.store,
        &seeded.ctx(),
        &filters(&[("party", "LP"), ("from", "2025-01-03"), ("to", "not a date")]),
        page,
    )
    .await
    .unwrap();

    let ids: Vec<&str> = result.rows.iter().map(|row| row.part.speech_id.as_str()).collect();
    assert_eq!(ids, vec!["s5"]);
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_pagination_over_25_speeches() {
    let parts: Vec<Value> = (1..=25)
        .map(|i| head_part(&format!("s{i:02}"), "t1", &["b1"], "2025-02-01", "hor"))
        .collect();
    let seeded = seed(talkers(), Value::Array(parts), Value::Array(Vec::new())).await;
    let ctx = seeded.ctx();

    let page_one = PageRequest::new(1, 10, SPEECH_PAGE_BOUNDS);
    let first = queries::speeches(&seeded.store, &ctx, &QueryFilters::default(), page_one)
        .await
        .unwrap();
    let first = PageResponse::new(first, page_one);
    assert_eq!(first.rows.len(), 10);
    assert_eq!(first.total, 25);
    assert!(first.has_next);

    let page_three = PageRequest::new(3, 10, SPEECH_PAGE_BOUNDS);
    let third = queries::speeches(&seeded.store, &ctx, &QueryFilters::default(), page_three)
        .await
        .unwrap();
    let third = PageResponse::new(third, page_three);
    assert_eq!(third.rows.len(), 5);
    assert!(!third.has_next);
}

// =============================================================================
// Bill facets
// =============================================================================

#[tokio::test]
async fn test_bill_facets() {
    let seeded = seed_parliament().await;
    let ctx = seeded.ctx();
    let bill = QueryFilters::for_bill("b1");

    let proportions = queries::party_speech_proportions(&seeded.store, &ctx, &bill)
        .await
        .unwrap();
    assert_eq!(proportions.get("ALP"), Some(50.0));
    assert_eq!(proportions.get("LP"), Some(50.0));

    let speakers = queries::top_speakers(&seeded.store, &ctx, &bill).await.unwrap();
    let ids: Vec<&str> = speakers.rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["t2", "t1", "t3"]);
    assert_eq!(speakers.rows[0].count, 2);
    assert_eq!(speakers.rows[0].house, House::Senate);
    assert_eq!(speakers.rows[0].stance, Some(-0.5));

    let days = queries::speech_list(&seeded.store, &ctx, &bill).await.unwrap();
    let dates: Vec<NaiveDate> = days.iter().map(|bucket| bucket.date).collect();
    assert_eq!(dates, vec![date(2025, 1, 3), date(2025, 1, 2), date(2025, 1, 1)]);
    assert_eq!(days[1].parts.len(), 2);

    let sentiment = queries::sentiment_rows(&seeded.store, &ctx, &bill).await.unwrap();
    let ids: Vec<&str> = sentiment.iter().map(|row| row.speech_id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
    assert_eq!(sentiment[0].tone_value, Some(0.7));
}

#[tokio::test]
async fn test_speeches_over_time_backfills_window() {
    let seeded = seed_parliament().await;
    let window = BackfillWindow::SittingDays(vec![date(2025, 1, 1), date(2025, 1, 4)]);
    let series = queries::speeches_over_time(
        &seeded.store,
        &seeded.ctx(),
        &QueryFilters::for_bill("b1"),
        &window,
        date(2025, 1, 10),
    )
    .await
    .unwrap();

    let counts: Vec<(NaiveDate, u64, u64)> =
        series.iter().map(|row| (row.date, row.hor, row.senate)).collect();
    assert_eq!(
        counts,
        vec![
            (date(2025, 1, 1), 1, 0),
            (date(2025, 1, 2), 1, 1),
            (date(2025, 1, 3), 0, 1),
            (date(2025, 1, 4), 0, 0),
        ]
    );
}

#[tokio::test]
async fn test_divisiveness_skips_unscored_talkers() {
    let seeded = seed_parliament().await;
    let page = queries::divisiveness_ranking(&seeded.store, &seeded.ctx(), &QueryFilters::default())
        .await
        .unwrap();

    let ranked: Vec<(&str, f64)> = page
        .rows
        .iter()
        .map(|row| (row.id.as_str(), row.divisiveness))
        .collect();
    assert_eq!(ranked, vec![("t1", 0.8), ("t2", 0.3)]);
}

// =============================================================================
// Speeches and members
// =============================================================================

#[tokio::test]
async fn test_speech_detail() {
    let seeded = seed_parliament().await;
    let ctx = seeded.ctx();

    let detail = queries::speech_detail(&seeded.store, &ctx, "s1").await.unwrap();
    let seqs: Vec<i64> = detail.parts.iter().map(|p| p.part.part_seq).collect();
    assert_eq!(seqs, vec![0, 1]);
    assert_eq!(detail.parts[1].talker.talker_name.as_deref(), Some("B. Senator"));
    assert_eq!(detail.stance, Some(0.6));
    assert_eq!(detail.stance_label, Some(StanceLabel::InFavor));
    assert_eq!(detail.tone_value, Some(0.7));

    let unannotated = queries::speech_detail(&seeded.store, &ctx, "s4").await.unwrap();
    assert_eq!(unannotated.stance_label, None);

    let missing = queries::speech_detail(&seeded.store, &ctx, "nope").await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_members_listing() {
    let seeded = seed_parliament().await;
    let ctx = seeded.ctx();
    let page = PageRequest::new(1, 20, BILL_PAGE_BOUNDS);

    let all = queries::members(&seeded.store, &ctx, &QueryFilters::default(), page)
        .await
        .unwrap();
    let names: Vec<&str> = all.rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["A. Member", "B. Senator", "C. Member"]);
    assert_eq!(all.total, 3);
    assert_eq!(all.rows[0].house, House::Hor);

    let senate = queries::members(&seeded.store, &ctx, &filters(&[("house", "senate")]), page)
        .await
        .unwrap();
    assert_eq!(senate.total, 1);
    assert_eq!(senate.rows[0].id, "t2");

    let by_name = queries::members(&seeded.store, &ctx, &filters(&[("query", "c. mem")]), page)
        .await
        .unwrap();
    assert_eq!(by_name.total, 1);
    assert_eq!(by_name.rows[0].id, "t3");
}

#[tokio::test]
async fn test_member_house_comes_from_first_speech() {
    let parts = json!([
        head_part("m2", "t2", &[], "2025-01-05", "hor"),
        head_part("m1", "t2", &[], "2025-01-01", "senate"),
    ]);
    let seeded = seed(talkers(), parts, Value::Array(Vec::new())).await;
    let page = PageRequest::new(1, 20, BILL_PAGE_BOUNDS);

    let members = queries::members(&seeded.store, &seeded.ctx(), &QueryFilters::default(), page)
        .await
        .unwrap();
    assert_eq!(members.total, 1);
    assert_eq!(members.rows[0].id, "t2");
    assert_eq!(members.rows[0].house, House::Senate);
}

#[tokio::test]
async fn test_member_detail() {
    let seeded = seed_parliament().await;
    let ctx = seeded.ctx();

    let detail = queries::member_detail(&seeded.store, &ctx, "t1", &QueryFilters::default())
        .await
        .unwrap();
    assert_eq!(detail.talker.name, "A. Member");
    assert_eq!(detail.speeches.len(), 3);
    assert_eq!(detail.speeches[2].speech_id, "s1");

    let missing = queries::member_detail(&seeded.store, &ctx, "t9", &QueryFilters::default()).await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_talker_lookups() {
    let seeded = seed_parliament().await;
    let ctx = seeded.ctx();

    let alp = queries::talker_search(&seeded.store, &ctx, "alp", None).await.unwrap();
    let ids: Vec<&str> = alp.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t3"]);

    let limited = queries::talker_search(&seeded.store, &ctx, "", Some(1)).await.unwrap();
    assert_eq!(limited.len(), 1);

    let parts = queries::talker_speeches(&seeded.store, &ctx, "t2", None).await.unwrap();
    let ids: Vec<(&str, i64)> = parts.iter().map(|p| (p.speech_id.as_str(), p.part_seq)).collect();
    assert_eq!(ids, vec![("s5", 0), ("s2", 0), ("s1", 1)]);
}

#[tokio::test]
async fn test_filter_options() {
    let seeded = seed_parliament().await;
    let options = queries::filter_options(&seeded.store, &seeded.ctx()).await.unwrap();

    assert_eq!(options.categories, vec!["BILLS"]);
    assert_eq!(options.parties, vec!["ALP", "LP"]);
    assert_eq!(options.electorates, vec!["Grayndler", "Sydney", "Victoria"]);
}

// =============================================================================
// Bill overview
// =============================================================================

#[tokio::test]
async fn test_overview_refresh_and_load() {
    let seeded = seed_parliament().await;
    let ctx = seeded.ctx();
    let window = BackfillWindow::SittingDays(vec![date(2025, 1, 1)]);
    let today = date(2025, 1, 10);

    assert!(load_overview(&seeded.store, &ctx, "b1").await.unwrap().is_none());

    let live = compute_overview(&seeded.store, &ctx, "b1", &window, today)
        .await
        .unwrap();
    assert_eq!(live.title(), Some("Bill for b1"));

    let written = refresh_overview(&seeded.store, &ctx, "b1", &window, today)
        .await
        .unwrap();
    let loaded = load_overview(&seeded.store, &ctx, "b1").await.unwrap().unwrap();
    assert_eq!(loaded.bill_id, "b1");
    assert_eq!(loaded.overview.top_speakers, written.overview.top_speakers);
    assert_eq!(loaded.overview.speech_list, written.overview.speech_list);
    assert_eq!(loaded.overview.party_speech_proportions.get("ALP"), Some(50.0));

    assert_eq!(all_bill_ids(&seeded.store, &ctx).await.unwrap(), vec!["b1", "b2"]);
    assert_eq!(refresh_all(&seeded.store, &ctx, &window, today).await.unwrap(), 2);
    assert!(load_overview(&seeded.store, &ctx, "b2").await.unwrap().is_some());
}

#[tokio::test]
async fn test_shutdown_cancels_queries() {
    let seeded = seed_parliament().await;
    let ctx = seeded.ctx();
    seeded.store.shutdown().await;

    assert!(seeded.store.is_shut_down());
    let result = queries::filter_options(&seeded.store, &ctx).await;
    assert!(matches!(result, Err(Error::Cancelled)));
}
