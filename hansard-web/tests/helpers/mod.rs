//! Test helpers: throwaway record stores seeded through the importer

#![allow(dead_code)]

use hansard_common::db::{import_all, init_database, PartDocument, SpeechStats, Talker};
use hansard_web::store::{QueryContext, RecordStore};
use serde_json::{json, Value};
use tempfile::TempDir;

/// A seeded store; the directory must outlive the store
pub struct TestStore {
    pub dir: TempDir,
    pub store: RecordStore,
}

impl TestStore {
    pub fn ctx(&self) -> QueryContext {
        self.store.context()
    }
}

/// Create a database under a temp dir and import the given documents
pub async fn seed(talkers: Value, parts: Value, stats: Value) -> TestStore {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = init_database(&dir.path().join("hansard.db"))
        .await
        .expect("init database");

    let talkers: Vec<Talker> = serde_json::from_value(talkers).expect("talkers");
    let parts: Vec<PartDocument> = serde_json::from_value(parts).expect("parts");
    let stats: Vec<SpeechStats> = serde_json::from_value(stats).expect("stats");
    import_all(&pool, &talkers, parts, &stats)
        .await
        .expect("import");

    TestStore {
        dir,
        store: RecordStore::from_pool(pool, None),
    }
}

/// Head part of a speech in the nested export shape
pub fn head_part(speech_id: &str, talker_id: &str, bill_ids: &[&str], date: &str, house: &str) -> Value {
    json!({
        "speech_id": speech_id,
        "part_seq": 0,
        "type": "speech",
        "talker_id": talker_id,
        "bill_ids": bill_ids,
        "date": date,
        "house": house,
        "debate_title": "BILLS",
        "debate_category": "BILLS",
        "subdebate_1_title": format!("Bill for {}", bill_ids.first().copied().unwrap_or("nothing")),
        "content": format!("Speech {speech_id} by {talker_id}"),
    })
}

/// Three members across two parties and both chambers
pub fn talkers() -> Value {
    json!([
        {"id": "t1", "name": "A. Member", "party": "ALP", "electorate": "Grayndler", "bill_divisiveness": 0.8},
        {"id": "t2", "name": "B. Senator", "party": "LP", "electorate": "Victoria", "bill_divisiveness": 0.3},
        {"id": "t3", "name": "C. Member", "party": "ALP", "electorate": "Sydney"},
    ])
}

/// A small sitting record spread over two bills and three days
pub async fn seed_parliament() -> TestStore {
    let parts = json!([
        head_part("s1", "t1", &["b1"], "2025-01-01", "hor"),
        head_part("s2", "t2", &["b1"], "2025-01-02", "senate"),
        head_part("s3", "t3", &["b1"], "2025-01-02", "hor"),
        head_part("s4", "t1", &["b2"], "2025-01-03", "hor"),
        head_part("s5", "t2", &["b1", "b2"], "2025-01-03", "senate"),
        head_part("s6", "t1", &[], "2025-01-03", "hor"),
        {
            "speech_id": "s1",
            "part_seq": 1,
            "type": "interjection",
            "talker_id": "t2",
            "bill_ids": ["b1"],
            "date": "2025-01-01",
            "house": "hor",
            "content": "Hear, hear! The budget matters.",
        },
    ]);
    let stats = json!([
        {"speech_id": "s1", "summary": "Supports b1", "stance": 0.6, "tone": ["confident"]},
        {"speech_id": "s2", "summary": "Opposes b1", "stance": -0.5, "tone": ["confrontational"]},
        {"speech_id": "s3", "summary": null, "stance": null, "tone": null},
    ]);
    seed(talkers(), parts, stats).await
}
