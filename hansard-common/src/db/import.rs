//! Document importer
//!
//! Loads exported JSON arrays of talkers, part documents and speech stats
//! into a read-write database and rebuilds the full-text index. Existing
//! rows with the same key are replaced.

use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info, warn};

use super::documents::PartDocument;
use super::init::rebuild_search_index;
use super::models::{SpeechStats, Talker};
use crate::Result;

/// Export file names looked up by [`import_dir`]
pub const TALKERS_FILE: &str = "talkers.json";
pub const PARTS_FILE: &str = "parts.json";
pub const STATS_FILE: &str = "speech_stats.json";

/// Number of rows written per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub talkers: u64,
    pub parts: u64,
    pub stats: u64,
}

pub async fn import_talkers(pool: &SqlitePool, talkers: &[Talker]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    for talker in talkers {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO talkers (id, name, electorate, party, divisiveness, bill_divisiveness)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&talker.id)
        .bind(&talker.name)
        .bind(&talker.electorate)
        .bind(&talker.party)
        .bind(talker.divisiveness)
        .bind(talker.bill_divisiveness)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    debug!(count = talkers.len(), "Imported talkers");
    Ok(talkers.len() as u64)
}

/// Normalize and insert part documents of either schema
pub async fn import_parts(pool: &SqlitePool, documents: Vec<PartDocument>) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut written = 0u64;

    for document in documents {
        let part = document.into_part()?;
        let bill_ids = serde_json::to_string(&part.bill_ids.0)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO parts (
                speech_id, part_seq, speech_seq, debate_seq, subdebate_1_seq, subdebate_2_seq,
                debate_title, debate_category, subdebate_1_title, subdebate_2_title,
                type, house, date, bill_ids, content, talker_id, part_type
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&part.speech_id)
        .bind(part.part_seq)
        .bind(part.speech_seq)
        .bind(part.debate_seq)
        .bind(part.subdebate_1_seq)
        .bind(part.subdebate_2_seq)
        .bind(&part.debate_title)
        .bind(&part.debate_category)
        .bind(&part.subdebate_1_title)
        .bind(&part.subdebate_2_title)
        .bind(part.kind.as_str())
        .bind(part.house.as_str())
        .bind(part.date)
        .bind(&bill_ids)
        .bind(&part.content)
        .bind(&part.talker_id)
        .bind(&part.part_type)
        .execute(&mut *tx)
        .await?;

        written += 1;
    }
    tx.commit().await?;

    debug!(count = written, "Imported speech parts");
    Ok(written)
}

pub async fn import_stats(pool: &SqlitePool, stats: &[SpeechStats]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    for entry in stats {
        let tone = entry
            .tone
            .as_ref()
            .map(|tags| serde_json::to_string(&tags.0))
            .transpose()?;

        sqlx::query(
            "INSERT OR REPLACE INTO speech_stats (speech_id, summary, stance, tone) VALUES (?, ?, ?, ?)",
        )
        .bind(&entry.speech_id)
        .bind(&entry.summary)
        .bind(entry.stance)
        .bind(tone)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    debug!(count = stats.len(), "Imported speech stats");
    Ok(stats.len() as u64)
}

/// Import all three collections and rebuild the full-text index
pub async fn import_all(
    pool: &SqlitePool,
    talkers: &[Talker],
    parts: Vec<PartDocument>,
    stats: &[SpeechStats],
) -> Result<ImportSummary> {
    let summary = ImportSummary {
        talkers: import_talkers(pool, talkers).await?,
        parts: import_parts(pool, parts).await?,
        stats: import_stats(pool, stats).await?,
    };
    rebuild_search_index(pool).await?;
    Ok(summary)
}

fn read_export<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        warn!("Export file not found, skipping: {}", path.display());
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Import `talkers.json`, `parts.json` and `speech_stats.json` from a directory.
/// Missing files are skipped with a warning.
pub async fn import_dir(pool: &SqlitePool, dir: &Path) -> Result<ImportSummary> {
    let talkers: Vec<Talker> = read_export(&dir.join(TALKERS_FILE))?;
    let parts: Vec<PartDocument> = read_export(&dir.join(PARTS_FILE))?;
    let stats: Vec<SpeechStats> = read_export(&dir.join(STATS_FILE))?;

    let summary = import_all(pool, &talkers, parts, &stats).await?;
    info!(
        talkers = summary.talkers,
        parts = summary.parts,
        stats = summary.stats,
        "Imported exports from {}",
        dir.display()
    );
    Ok(summary)
}
