//! Database initialization
//!
//! Creates the record store schema. The web tier never calls this: it opens
//! an existing store read-only. Operator tools (importer, overview refresh)
//! and tests use it to obtain a read-write pool.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) a read-write database and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets the read-only web tier keep reading while a refresh job writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_talkers_table(&pool).await?;
    create_parts_table(&pool).await?;
    create_parts_fts_table(&pool).await?;
    create_speech_stats_table(&pool).await?;
    create_bill_overview_table(&pool).await?;

    Ok(pool)
}

async fn create_talkers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS talkers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            electorate TEXT,
            party TEXT,
            divisiveness REAL,
            bill_divisiveness REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_talkers_name ON talkers(name)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_parts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS parts (
            speech_id TEXT NOT NULL,
            part_seq INTEGER NOT NULL,
            speech_seq INTEGER NOT NULL DEFAULT 0,
            debate_seq INTEGER NOT NULL DEFAULT 0,
            subdebate_1_seq INTEGER NOT NULL DEFAULT 0,
            subdebate_2_seq INTEGER NOT NULL DEFAULT 0,
            debate_title TEXT,
            debate_category TEXT,
            subdebate_1_title TEXT,
            subdebate_2_title TEXT,
            type TEXT NOT NULL CHECK (type IN ('speech', 'first_reading', 'division', 'interjection', 'continuation')),
            house TEXT NOT NULL CHECK (house IN ('hor', 'senate')),
            date TEXT NOT NULL,
            bill_ids TEXT NOT NULL DEFAULT '[]',
            content TEXT NOT NULL DEFAULT '',
            talker_id TEXT,
            part_type TEXT,
            PRIMARY KEY (speech_id, part_seq)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_parts_head ON parts(part_seq, date)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_parts_talker ON parts(talker_id, part_seq)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_parts_reading_order
         ON parts(date, debate_seq, subdebate_1_seq, subdebate_2_seq, speech_seq)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// External-content FTS5 index over part content, keyed by the parts rowid
async fn create_parts_fts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE VIRTUAL TABLE IF NOT EXISTS parts_fts USING fts5(
            content,
            content = 'parts',
            content_rowid = 'rowid'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_speech_stats_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS speech_stats (
            speech_id TEXT PRIMARY KEY,
            summary TEXT,
            stance REAL,
            tone TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_bill_overview_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bill_overview (
            bill_id TEXT PRIMARY KEY,
            overview TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Rebuild the full-text index from the parts table
pub async fn rebuild_search_index(pool: &SqlitePool) -> Result<()> {
    sqlx::query("INSERT INTO parts_fts(parts_fts) VALUES ('rebuild')")
        .execute(pool)
        .await?;
    info!("Rebuilt full-text index");
    Ok(())
}
