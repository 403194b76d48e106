//! Database migrations

use crate::error::{Error, Result};
use libsql::Connection;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
///
/// Refuses to touch a database written by a newer schema.
pub async fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn).await?;

    if version > CURRENT_VERSION {
        return Err(Error::VersionConflict {
            found: version,
            supported: CURRENT_VERSION,
        });
    }
    if version < 1 {
        migrate_v1(conn).await?;
    }

    Ok(())
}

/// Schema version recorded in the database; 0 for a fresh file
pub(crate) async fn get_version(conn: &Connection) -> Result<i32> {
    let has_table = scalar(
        conn,
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
    )
    .await?;
    if has_table == 0 {
        return Ok(0);
    }

    scalar(conn, "SELECT COALESCE(MAX(version), 0) FROM schema_version").await
}

async fn scalar(conn: &Connection, sql: &str) -> Result<i32> {
    let mut rows = conn.query(sql, ()).await?;
    match rows.next().await? {
        Some(row) => Ok(row.get(0)?),
        None => Ok(0),
    }
}

/// Migration to version 1: note table keyed by id, secondary indexes
async fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute("BEGIN TRANSACTION", ()).await?;

    let statements = [
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        "CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            position INTEGER NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_notes_title ON notes(title)",
        "CREATE INDEX IF NOT EXISTS idx_notes_created ON notes(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_notes_updated ON notes(updated_at)",
        "INSERT INTO schema_version (version) VALUES (1)",
    ];

    for stmt in statements {
        if let Err(e) = conn.execute(stmt, ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
    }

    if let Err(e) = conn.execute("COMMIT", ()).await {
        conn.execute("ROLLBACK", ()).await.ok();
        return Err(e.into());
    }

    tracing::info!("Migrated notes database to version 1");
    Ok(())
}
