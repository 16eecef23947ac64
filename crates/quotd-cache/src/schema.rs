use rusqlite::Connection;
use tracing::info;

use crate::Result;

// Schema version (increment when changing table definitions)
pub const SCHEMA_VERSION: i32 = 2;

/// Create tables, recreating them when the stored schema version differs.
///
/// There are no migrations: an outdated database is dropped and rebuilt.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != 0 && current_version != SCHEMA_VERSION {
        info!(
            "Schema version {} does not match {}, recreating tables",
            current_version, SCHEMA_VERSION
        );
        drop_all_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS cached_quotes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            author TEXT NOT NULL,
            position INTEGER NOT NULL,
            fetched_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS favourites (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            author TEXT NOT NULL,
            UNIQUE(text, author)
        );

        CREATE INDEX IF NOT EXISTS idx_cached_quotes_position ON cached_quotes(position);
        "#,
    )?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DROP INDEX IF EXISTS idx_cached_quotes_position;
        DROP TABLE IF EXISTS cached_quotes;
        DROP TABLE IF EXISTS favourites;
        "#,
    )?;
    Ok(())
}
