use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

use crate::{schema, Result};

/// Local quote storage backed by SQLite
///
/// Two independent tables live here: `cached_quotes`, replaced wholesale on
/// every refresh, and `favourites`, curated by the user. Operations on each
/// table are in `cache.rs` and `favourites.rs`.
pub struct QuoteDatabase {
    pub(crate) conn: Connection,
}

impl QuoteDatabase {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!("Opening quote database at {}", db_path.display());
        let conn = Connection::open(db_path)?;
        schema::init_schema(&conn)?;

        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;

        Ok(Self { conn })
    }
}
