// Favourite quotes, keyed by (text, author)
use rusqlite::params;

use crate::{FavouriteQuote, QuoteDatabase, Result};

impl QuoteDatabase {
    /// Insert a favourite, ignoring duplicates. Returns whether a row was added.
    pub fn insert_favourite(&self, text: &str, author: &str) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO favourites (text, author) VALUES (?1, ?2)",
            params![text, author],
        )?;
        Ok(inserted > 0)
    }

    /// Delete by (text, author). Deleting something absent is not an error.
    pub fn delete_favourite(&self, text: &str, author: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM favourites WHERE text = ?1 AND author = ?2",
            params![text, author],
        )?;
        Ok(deleted)
    }

    pub fn count_favourite(&self, text: &str, author: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM favourites WHERE text = ?1 AND author = ?2",
            params![text, author],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn is_favourite(&self, text: &str, author: &str) -> Result<bool> {
        Ok(self.count_favourite(text, author)? > 0)
    }

    /// All favourites, most recently added first
    pub fn favourites(&self) -> Result<Vec<FavouriteQuote>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, author FROM favourites ORDER BY id DESC")?;

        let rows = stmt.query_map([], |row| {
            Ok(FavouriteQuote {
                id: row.get(0)?,
                text: row.get(1)?,
                author: row.get(2)?,
            })
        })?;

        let mut favourites = Vec::new();
        for row in rows {
            favourites.push(row?);
        }
        Ok(favourites)
    }
}
