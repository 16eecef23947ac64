// Operations on the cached batch of quotes
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::{CacheError, CachedQuote, QuoteDatabase, Result};

impl QuoteDatabase {
    /// Replace the whole cached batch in one transaction.
    ///
    /// Positions are assigned densely from zero in iteration order and every
    /// row gets the same `fetched_at`. Readers see either the previous batch
    /// or the new one, never a mix.
    pub fn replace_cached_quotes<'a, I>(&mut self, quotes: I, fetched_at: DateTime<Utc>) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM cached_quotes", [])?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cached_quotes (text, author, position, fetched_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, (text, author)) in quotes.into_iter().enumerate() {
                stmt.execute(params![
                    text,
                    author,
                    position as i64,
                    fetched_at.timestamp_millis()
                ])?;
                inserted += 1;
            }
        }

        tx.commit()?;
        debug!("Cached batch of {} quotes", inserted);
        Ok(inserted)
    }

    /// Delete every cached quote
    pub fn clear_cache(&self) -> Result<usize> {
        let deleted = self.conn.execute("DELETE FROM cached_quotes", [])?;
        Ok(deleted)
    }

    pub fn cached_quote_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cached_quotes", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn quote_at_position(&self, position: i64) -> Result<Option<CachedQuote>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, text, author, position, fetched_at
                 FROM cached_quotes WHERE position = ?1 LIMIT 1",
                params![position],
                raw_cached_quote,
            )
            .optional()?;

        row.map(RawCachedQuote::into_model).transpose()
    }

    /// Fetch time of the oldest cached row, `None` when the cache is empty
    pub fn oldest_cache_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        let millis: Option<i64> = self
            .conn
            .query_row("SELECT MIN(fetched_at) FROM cached_quotes", [], |row| row.get(0))?;

        millis.map(millis_to_datetime).transpose()
    }

    /// The whole batch in position order
    pub fn cached_quotes(&self) -> Result<Vec<CachedQuote>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, author, position, fetched_at
             FROM cached_quotes ORDER BY position ASC",
        )?;

        let rows = stmt.query_map([], raw_cached_quote)?;

        let mut quotes = Vec::new();
        for row in rows {
            quotes.push(row?.into_model()?);
        }
        Ok(quotes)
    }
}

struct RawCachedQuote {
    id: i64,
    text: String,
    author: String,
    position: i64,
    fetched_at: i64,
}

impl RawCachedQuote {
    fn into_model(self) -> Result<CachedQuote> {
        Ok(CachedQuote {
            id: self.id,
            text: self.text,
            author: self.author,
            position: self.position,
            fetched_at: millis_to_datetime(self.fetched_at)?,
        })
    }
}

fn raw_cached_quote(row: &Row<'_>) -> rusqlite::Result<RawCachedQuote> {
    Ok(RawCachedQuote {
        id: row.get(0)?,
        text: row.get(1)?,
        author: row.get(2)?,
        position: row.get(3)?,
        fetched_at: row.get(4)?,
    })
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or(CacheError::InvalidTimestamp(millis))
}
