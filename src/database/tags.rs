use std::collections::HashSet;

use rusqlite::params;

use crate::database::{db_loader::DbConfig, tables::*};
use crate::errors::Result;

pub struct TagRepository {
    db: DbConfig,
}

impl TagRepository {
    pub fn new(db: DbConfig) -> Self {
        Self { db }
    }

    /// Tags in the order they were discovered; `None` or `Some(0)` reads them all
    pub fn get_tags(&self, limit: Option<usize>) -> Result<Vec<String>> {
        let limit = match limit {
            Some(n) if n > 0 => n as i64,
            _ => -1,
        };

        let conn = self.db.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT tag FROM {DB_TAGS_NAME} ORDER BY rowid ASC LIMIT ?1"
        ))?;
        let tags = stmt
            .query_map(params![limit], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tags)
    }

    pub fn existing_tags(&self) -> Result<HashSet<String>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(&format!("SELECT tag FROM {DB_TAGS_NAME}"))?;
        let tags = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;
        Ok(tags)
    }

    /// Stores `(main_tag, tag)` pairs whose tag is not known yet
    pub fn add_new_tags(&self, tags: &[(String, String)]) -> Result<usize> {
        if tags.is_empty() {
            return Ok(0);
        }

        let mut conn = self.db.open()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR IGNORE INTO {DB_TAGS_NAME} (main_tag, tag) VALUES (?1, ?2)"
            ))?;
            for (main_tag, tag) in tags {
                inserted += stmt.execute(params![main_tag, tag])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }
}
