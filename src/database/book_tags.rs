use rusqlite::params;

use crate::database::{db_loader::DbConfig, tables::*};
use crate::errors::Result;

pub struct BookTagRepository {
    db: DbConfig,
}

impl BookTagRepository {
    pub fn new(db: DbConfig) -> Self {
        Self { db }
    }

    /// Links books to tags, skipping pairs already recorded. Returns the number
    /// of new links. The books must already exist.
    pub fn add_relations(&self, relations: &[(i64, String)]) -> Result<usize> {
        if relations.is_empty() {
            return Ok(0);
        }

        let mut conn = self.db.open()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR IGNORE INTO {DB_BOOK_TAG_NAME} (book_id, book_tag) VALUES (?1, ?2)"
            ))?;
            for (book_id, tag) in relations {
                inserted += stmt.execute(params![book_id, tag])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }
}
