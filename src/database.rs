use rusqlite::Connection;

use crate::{database::tables::*, errors::Result};

pub mod authors;
pub mod book_tags;
pub mod books;
pub mod comments;
pub mod db_loader;
pub mod tables;
pub mod tags;

pub use book_tags::BookTagRepository;
pub use books::BookRepository;
pub use comments::CommentRepository;
pub use db_loader::DbConfig;
pub use tags::TagRepository;

pub fn init_table(name: &str, cols: &str) -> String {
    format!(
        "create table if not exists {name} ({cols})")
}

/// Creates every table and index; safe to run on an existing store
pub fn init(conn: &Connection) -> Result<()> {
    // Parents before children so foreign keys resolve
    conn.execute(&init_table(DB_AUTHOR_NAME, DB_AUTHOR_COLS), [])?;
    conn.execute(&init_table(DB_BOOKS_NAME, DB_BOOKS_COLS), [])?;
    conn.execute(&init_table(DB_BOOK_TAG_NAME, DB_BOOK_TAG_COLS), [])?;
    conn.execute(&init_table(DB_COMMENTS_NAME, DB_COMMENTS_COLS), [])?;
    conn.execute(&init_table(DB_TAGS_NAME, DB_TAGS_COLS), [])?;
    conn.execute(DB_COMMENTS_INDEX_BOOK_ID, [])?;
    conn.execute(DB_BOOKS_INDEX_RATING_SUM, [])?;
    Ok(())
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Fresh schema in a throwaway directory; keep the TempDir alive for the test's duration
    pub fn temp_db() -> (tempfile::TempDir, DbConfig) {
        let dir = tempfile::tempdir().unwrap();
        let db = DbConfig::new(dir.path().join("test.db3"));
        init(&db.open().unwrap()).unwrap();
        (dir, db)
    }

    pub fn count(db: &DbConfig, table: &str) -> i64 {
        db.open()
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }
}
