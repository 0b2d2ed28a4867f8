use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::database::tables::*;
use crate::errors::Result;
use crate::normalizer::normalize_author;

/// Normalizes a raw credit and returns the matching author id, creating the
/// author on first sight. `None` when the credit holds no usable name.
///
/// Runs on the caller's connection so it shares the transaction of the write
/// that needs the id.
pub fn resolve_author(conn: &Connection, raw_credit: &str) -> Result<Option<i64>> {
    let author = normalize_author(raw_credit);
    if author.name.is_empty() {
        debug!("Author credit '{}' has no name left after normalization", raw_credit);
        return Ok(None);
    }

    // A concurrent insert of the same pair is ignored and the lookup below finds it
    let inserted = conn.execute(
        &format!("INSERT OR IGNORE INTO {DB_AUTHOR_NAME} (author_name, nation) VALUES (?1, ?2)"),
        params![&author.name, author.nation],
    )?;

    let author_id: i64 = conn.query_row(
        &format!("SELECT author_id FROM {DB_AUTHOR_NAME} WHERE author_name = ?1 AND nation = ?2"),
        params![&author.name, author.nation],
        |row| row.get(0),
    )?;

    if inserted > 0 {
        info!("New author '{}' ({}) stored with id {}", author.name, author.nation, author_id);
    } else {
        debug!("Author '{}' ({}) already known, id {}", author.name, author.nation, author_id);
    }

    Ok(Some(author_id))
}
