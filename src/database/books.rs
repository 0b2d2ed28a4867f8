use std::collections::BTreeSet;

use rusqlite::{params, params_from_iter, types::Value, OptionalExtension};
use tracing::debug;

use crate::database::{authors::resolve_author, db_loader::DbConfig, tables::*};
use crate::douban::types::BookDetails;
use crate::errors::Result;

pub struct BookRepository {
    db: DbConfig,
}

/// Columns a detail update may write, paired with the parsed value. Only the
/// fields found on the page come back; `author_id` is resolved separately.
fn column_assignments(d: &BookDetails) -> Vec<(&'static str, Value)> {
    let text = |v: &Option<String>| v.clone().map(Value::Text);
    let int = |v: Option<i64>| v.map(Value::Integer);
    let real = |v: Option<f64>| v.map(Value::Real);

    let fields = [
        ("title", text(&d.title)),
        ("img_src", text(&d.img_src)),
        ("publisher", text(&d.publisher)),
        ("producer", text(&d.producer)),
        ("original_title", text(&d.original_title)),
        ("translator", text(&d.translator)),
        (
            "publication_year",
            d.publication_year
                .map(|x| Value::Text(x.format("%Y-%m-%d").to_string())),
        ),
        ("page_count", int(d.page_count)),
        ("price", real(d.price)),
        ("binding", text(&d.binding)),
        ("series", text(&d.series)),
        ("isbn", text(&d.isbn)),
        ("rating", real(d.rating)),
        ("rating_sum", int(d.rating_sum)),
        ("stars5_starstop", real(d.stars5_starstop)),
        ("stars4_starstop", real(d.stars4_starstop)),
        ("stars3_starstop", real(d.stars3_starstop)),
        ("stars2_starstop", real(d.stars2_starstop)),
        ("stars1_starstop", real(d.stars1_starstop)),
    ];

    fields
        .into_iter()
        .filter_map(|(col, v)| v.map(|v| (col, v)))
        .collect()
}

impl BookRepository {
    pub fn new(db: DbConfig) -> Self {
        Self { db }
    }

    /// Inserts skeleton rows for the ids not stored yet and returns how many
    /// were created.
    pub fn ensure_books_exist<I>(&self, book_ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = i64>,
    {
        let wanted: BTreeSet<i64> = book_ids.into_iter().collect();
        if wanted.is_empty() {
            return Ok(0);
        }

        let mut conn = self.db.open()?;
        let tx = conn.transaction()?;

        let existing: BTreeSet<i64> = {
            let placeholders = vec!["?"; wanted.len()].join(", ");
            let mut stmt = tx.prepare(&format!(
                "SELECT book_id FROM {DB_BOOKS_NAME} WHERE book_id IN ({placeholders})"
            ))?;
            let found = stmt
                .query_map(params_from_iter(wanted.iter()), |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<BTreeSet<i64>>>()?;
            found
        };

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR IGNORE INTO {DB_BOOKS_NAME} (book_id) VALUES (?1)"
            ))?;
            for book_id in wanted.difference(&existing) {
                inserted += stmt.execute(params![book_id])?;
            }
        }

        tx.commit()?;
        debug!("{} of {} book ids were new", inserted, wanted.len());
        Ok(inserted)
    }

    /// Writes the fields present in `details` onto an existing book. Returns the
    /// number of rows touched; 0 without touching the store when nothing is set.
    pub fn update_book_details(&self, book_id: i64, details: &BookDetails) -> Result<usize> {
        let mut sets = column_assignments(details);
        let credit = details
            .author_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if sets.is_empty() && credit.is_none() {
            return Ok(0);
        }

        let mut conn = self.db.open()?;
        let tx = conn.transaction()?;

        if let Some(credit) = credit {
            if let Some(author_id) = resolve_author(&tx, credit)? {
                sets.push(("author_id", Value::Integer(author_id)));
            }
        }

        if sets.is_empty() {
            return Ok(0);
        }

        let clause = sets
            .iter()
            .enumerate()
            .map(|(i, (col, _))| format!("{col} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {DB_BOOKS_NAME} SET {clause} WHERE book_id = ?{}",
            sets.len() + 1
        );

        let mut values: Vec<Value> = sets.into_iter().map(|(_, v)| v).collect();
        values.push(Value::Integer(book_id));

        let rows = tx.execute(&sql, params_from_iter(values))?;
        tx.commit()?;
        Ok(rows)
    }

    /// Lowest ids first, complete or not
    pub fn get_books_to_update(&self, limit: usize) -> Result<Vec<i64>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT book_id FROM {DB_BOOKS_NAME} ORDER BY book_id ASC LIMIT ?1"
        ))?;
        let ids = stmt
            .query_map(params![limit as i64], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    /// Books that already have a title, most rated first
    pub fn get_books_for_comments(&self, limit: usize) -> Result<Vec<i64>> {
        let conn = self.db.open()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT book_id FROM {DB_BOOKS_NAME}
             WHERE title IS NOT NULL AND title != ''
             ORDER BY rating_sum DESC, book_id ASC
             LIMIT ?1"
        ))?;
        let ids = stmt
            .query_map(params![limit as i64], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    pub fn get_book_title(&self, book_id: i64) -> Result<Option<String>> {
        let conn = self.db.open()?;
        let title = conn
            .query_row(
                &format!("SELECT title FROM {DB_BOOKS_NAME} WHERE book_id = ?1"),
                params![book_id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(title.flatten())
    }
}
