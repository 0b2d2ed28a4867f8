use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::params;
use serde::Serialize;
use tracing::debug;

use crate::database::{db_loader::DbConfig, tables::*};
use crate::douban::types::ParsedComment;
use crate::errors::Result;

/// Rating stored when the page had none or an out-of-range one
pub const NEUTRAL_STAR: i64 = 3;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn coerce_star(star: Option<i64>) -> i64 {
    match star {
        Some(s) if (1..=5).contains(&s) => s,
        _ => NEUTRAL_STAR,
    }
}

/// Full timestamp first, then a bare date at midnight, else `now`
pub fn parse_comment_time(raw: Option<&str>, now: NaiveDateTime) -> NaiveDateTime {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return now;
    };

    if let Ok(t) = NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT) {
        return t;
    }
    if let Some(t) = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return t;
    }

    debug!("Unreadable comment time '{}', using current time", raw);
    now
}

/// A comment as it is stored, with star, votes and time coerced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRow {
    pub book_id: i64,
    pub user_link: String,
    pub comment_file: String,
    pub comment_star: i64,
    pub useful: i64,
    pub comment_time: String,
    pub comment_place: Option<String>,
}

impl CommentRow {
    pub fn from_parsed(c: &ParsedComment, now: NaiveDateTime) -> Self {
        Self {
            book_id: c.book_id,
            user_link: c.user_link.clone().unwrap_or_default(),
            comment_file: c.comment_file.clone().unwrap_or_default(),
            comment_star: coerce_star(c.comment_star),
            useful: c.useful.unwrap_or(0).max(0),
            comment_time: parse_comment_time(c.comment_time.as_deref(), now)
                .format(DATETIME_FORMAT)
                .to_string(),
            comment_place: c.comment_place.clone(),
        }
    }
}

pub struct CommentRepository {
    db: DbConfig,
}

impl CommentRepository {
    pub fn new(db: DbConfig) -> Self {
        Self { db }
    }

    /// Appends the comments in one transaction. No duplicate check is made, a
    /// second crawl of the same book adds its comments again.
    pub fn add_comments(&self, comments: &[ParsedComment]) -> Result<usize> {
        if comments.is_empty() {
            return Ok(0);
        }

        let now = Local::now().naive_local();
        let mut conn = self.db.open()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {DB_COMMENTS_NAME}
                 (book_id, user_link, comment_file, comment_star, useful, comment_time, comment_place)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            ))?;
            for c in comments {
                let row = CommentRow::from_parsed(c, now);
                inserted += stmt.execute(params![
                    row.book_id,
                    row.user_link,
                    row.comment_file,
                    row.comment_star,
                    row.useful,
                    row.comment_time,
                    row.comment_place,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }
}
