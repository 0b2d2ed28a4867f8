use std::io::Write;

use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::config::DelayRange;
use crate::database::{comments::CommentRow, BookRepository, CommentRepository, DbConfig};
use crate::douban::{
    comments::parse_comments, fetcher::PageSource, types::ParsedComment, SiteUrls,
    COMMENTS_PER_PAGE,
};
use crate::errors::Result;

/// Which books to collect comments for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommentTarget {
    Book(i64),
    /// Titled books with the most ratings first
    TopRated { max_books: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentCrawlReport {
    pub books: usize,
    pub pages: usize,
    pub comments_found: usize,
    pub comments_saved: usize,
    pub fetch_failures: usize,
    pub store_failures: usize,
}

pub struct CommentCrawler<'a, S: PageSource> {
    source: &'a S,
    urls: &'a SiteUrls,
    books: BookRepository,
    comments: CommentRepository,
    delay: DelayRange,
}

impl<'a, S: PageSource> CommentCrawler<'a, S> {
    pub fn new(source: &'a S, urls: &'a SiteUrls, db: &DbConfig, delay: DelayRange) -> Self {
        Self {
            source,
            urls,
            books: BookRepository::new(db.clone()),
            comments: CommentRepository::new(db.clone()),
            delay,
        }
    }

    /// Collects up to `max_per_book` comments for each target book. With
    /// `persist` they are stored, otherwise each one is written to `out` as a
    /// JSON line and nothing is stored.
    pub async fn run<W: Write>(
        &self,
        target: CommentTarget,
        max_per_book: usize,
        persist: bool,
        out: &mut W,
    ) -> Result<CommentCrawlReport> {
        let book_ids = match target {
            CommentTarget::Book(id) => vec![id],
            CommentTarget::TopRated { max_books } => self.books.get_books_for_comments(max_books)?,
        };
        let mut report = CommentCrawlReport::default();

        for (i, book_id) in book_ids.iter().copied().enumerate() {
            if i > 0 {
                self.delay.wait().await;
            }

            let title = self.books.get_book_title(book_id).ok().flatten();
            info!(
                "Collecting comments of book {} ({}/{}) {}",
                book_id,
                i + 1,
                book_ids.len(),
                title.as_deref().unwrap_or("")
            );

            let comments = self.crawl_book(book_id, max_per_book, &mut report).await;
            report.books += 1;
            report.comments_found += comments.len();

            if persist {
                match self.comments.add_comments(&comments) {
                    Ok(saved) => report.comments_saved += saved,
                    Err(e) => {
                        error!("Could not store comments of book {}: {}", book_id, e);
                        report.store_failures += 1;
                    }
                }
            } else {
                let now = Local::now().naive_local();
                for comment in &comments {
                    let row = CommentRow::from_parsed(comment, now);
                    writeln!(out, "{}", serde_json::to_string(&row)?)?;
                }
            }
        }

        Ok(report)
    }

    /// Pages through a book's comments until `max_comments` are collected or
    /// a page comes back short.
    async fn crawl_book(
        &self,
        book_id: i64,
        max_comments: usize,
        report: &mut CommentCrawlReport,
    ) -> Vec<ParsedComment> {
        let mut collected = Vec::new();
        let mut offset = 0;

        while collected.len() < max_comments {
            if offset > 0 {
                self.delay.wait().await;
            }

            let url = self.urls.comments(book_id, offset);
            let Some(html) = self.source.fetch(&url).await else {
                warn!("Could not fetch {}, keeping {} comments", url, collected.len());
                report.fetch_failures += 1;
                break;
            };
            report.pages += 1;

            let page = parse_comments(&html, book_id);
            let found = page.len();
            collected.extend(page);

            // A short page is the last one
            if found < COMMENTS_PER_PAGE {
                debug!("Last comment page of book {} at offset {}", book_id, offset);
                break;
            }
            offset += COMMENTS_PER_PAGE;
        }

        collected.truncate(max_comments);
        collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::FakeSite;
    use crate::database::{
        comments::NEUTRAL_STAR,
        tables::DB_COMMENTS_NAME,
        testing::{count, temp_db},
    };
    use crate::logging::testing::LogCapture;
    use crate::douban::comments::tests::{comment_item, comment_page};
    use crate::douban::types::BookDetails;

    fn urls() -> SiteUrls {
        SiteUrls::new("https://book.douban.com").unwrap()
    }

    fn page_of(n: usize) -> String {
        let items: Vec<String> = (0..n)
            .map(|i| comment_item(&format!("u{i}"), Some(45), "3", "2023-05-01 12:30:45", "不错"))
            .collect();
        comment_page(&items)
    }

    #[tokio::test]
    async fn test_short_page_ends_pagination() {
        let (_dir, db) = temp_db();
        BookRepository::new(db.clone()).ensure_books_exist(vec![8]).unwrap();
        let urls = urls();
        let site = FakeSite::new()
            .with_page(urls.comments(8, 0), page_of(20))
            .with_page(urls.comments(8, 20), page_of(5));

        let crawler = CommentCrawler::new(&site, &urls, &db, DelayRange::none());
        let report = crawler
            .run(CommentTarget::Book(8), 30, true, &mut std::io::sink())
            .await
            .unwrap();

        assert_eq!(site.calls().len(), 2);
        assert_eq!(report.pages, 2);
        assert_eq!(report.comments_found, 25);
        assert_eq!(report.comments_saved, 25);
        assert_eq!(count(&db, DB_COMMENTS_NAME), 25);

        let star: i64 = db
            .open()
            .unwrap()
            .query_row("SELECT comment_star FROM comments LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(star, 4);
    }

    #[tokio::test]
    async fn test_cap_truncates_full_pages() {
        let (_dir, db) = temp_db();
        let urls = urls();
        let site = FakeSite::new()
            .with_page(urls.comments(8, 0), page_of(20))
            .with_page(urls.comments(8, 20), page_of(20))
            .with_page(urls.comments(8, 40), page_of(20));

        let mut report = CommentCrawlReport::default();
        let crawler = CommentCrawler::new(&site, &urls, &db, DelayRange::none());
        let comments = crawler.crawl_book(8, 30, &mut report).await;

        assert_eq!(comments.len(), 30);
        assert_eq!(site.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_print_mode_stores_nothing() {
        let (_dir, db) = temp_db();
        BookRepository::new(db.clone()).ensure_books_exist(vec![8]).unwrap();
        let urls = urls();
        let page = comment_page(&[
            comment_item("u0", Some(45), "3", "2023-05-01 12:30:45", "不错"),
            comment_item("u1", None, "n/a", "2023-05-02", "一般"),
        ]);
        let site = FakeSite::new().with_page(urls.comments(8, 0), page);

        let logs = LogCapture::default();
        let _guard = logs.install();
        let mut out = Vec::new();
        let report = CommentCrawler::new(&site, &urls, &db, DelayRange::none())
            .run(CommentTarget::Book(8), 30, false, &mut out)
            .await
            .unwrap();

        assert_eq!(report.comments_found, 2);
        assert_eq!(report.comments_saved, 0);
        assert_eq!(count(&db, DB_COMMENTS_NAME), 0);

        // Every output line is a comment, the progress logs went elsewhere
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(logs.contents().contains("Collecting comments of book 8"));
        assert!(!text.contains("Collecting comments"));

        assert_eq!(lines[0]["book_id"], 8);
        assert_eq!(lines[0]["comment_star"], 4);
        assert_eq!(lines[0]["useful"], 3);
        assert_eq!(lines[0]["comment_time"], "2023-05-01 12:30:45");

        // Printed the way it would have been stored
        assert_eq!(lines[1]["user_link"], "https://www.douban.com/people/u1/");
        assert_eq!(lines[1]["comment_star"], NEUTRAL_STAR);
        assert_eq!(lines[1]["useful"], 0);
        assert_eq!(lines[1]["comment_time"], "2023-05-02 00:00:00");
    }

    #[tokio::test]
    async fn test_top_rated_targets_and_store_failure() {
        let (_dir, db) = temp_db();
        let books = BookRepository::new(db.clone());
        books.ensure_books_exist(vec![1, 2, 3]).unwrap();
        for (id, sum) in [(1, 10), (2, 500), (3, 50)] {
            let d = BookDetails {
                title: Some(format!("书{id}")),
                rating_sum: Some(sum),
                ..Default::default()
            };
            books.update_book_details(id, &d).unwrap();
        }
        let urls = urls();
        let site = FakeSite::new()
            .with_page(urls.comments(2, 0), page_of(1))
            .with_page(urls.comments(3, 0), page_of(0));

        let report = CommentCrawler::new(&site, &urls, &db, DelayRange::none())
            .run(CommentTarget::TopRated { max_books: 2 }, 30, true, &mut std::io::sink())
            .await
            .unwrap();

        assert_eq!(site.calls(), vec![urls.comments(2, 0), urls.comments(3, 0)]);
        assert_eq!(report.books, 2);
        assert_eq!(report.comments_saved, 1);

        // A book that was never stored breaks the foreign key; the run carries on
        let site = FakeSite::new().with_page(urls.comments(99, 0), page_of(1));
        let report = CommentCrawler::new(&site, &urls, &db, DelayRange::none())
            .run(CommentTarget::Book(99), 30, true, &mut std::io::sink())
            .await
            .unwrap();
        assert_eq!(report.store_failures, 1);
        assert_eq!(count(&db, DB_COMMENTS_NAME), 1);
    }
}
