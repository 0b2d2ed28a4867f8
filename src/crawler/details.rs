use tracing::{debug, error, info, warn};

use crate::config::DelayRange;
use crate::database::{BookRepository, DbConfig};
use crate::douban::{detail::parse_book_detail, fetcher::PageSource, SiteUrls};
use crate::errors::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailCrawlReport {
    pub attempted: usize,
    pub updated: usize,
    pub fetch_failures: usize,
    pub parse_failures: usize,
    pub store_failures: usize,
}

/// Fills stored books in from their detail pages
pub struct DetailCrawler<'a, S: PageSource> {
    source: &'a S,
    urls: &'a SiteUrls,
    books: BookRepository,
    delay: DelayRange,
}

impl<'a, S: PageSource> DetailCrawler<'a, S> {
    pub fn new(source: &'a S, urls: &'a SiteUrls, db: &DbConfig, delay: DelayRange) -> Self {
        Self {
            source,
            urls,
            books: BookRepository::new(db.clone()),
            delay,
        }
    }

    pub async fn run(&self, limit: usize) -> Result<DetailCrawlReport> {
        let ids = self.books.get_books_to_update(limit)?;
        let mut report = DetailCrawlReport::default();
        info!("Updating details of {} books", ids.len());

        for (i, book_id) in ids.iter().copied().enumerate() {
            if i > 0 {
                self.delay.wait().await;
            }
            report.attempted += 1;

            let url = self.urls.detail(book_id);
            let Some(html) = self.source.fetch(&url).await else {
                warn!("Skipping book {}, detail page unavailable", book_id);
                report.fetch_failures += 1;
                continue;
            };

            let details = match parse_book_detail(&html) {
                Ok(details) => details,
                Err(e) => {
                    warn!("Skipping book {}: {}", book_id, e);
                    report.parse_failures += 1;
                    continue;
                }
            };

            match self.books.update_book_details(book_id, &details) {
                Ok(0) => debug!("Nothing to update for book {}", book_id),
                Ok(_) => {
                    debug!("Updated book {} ({})", book_id, details.title.as_deref().unwrap_or(""));
                    report.updated += 1;
                }
                Err(e) => {
                    error!("Could not update book {}: {}", book_id, e);
                    report.store_failures += 1;
                }
            }
        }

        Ok(report)
    }
}
