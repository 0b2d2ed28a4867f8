use tracing::{debug, error, info, warn};

use crate::config::DelayRange;
use crate::database::{BookRepository, BookTagRepository, DbConfig, TagRepository};
use crate::douban::{
    fetcher::PageSource,
    listing::{book_id_from_link, parse_listing},
    SiteUrls, BOOKS_PER_PAGE,
};
use crate::errors::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagCrawlReport {
    pub tags: usize,
    pub pages: usize,
    pub books_created: usize,
    pub relations_added: usize,
    pub malformed_links: usize,
    pub fetch_failures: usize,
    pub store_failures: usize,
}

/// Walks the listing pages of the stored tags and records every book seen
/// there along with its tag.
pub struct TagPageCrawler<'a, S: PageSource> {
    source: &'a S,
    urls: &'a SiteUrls,
    tags: TagRepository,
    books: BookRepository,
    book_tags: BookTagRepository,
    delay: DelayRange,
}

impl<'a, S: PageSource> TagPageCrawler<'a, S> {
    pub fn new(source: &'a S, urls: &'a SiteUrls, db: &DbConfig, delay: DelayRange) -> Self {
        Self {
            source,
            urls,
            tags: TagRepository::new(db.clone()),
            books: BookRepository::new(db.clone()),
            book_tags: BookTagRepository::new(db.clone()),
            delay,
        }
    }

    /// Crawls the first `max_tags` tags, stopping each one once
    /// `max_books_per_tag` books were seen or its pages run out.
    pub async fn run(&self, max_tags: usize, max_books_per_tag: usize) -> Result<TagCrawlReport> {
        let tags = self.tags.get_tags(Some(max_tags))?;
        let mut report = TagCrawlReport::default();

        if tags.is_empty() {
            warn!("No tags stored, run discover-tags first");
            return Ok(report);
        }

        for (i, tag) in tags.iter().enumerate() {
            if i > 0 {
                self.delay.wait().await;
            }
            info!("Crawling tag '{}' ({}/{})", tag, i + 1, tags.len());
            let seen = self.crawl_tag(tag, max_books_per_tag, &mut report).await;
            debug!("Tag '{}' done with {} books", tag, seen);
            report.tags += 1;
        }

        Ok(report)
    }

    async fn crawl_tag(&self, tag: &str, max_books: usize, report: &mut TagCrawlReport) -> usize {
        let mut processed = 0;
        let mut offset = 0;

        while processed < max_books {
            if offset > 0 {
                self.delay.wait().await;
            }

            let url = self.urls.tag_page(tag, offset);
            let Some(html) = self.source.fetch(&url).await else {
                warn!("Could not fetch {}, leaving tag '{}'", url, tag);
                report.fetch_failures += 1;
                break;
            };
            report.pages += 1;

            let items = match parse_listing(&html) {
                Some(items) if !items.is_empty() => items,
                _ => {
                    debug!("No more listings for '{}' at offset {}", tag, offset);
                    break;
                }
            };

            let mut ids = Vec::with_capacity(items.len());
            for item in &items {
                match item.link.as_deref().and_then(book_id_from_link) {
                    Some(id) => ids.push(id),
                    None => {
                        warn!("Skipping listing entry with malformed link {:?} on {}", item.link, url);
                        report.malformed_links += 1;
                    }
                }
            }

            processed += ids.len();
            self.persist_page(tag, &ids, report);
            offset += BOOKS_PER_PAGE;
        }

        processed
    }

    /// Books first so the relations always have their parent row
    fn persist_page(&self, tag: &str, ids: &[i64], report: &mut TagCrawlReport) {
        if ids.is_empty() {
            return;
        }

        match self.books.ensure_books_exist(ids.iter().copied()) {
            Ok(created) => report.books_created += created,
            Err(e) => {
                error!("Could not store books of tag '{}': {}", tag, e);
                report.store_failures += 1;
                return;
            }
        }

        let relations: Vec<(i64, String)> = ids.iter().map(|id| (*id, tag.to_string())).collect();
        match self.book_tags.add_relations(&relations) {
            Ok(added) => report.relations_added += added,
            Err(e) => {
                error!("Could not link books to tag '{}': {}", tag, e);
                report.store_failures += 1;
            }
        }
    }
}
