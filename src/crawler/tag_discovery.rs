use tracing::{info, warn};

use crate::database::{DbConfig, TagRepository};
use crate::douban::{fetcher::PageSource, tag_index::parse_tag_index, SiteUrls};
use crate::errors::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagDiscoveryReport {
    pub categories: usize,
    pub tags_seen: usize,
    pub tags_added: usize,
}

/// Seeds the tag table from the site's tag index
pub struct TagDiscoveryCrawler<'a, S: PageSource> {
    source: &'a S,
    urls: &'a SiteUrls,
    tags: TagRepository,
}

impl<'a, S: PageSource> TagDiscoveryCrawler<'a, S> {
    pub fn new(source: &'a S, urls: &'a SiteUrls, db: &DbConfig) -> Self {
        Self {
            source,
            urls,
            tags: TagRepository::new(db.clone()),
        }
    }

    pub async fn run(&self) -> Result<TagDiscoveryReport> {
        let mut report = TagDiscoveryReport::default();
        let url = self.urls.tag_index();

        let Some(html) = self.source.fetch(&url).await else {
            warn!("Tag index unavailable, no tags discovered");
            return Ok(report);
        };

        let categories = parse_tag_index(&html);
        if categories.is_empty() {
            warn!("No tag categories found on {}", url);
            return Ok(report);
        }

        // Tags may be filed under several categories; the first one wins
        let mut known = self.tags.existing_tags()?;
        let mut new_tags = Vec::new();
        for category in &categories {
            report.tags_seen += category.tags.len();
            for tag in &category.tags {
                if known.insert(tag.clone()) {
                    new_tags.push((category.main_tag.clone(), tag.clone()));
                }
            }
        }

        report.categories = categories.len();
        report.tags_added = self.tags.add_new_tags(&new_tags)?;
        info!(
            "{} categories, {} new tags out of {}",
            report.categories, report.tags_added, report.tags_seen
        );
        Ok(report)
    }
}
