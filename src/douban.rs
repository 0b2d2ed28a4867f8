use std::sync::LazyLock;

use reqwest::Url;
use scraper::Selector;

use crate::errors::{CrawlError, Result};

pub mod comments;
pub mod detail;
pub mod fetcher;
pub mod listing;
pub mod tag_index;
pub mod types;

/// Books shown per tag listing page
pub const BOOKS_PER_PAGE: usize = 20;
/// Comments shown per comment page
pub const COMMENTS_PER_PAGE: usize = 20;

/// URL templates of the catalogue site
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| CrawlError::Generic(format!("Invalid base url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(CrawlError::Generic(format!("Invalid base url '{base_url}'")));
        }
        Ok(Self { base })
    }

    fn with_path(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Page listing every tag grouped by main category
    pub fn tag_index(&self) -> String {
        let mut url = self.with_path(&["tag", ""]);
        url.query_pairs_mut()
            .append_pair("view", "type")
            .append_pair("icn", "index-sorttags-all");
        url.to_string()
    }

    pub fn tag_page(&self, tag: &str, offset: usize) -> String {
        let mut url = self.with_path(&["tag", tag]);
        url.query_pairs_mut().append_pair("start", &offset.to_string());
        url.to_string()
    }

    pub fn detail(&self, book_id: i64) -> String {
        self.with_path(&["subject", &book_id.to_string(), ""]).to_string()
    }

    pub fn comments(&self, book_id: i64, offset: usize) -> String {
        let mut url = self.with_path(&["subject", &book_id.to_string(), "comments", ""]);
        url.query_pairs_mut()
            .append_pair("start", &offset.to_string())
            .append_pair("limit", &COMMENTS_PER_PAGE.to_string())
            .append_pair("status", "P")
            .append_pair("sort", "score");
        url.to_string()
    }
}

/// Compiled CSS selectors for the site's markup
pub(crate) struct SiteSelectors {
    pub tag_area: Selector,
    pub h2: Selector,
    pub tag_links: Selector,
    pub subject_list: Selector,
    pub subject_item: Selector,
    pub item_link: Selector,
    pub info: Selector,
    pub label: Selector,
    pub title: Selector,
    pub cover: Selector,
    pub rating_block: Selector,
    pub rating_num: Selector,
    pub rating_people: Selector,
    /// `stars[0]` is the five-star row, `stars[4]` the one-star row
    pub stars: [Selector; 5],
    pub comment_item: Selector,
    pub comment_info: Selector,
    pub comment_user: Selector,
    pub comment_content: Selector,
    pub comment_rating: Selector,
    pub vote_count: Selector,
    pub comment_time: Selector,
}

fn css(s: &str) -> Selector {
    Selector::parse(s).unwrap_or_else(|e| panic!("invalid selector {s}: {e:?}"))
}

impl SiteSelectors {
    pub fn get() -> &'static SiteSelectors {
        static SELECTORS: LazyLock<SiteSelectors> = LazyLock::new(|| SiteSelectors {
            tag_area: css("#content > div > div.article > div:nth-child(2)"),
            h2: css("h2"),
            tag_links: css("table.tagCol td > a"),
            subject_list: css("ul.subject-list"),
            subject_item: css("li.subject-item"),
            item_link: css("h2 > a"),
            info: css("#info"),
            label: css("span.pl"),
            title: css("h1 > span"),
            cover: css("#mainpic .nbg > img"),
            rating_block: css("#interest_sectl"),
            rating_num: css("strong.rating_num"),
            rating_people: css(".rating_people span"),
            stars: [5, 4, 3, 2, 1].map(|n| css(&format!(".stars{n} ~ .rating_per"))),
            comment_item: css(".comment-item"),
            comment_info: css(".comment-info"),
            comment_user: css(".comment-info a"),
            comment_content: css(".comment-content"),
            comment_rating: css(".rating"),
            vote_count: css(".vote-count"),
            comment_time: css(".comment-time"),
        });
        &SELECTORS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> SiteUrls {
        SiteUrls::new("https://book.douban.com").unwrap()
    }

    #[test]
    fn test_tag_page_url_is_encoded() {
        assert_eq!(
            urls().tag_page("科幻", 20),
            "https://book.douban.com/tag/%E7%A7%91%E5%B9%BB?start=20"
        );
        assert_eq!(urls().tag_page("C#", 0), "https://book.douban.com/tag/C%23?start=0");
    }

    #[test]
    fn test_detail_and_comment_urls() {
        assert_eq!(urls().detail(1007305), "https://book.douban.com/subject/1007305/");
        assert_eq!(
            urls().comments(1007305, 40),
            "https://book.douban.com/subject/1007305/comments/?start=40&limit=20&status=P&sort=score"
        );
    }

    #[test]
    fn test_tag_index_url() {
        assert_eq!(
            urls().tag_index(),
            "https://book.douban.com/tag/?view=type&icn=index-sorttags-all"
        );
    }

    #[test]
    fn test_invalid_base() {
        assert!(SiteUrls::new("not a url").is_err());
        assert!(SiteUrls::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_selectors_compile() {
        let _ = SiteSelectors::get();
    }
}
