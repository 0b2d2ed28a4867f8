pub mod comments;
pub mod details;
pub mod tag_discovery;
pub mod tag_pages;

pub use comments::{CommentCrawler, CommentTarget};
pub use details::DetailCrawler;
pub use tag_discovery::TagDiscoveryCrawler;
pub use tag_pages::TagPageCrawler;

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use crate::douban::fetcher::PageSource;

    /// In-memory site: known urls answer with their page, anything else is a
    /// failed fetch. Every requested url is recorded.
    #[derive(Default)]
    pub struct FakeSite {
        pages: HashMap<String, String>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeSite {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
            self.pages.insert(url.into(), html.into());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl PageSource for FakeSite {
        async fn fetch(&self, url: &str) -> Option<String> {
            self.calls.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned()
        }
    }

    /// Tag listing page with one entry per link
    pub fn listing_page(links: &[&str]) -> String {
        let items: String = links
            .iter()
            .map(|href| {
                format!(
                    r#"<li class="subject-item"><div class="info"><h2><a href="{href}">书</a></h2></div></li>"#
                )
            })
            .collect();
        format!(r#"<html><body><ul class="subject-list">{items}</ul></body></html>"#)
    }
}
