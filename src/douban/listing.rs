use scraper::Html;

use super::{types::ListingItem, SiteSelectors};

/// Entries of a tag listing page. `None` when the page has no listing at all,
/// which the site serves past the last page.
pub fn parse_listing(html: &str) -> Option<Vec<ListingItem>> {
    let document = Html::parse_document(html);
    let s = SiteSelectors::get();

    let list = document.select(&s.subject_list).next()?;
    let items = list
        .select(&s.subject_item)
        .map(|item| ListingItem {
            link: item
                .select(&s.item_link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| href.to_string()),
        })
        .collect();
    Some(items)
}

/// Book id from a detail link such as "https://book.douban.com/subject/1007305/"
pub fn book_id_from_link(link: &str) -> Option<i64> {
    let mut segments = link.split('/');
    segments.find(|s| *s == "subject")?;
    segments
        .next()
        .and_then(|id| id.parse::<i64>().ok())
        .filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_id_from_link() {
        assert_eq!(book_id_from_link("https://book.douban.com/subject/1007305/"), Some(1007305));
        assert_eq!(book_id_from_link("https://book.douban.com/subject/1007305"), Some(1007305));
        assert_eq!(book_id_from_link("/subject/42/?from=tag"), Some(42));
    }

    #[test]
    fn test_malformed_links() {
        assert_eq!(book_id_from_link("https://book.douban.com/subject/abc/"), None);
        assert_eq!(book_id_from_link("https://book.douban.com/subject/"), None);
        assert_eq!(book_id_from_link("https://book.douban.com/people/1007305/"), None);
        assert_eq!(book_id_from_link("https://book.douban.com/subject/-3/"), None);
        assert_eq!(book_id_from_link(""), None);
    }

    #[test]
    fn test_listing_items() {
        let html = r#"
            <div id="subject_list"><ul class="subject-list">
              <li class="subject-item"><div class="info"><h2><a href="https://book.douban.com/subject/1/" title="A">A</a></h2></div></li>
              <li class="subject-item"><div class="info"><h2>No link</h2></div></li>
              <li class="subject-item"><div class="info"><h2><a href="https://book.douban.com/subject/x/">B</a></h2></div></li>
            </ul></div>"#;
        let items = parse_listing(html).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].link.as_deref(), Some("https://book.douban.com/subject/1/"));
        assert_eq!(items[1].link, None);
        assert_eq!(items.iter().filter_map(|i| i.link.as_deref().and_then(book_id_from_link)).count(), 1);
    }

    #[test]
    fn test_missing_or_empty_listing() {
        assert_eq!(parse_listing("<html><body><p>没有找到符合条件的图书</p></body></html>"), None);
        assert_eq!(parse_listing(r#"<ul class="subject-list"></ul>"#), Some(vec![]));
    }
}
