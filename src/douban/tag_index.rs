use scraper::{ElementRef, Html};

use super::{types::TagCategory, SiteSelectors};

/// Categories of the "all tags" page. Empty when the page layout is not recognized.
pub fn parse_tag_index(html: &str) -> Vec<TagCategory> {
    let document = Html::parse_document(html);
    let s = SiteSelectors::get();

    let Some(area) = document.select(&s.tag_area).next() else {
        return Vec::new();
    };

    area.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "div")
        .filter_map(|category| {
            let heading = category.select(&s.h2).next()?;
            // Headings look like "文学 · · · · · ·"
            let main_tag = heading
                .text()
                .collect::<String>()
                .split('·')
                .next()
                .unwrap_or("")
                .trim()
                .to_string();

            let tags: Vec<String> = category
                .select(&s.tag_links)
                .map(|a| a.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();

            (!main_tag.is_empty() && !tags.is_empty()).then_some(TagCategory { main_tag, tags })
        })
        .collect()
}
