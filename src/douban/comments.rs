use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{types::ParsedComment, SiteSelectors};

static PLACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.+?)\)").expect("place pattern"));

/// Star rating from a class token: the site encodes stars x10, "allstar45" -> 4
pub fn star_from_class(class: &str) -> Option<i64> {
    let digits = class.strip_prefix("allstar")?;
    digits.parse::<i64>().ok().map(|n| n / 10)
}

fn comment_from_item(item: ElementRef, book_id: i64) -> ParsedComment {
    let s = SiteSelectors::get();
    let first = |sel: &'static Selector| item.select(sel).next();

    let comment_star = first(&s.comment_rating).and_then(|el| {
        el.value().classes().find_map(star_from_class)
    });

    let useful = first(&s.vote_count).map(|el| {
        el.text()
            .collect::<String>()
            .trim()
            .parse::<i64>()
            .unwrap_or(0)
    });

    // The title attribute carries seconds, the visible text may not
    let comment_time = first(&s.comment_time).and_then(|el| {
        el.value()
            .attr("title")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| {
                let text = el.text().collect::<String>().trim().to_string();
                (!text.is_empty()).then_some(text)
            })
    });

    let comment_place = first(&s.comment_info).and_then(|el| {
        let text = el.text().collect::<String>();
        PLACE
            .captures(&text)
            .map(|caps| caps[1].trim().to_string())
    });

    ParsedComment {
        book_id,
        user_link: first(&s.comment_user)
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.to_string()),
        comment_file: first(&s.comment_content)
            .map(|el| el.text().collect::<String>().trim().to_string()),
        comment_star,
        useful,
        comment_time,
        comment_place,
    }
}

/// Comments on one page of a book's comment listing. Items carrying none of
/// the expected fields are dropped.
pub fn parse_comments(html: &str, book_id: i64) -> Vec<ParsedComment> {
    let document = Html::parse_document(html);
    let s = SiteSelectors::get();

    document
        .select(&s.comment_item)
        .map(|item| comment_from_item(item, book_id))
        .filter(|c| !c.is_empty())
        .collect()
}
