use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html};

use super::{types::BookDetails, SiteSelectors};
use crate::errors::{CrawlError, Result};

static FIRST_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("int pattern"));
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9.]+").expect("number pattern"));
static PUBLICATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})[^0-9]?([0-9]{1,2})?").expect("date pattern"));

/// First run of digits, e.g. "125页" -> 125
pub fn first_int(s: &str) -> Option<i64> {
    FIRST_INT.find(s)?.as_str().parse().ok()
}

/// First run of digits and dots, e.g. "CNY 22.00" -> 22.0
pub fn first_number(s: &str) -> Option<f64> {
    FIRST_NUMBER.find(s)?.as_str().parse().ok()
}

/// "56.4%" -> 56.4
pub fn parse_percent(s: &str) -> Option<f64> {
    s.trim().trim_end_matches('%').trim().parse().ok()
}

/// Free-form publication date to the first day of its month, or of its year
/// when no month is given. "2010-8" -> 2010-08-01, "2010" -> 2010-01-01.
pub fn parse_publication_date(s: &str) -> Option<NaiveDate> {
    let caps = PUBLICATION.captures(s.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let month = caps
        .get(2)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
        .unwrap_or(1);
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn find_label<'a>(info: ElementRef<'a>, label: &str) -> Option<ElementRef<'a>> {
    let s = SiteSelectors::get();
    info.select(&s.label)
        .find(|el| el.text().collect::<String>().contains(label))
}

/// Text node right after a label span, e.g. `<span class="pl">页数:</span> 125`
fn text_after_label(info: ElementRef, label: &str) -> Option<String> {
    let node = find_label(info, label)?.next_sibling()?;
    let text = node.value().as_text()?;
    non_empty(text.trim().to_string())
}

/// First link following a label span, e.g. `<span class="pl">出版社:</span> <a>…</a>`
fn link_after_label(info: ElementRef, label: &str) -> Option<String> {
    let el = find_label(info, label)?;
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sib| sib.value().name() == "a")
        .and_then(|a| non_empty(element_text(a)))
}

/// Extracts a book's fields from its detail page. Fails only when the page
/// lacks the `#info` block or the title; a single unreadable field is left
/// empty instead.
pub fn parse_book_detail(html: &str) -> Result<BookDetails> {
    let document = Html::parse_document(html);
    let s = SiteSelectors::get();

    let info = document
        .select(&s.info)
        .next()
        .ok_or_else(|| CrawlError::Parse("no #info block".to_string()))?;

    let title = document
        .select(&s.title)
        .next()
        .map(element_text)
        .ok_or_else(|| CrawlError::Parse("no title".to_string()))?;

    let mut book = BookDetails {
        title: Some(title),
        img_src: document
            .select(&s.cover)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| src.to_string()),
        author_name: link_after_label(info, "作者"),
        publisher: link_after_label(info, "出版社"),
        producer: link_after_label(info, "出品方"),
        original_title: text_after_label(info, "原作名"),
        translator: link_after_label(info, "译者"),
        publication_year: text_after_label(info, "出版年")
            .as_deref()
            .and_then(parse_publication_date),
        page_count: text_after_label(info, "页数").as_deref().and_then(first_int),
        price: text_after_label(info, "定价").as_deref().and_then(first_number),
        binding: text_after_label(info, "装帧"),
        series: link_after_label(info, "丛书"),
        isbn: text_after_label(info, "ISBN"),
        ..Default::default()
    };

    if let Some(block) = document.select(&s.rating_block).next() {
        book.rating = block
            .select(&s.rating_num)
            .next()
            .and_then(|el| element_text(el).parse().ok());
        book.rating_sum = block
            .select(&s.rating_people)
            .next()
            .and_then(|el| first_int(&element_text(el)));

        let stars: Vec<Option<f64>> = s
            .stars
            .iter()
            .map(|sel| block.select(sel).next().and_then(|el| parse_percent(&element_text(el))))
            .collect();
        book.stars5_starstop = stars[0];
        book.stars4_starstop = stars[1];
        book.stars3_starstop = stars[2];
        book.stars2_starstop = stars[3];
        book.stars1_starstop = stars[4];
    }

    Ok(book)
}
