use chrono::NaiveDate;

/// Fields scraped from a book's detail page. `None` means "not found on the
/// page" and leaves the stored column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookDetails {
    pub title: Option<String>,
    pub img_src: Option<String>,
    /// Raw credit as printed, e.g. "[法] 阿尔贝·加缪"; resolved to an author id on write
    pub author_name: Option<String>,
    pub publisher: Option<String>,
    pub producer: Option<String>,
    pub original_title: Option<String>,
    pub translator: Option<String>,
    pub publication_year: Option<NaiveDate>,
    pub page_count: Option<i64>,
    pub price: Option<f64>,
    pub binding: Option<String>,
    pub series: Option<String>,
    pub isbn: Option<String>,
    pub rating: Option<f64>,
    pub rating_sum: Option<i64>,
    pub stars5_starstop: Option<f64>,
    pub stars4_starstop: Option<f64>,
    pub stars3_starstop: Option<f64>,
    pub stars2_starstop: Option<f64>,
    pub stars1_starstop: Option<f64>,
}

/// One entry of a comment listing, before star/time coercion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedComment {
    pub book_id: i64,
    pub user_link: Option<String>,
    pub comment_file: Option<String>,
    /// 1..=5 when the page carried a usable `allstarNN` class
    pub comment_star: Option<i64>,
    pub useful: Option<i64>,
    /// Raw timestamp text, e.g. "2023-05-01 12:30:00"
    pub comment_time: Option<String>,
    pub comment_place: Option<String>,
}

impl ParsedComment {
    pub fn is_empty(&self) -> bool {
        self.user_link.is_none()
            && self.comment_file.is_none()
            && self.comment_star.is_none()
            && self.useful.is_none()
            && self.comment_time.is_none()
            && self.comment_place.is_none()
    }
}

/// One book entry on a tag listing page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingItem {
    /// `href` of the entry's title link, if it had one
    pub link: Option<String>,
}

/// A main category of the tag index and the tags filed under it
#[derive(Debug, Clone, PartialEq)]
pub struct TagCategory {
    pub main_tag: String,
    pub tags: Vec<String>,
}
