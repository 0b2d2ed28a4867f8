pub const DB_AUTHOR_NAME: &str = "author";
pub const DB_AUTHOR_COLS: &str = "author_id INTEGER PRIMARY KEY AUTOINCREMENT, \
    author_name TEXT NOT NULL, \
    nation TEXT NOT NULL, \
    UNIQUE (author_name, nation)";

pub const DB_BOOKS_NAME: &str = "cleaned_douban_books";
pub const DB_BOOKS_COLS: &str = "book_id INTEGER PRIMARY KEY, \
    title TEXT, \
    img_src TEXT, \
    author_id INTEGER, \
    publisher TEXT, \
    producer TEXT, \
    original_title TEXT, \
    translator TEXT, \
    publication_year TEXT, \
    page_count INTEGER, \
    price REAL, \
    binding TEXT, \
    series TEXT, \
    isbn TEXT, \
    rating REAL, \
    rating_sum INTEGER, \
    stars5_starstop REAL, \
    stars4_starstop REAL, \
    stars3_starstop REAL, \
    stars2_starstop REAL, \
    stars1_starstop REAL, \
    FOREIGN KEY (author_id) REFERENCES author(author_id)";

pub const DB_BOOK_TAG_NAME: &str = "book_tag";
pub const DB_BOOK_TAG_COLS: &str = "book_id INTEGER NOT NULL, \
    book_tag TEXT NOT NULL, \
    PRIMARY KEY (book_id, book_tag), \
    FOREIGN KEY (book_id) REFERENCES cleaned_douban_books(book_id) ON DELETE CASCADE";

// No natural key: re-crawling a book appends its comments again
pub const DB_COMMENTS_NAME: &str = "comments";
pub const DB_COMMENTS_COLS: &str = "comment_id INTEGER PRIMARY KEY AUTOINCREMENT, \
    book_id INTEGER NOT NULL, \
    user_link TEXT, \
    comment_file TEXT, \
    comment_star INTEGER NOT NULL, \
    useful INTEGER NOT NULL DEFAULT 0, \
    comment_time TEXT NOT NULL, \
    comment_place TEXT, \
    FOREIGN KEY (book_id) REFERENCES cleaned_douban_books(book_id) ON DELETE CASCADE";

pub const DB_TAGS_NAME: &str = "tags";
pub const DB_TAGS_COLS: &str = "main_tag TEXT NOT NULL, \
    tag TEXT NOT NULL UNIQUE";

pub const DB_COMMENTS_INDEX_BOOK_ID: &str =
    "CREATE INDEX IF NOT EXISTS idx_comments_book_id ON comments(book_id)";
pub const DB_BOOKS_INDEX_RATING_SUM: &str =
    "CREATE INDEX IF NOT EXISTS idx_books_rating_sum ON cleaned_douban_books(rating_sum)";
