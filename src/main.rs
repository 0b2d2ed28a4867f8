use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::crawler::{CommentCrawler, CommentTarget, DetailCrawler, TagDiscoveryCrawler, TagPageCrawler};
use crate::database::DbConfig;
use crate::douban::{fetcher::HttpFetcher, SiteUrls};

mod config;
mod crawler;
mod database;
mod douban;
mod errors;
mod logging;
mod normalizer;

#[derive(Parser, Debug)]
#[command(name = "bookcrawl")]
#[command(about = "Crawls book listings, details and comments into SQLite")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ~/.bookcrawl/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite file, overrides the configured one
    #[arg(long)]
    db: Option<String>,

    /// Log debug output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a sample configuration file
    InitConfig,

    /// Store the tags listed on the site's tag index
    DiscoverTags,

    /// Record the books listed under the stored tags
    CrawlTags {
        /// Number of tags to walk
        #[arg(long, default_value = "6")]
        max_tags: usize,

        /// Books to collect per tag
        #[arg(long, default_value = "30")]
        max_books: usize,
    },

    /// Fill stored books in from their detail pages
    CrawlDetails {
        /// Books to update, lowest ids first
        #[arg(long, default_value = "100")]
        limit: usize,
    },

    /// Collect comments of one book or of the most rated ones
    CrawlComments {
        /// Single book to crawl
        #[arg(long)]
        book_id: Option<i64>,

        /// Books to crawl when no id is given
        #[arg(long, default_value = "30")]
        max_books: usize,

        /// Comments per book
        #[arg(long, default_value = "30")]
        max_comments: usize,

        /// Store the comments instead of printing them
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    logging::subscriber(logging::default_filter(args.verbose), std::io::stderr).init();

    if let Commands::InitConfig = args.command {
        Config::create_sample(args.config.as_deref())?;
        return Ok(());
    }

    let config = Config::load(args.config.as_deref())?;
    let db_path = args.db.as_deref().or(config.database.path.as_deref());
    let db = DbConfig::from_custom_or_default(db_path)?;
    database::init(&db.open()?)?;
    info!("Using database {}", db.path.display());

    let urls = SiteUrls::new(&config.site.base_url)?;
    let fetcher = HttpFetcher::new(config.fetch.clone())?;
    let delays = &config.politeness;

    match args.command {
        Commands::InitConfig => {}
        Commands::DiscoverTags => {
            let report = TagDiscoveryCrawler::new(&fetcher, &urls, &db).run().await?;
            info!(
                "Tag discovery done: {} categories, {} tags seen, {} new",
                report.categories, report.tags_seen, report.tags_added
            );
        }
        Commands::CrawlTags { max_tags, max_books } => {
            let report = TagPageCrawler::new(&fetcher, &urls, &db, delays.tag_page)
                .run(max_tags, max_books)
                .await?;
            info!(
                "Tag crawl done: {} tags, {} pages, {} new books, {} new relations, {} malformed links, {} fetch failures, {} store failures",
                report.tags,
                report.pages,
                report.books_created,
                report.relations_added,
                report.malformed_links,
                report.fetch_failures,
                report.store_failures
            );
        }
        Commands::CrawlDetails { limit } => {
            let report = DetailCrawler::new(&fetcher, &urls, &db, delays.detail)
                .run(limit)
                .await?;
            info!(
                "Detail crawl done: {}/{} updated, {} fetch failures, {} parse failures, {} store failures",
                report.updated,
                report.attempted,
                report.fetch_failures,
                report.parse_failures,
                report.store_failures
            );
        }
        Commands::CrawlComments { book_id, max_books, max_comments, save } => {
            let target = match book_id {
                Some(id) => CommentTarget::Book(id),
                None => CommentTarget::TopRated { max_books },
            };
            let report = CommentCrawler::new(&fetcher, &urls, &db, delays.comment)
                .run(target, max_comments, save, &mut std::io::stdout())
                .await?;
            info!(
                "Comment crawl done: {} books, {} pages, {} comments found, {} saved, {} fetch failures, {} store failures",
                report.books,
                report.pages,
                report.comments_found,
                report.comments_saved,
                report.fetch_failures,
                report.store_failures
            );
        }
    }

    Ok(())
}
