use anyhow::{Context, Result};
use clap::Parser;
use evidex_core::{corpus, persist};
use evidex_crawler::extract::HtmlExtractor;
use evidex_crawler::fetcher::{FetchConfig, Fetcher};
use evidex_crawler::frontier::{CrawlConfig, Crawler};
use regex::Regex;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Crawl a news site into a JSON corpus snapshot")]
struct Cli {
    /// Seed URL to start from
    #[arg(long)]
    seed: String,
    /// Source label stored on every document
    #[arg(long)]
    source: String,
    /// Output corpus file (merged by url on repeated runs)
    #[arg(long, default_value = "./data/corpus.json")]
    output: String,
    /// Regex a URL must match to be followed and treated as an article
    #[arg(long, default_value = r"/news/\d+")]
    article_pattern: String,
    /// Maximum link depth from the seed
    #[arg(long, default_value_t = 2)]
    max_depth: u32,
    /// Stop after this many accepted documents
    #[arg(long, default_value_t = 200)]
    max_pages: usize,
    /// Concurrent fetch workers
    #[arg(long, default_value_t = 10)]
    concurrency: usize,
    /// Per-request timeout seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    /// Fetch attempts per URL
    #[arg(long, default_value_t = 3)]
    retries: u32,
    /// Exponential backoff base in seconds
    #[arg(long, default_value_t = 1.5)]
    backoff_base: f64,
    /// Minimum article body length in characters
    #[arg(long, default_value_t = 500)]
    min_content_chars: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let seed = Url::parse(&args.seed)
        .or_else(|_| Url::parse(&format!("https://{}", args.seed)))
        .context("invalid seed url")?;
    let pattern = Regex::new(&args.article_pattern).context("invalid article pattern")?;

    let output = Path::new(&args.output);
    let existing = corpus::load_file_or_empty(output)?;
    let first_id = corpus::next_id(&existing);
    tracing::info!(
        seed = %seed,
        existing = existing.len(),
        first_id,
        max_depth = args.max_depth,
        max_pages = args.max_pages,
        concurrency = args.concurrency,
        "starting crawl"
    );

    let fetcher = Fetcher::new(FetchConfig {
        timeout: Duration::from_secs(args.timeout_secs),
        retries: args.retries,
        backoff_base: args.backoff_base,
        ..FetchConfig::default()
    })?;
    let extractor = HtmlExtractor::new(pattern, args.min_content_chars);
    let crawler = Crawler::new(
        fetcher,
        extractor,
        CrawlConfig {
            max_depth: args.max_depth,
            max_pages: args.max_pages,
            concurrency: args.concurrency,
            source: args.source,
        },
    );

    let outcome = crawler.crawl(&seed, first_id).await;
    let merged = corpus::merge(existing, outcome.documents);
    persist::save_json(output, &merged)?;
    tracing::info!(
        total = merged.len(),
        visited = outcome.visited,
        output = %args.output,
        "corpus saved"
    );
    Ok(())
}
