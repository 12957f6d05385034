//! Crawl driver: listing pages → parser → record sink.
//!
//! Pages are visited strictly in order. Page 1 is fetched first and its side panel
//! tells how many pages exist; that number is read once and never refreshed, even if
//! later pages report a different item count.

use crate::config::AppConfig;
use crate::error::Result;
use crate::scraper::{HttpClient, ListingParser, PageSource};
use crate::storage::{CsvSink, RecordSink};
use anyhow::Context;
use scraper::Html;
use tracing::{debug, info};
use url::Url;

// ── Listing URLs ──────────────────────────────────────────────────────────────

/// Base listing URL. Page 1 is the configured URL as written; page n is `{base}page/{n}`.
#[derive(Debug, Clone)]
pub struct ListingUrl(String);

impl ListingUrl {
    /// Validate `base` and make sure it ends with `/` so `page/{n}` lands as a new segment.
    pub fn parse(base: &str) -> anyhow::Result<Self> {
        Url::parse(base).with_context(|| format!("Invalid listing URL {:?}", base))?;
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self(base))
    }

    pub fn page(&self, page: u32) -> String {
        if page <= 1 {
            self.0.clone()
        } else {
            format!("{}page/{}", self.0, page)
        }
    }
}

// ── Crawl state ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// On page 1, page count not known yet.
    Priming,
    Paging,
    Done,
}

#[derive(Debug, Clone)]
pub struct CrawlState {
    current_page: u32,
    total_pages: u32,
}

impl Default for CrawlState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
        }
    }
}

impl CrawlState {
    pub fn phase(&self) -> CrawlPhase {
        if self.current_page > self.total_pages {
            CrawlPhase::Done
        } else if self.current_page == 1 {
            CrawlPhase::Priming
        } else {
            CrawlPhase::Paging
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Mark the current page processed. `discovered` is only honoured on page 1.
    pub fn advance(&mut self, discovered: Option<u32>) {
        if self.current_page == 1 {
            if let Some(total) = discovered {
                self.total_pages = total;
            }
        }
        self.current_page += 1;
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_fetched: u32,
    pub total_pages: u32,
    pub records_written: usize,
    pub out_of_stock: usize,
    pub promos: usize,
}

/// Walk every listing page and append each record to `sink` in page, then card, order.
/// The first error aborts the crawl. A card that fails to extract drops its whole page;
/// page 1's records are written before its page count is read.
pub async fn crawl<S, W>(
    source: &S,
    parser: &ListingParser,
    listing: &ListingUrl,
    sink: &mut W,
) -> Result<CrawlStats>
where
    S: PageSource + ?Sized,
    W: RecordSink + ?Sized,
{
    let mut state = CrawlState::default();
    let mut stats = CrawlStats::default();

    while state.phase() != CrawlPhase::Done {
        let page = state.current_page();
        let url = listing.page(page);
        info!("Fetching listing page {} ({})", page, url);

        let html = source.fetch_page(&url).await?;
        let discovered = process_page(parser, &html, state.phase(), sink, &mut stats)?;

        if let Some(total) = discovered {
            info!("Listing has {} pages", total);
        }
        state.advance(discovered);
        debug!("  Page {}/{} done", page, state.total_pages());
    }

    stats.total_pages = state.total_pages();
    Ok(stats)
}

/// Extract and flush one page. On the priming page, the page count is read afterwards.
fn process_page<W>(
    parser: &ListingParser,
    html: &str,
    phase: CrawlPhase,
    sink: &mut W,
    stats: &mut CrawlStats,
) -> Result<Option<u32>>
where
    W: RecordSink + ?Sized,
{
    let doc = Html::parse_document(html);

    let records = parser.records(&doc)?;
    for record in &records {
        sink.append(record)?;
        stats.records_written += 1;
        stats.out_of_stock += usize::from(record.is_out_of_stock());
        stats.promos += usize::from(record.has_promo());
    }
    stats.pages_fetched += 1;

    if phase == CrawlPhase::Priming {
        parser.total_pages(&doc).map(Some)
    } else {
        Ok(None)
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> anyhow::Result<CrawlStats> {
        let listing = ListingUrl::parse(&self.config.scraper.base_url)?;
        let parser = ListingParser::new(&self.config.scraper).context("Failed to build parser")?;
        let client = HttpClient::new(&self.config.scraper).context("Failed to build scraper")?;
        let mut sink = CsvSink::create(&self.config.output.csv_path)
            .with_context(|| format!("Failed to create {:?}", self.config.output.csv_path))?;

        let stats = crawl(&client, &parser, &listing, &mut sink)
            .await
            .context("Crawl aborted")?;

        info!(
            "=== Done: {} pages | {} records | {} promo | {} out of stock ===",
            stats.pages_fetched, stats.records_written, stats.promos, stats.out_of_stock
        );
        Ok(stats)
    }
}
