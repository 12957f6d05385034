pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::error::Result;
use async_trait::async_trait;

pub use self::http_client::HttpClient;
pub use self::parsers::ListingParser;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Where listing pages come from. The live crawl uses `HttpClient`.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}
