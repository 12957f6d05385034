use crate::config::ScraperConfig;
use crate::error::Result;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::debug;

use super::PageSource;

/// One HTTP session per crawl: headers are fixed at construction and cookies persist
/// between requests.
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> anyhow::Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(session_headers(config)?)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { inner })
    }

    /// GET a URL and return the body as text. The status code is not checked.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let resp = self.inner.get(url).send().await?;
        debug!("{} → {}", url, resp.status());
        Ok(resp.text().await?)
    }
}

fn session_headers(config: &ScraperConfig) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name {:?}", name))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {}", name))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.get_text(url).await
    }
}
