use std::fmt;

use async_trait::async_trait;
use gn_core::{ArticleSource, Error, HarvestConfig, RawArticle, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

#[derive(Deserialize)]
struct SearchResponse {
    response: SearchResults,
}

#[derive(Deserialize)]
struct SearchResults {
    #[serde(default)]
    docs: Vec<serde_json::Value>,
}

/// Converts each doc on its own so one malformed doc costs only itself.
fn decode_docs(docs: Vec<serde_json::Value>, page: u32) -> Vec<RawArticle> {
    docs.into_iter()
        .enumerate()
        .filter_map(|(i, doc)| match serde_json::from_value::<RawArticle>(doc) {
            Ok(article) => Some(article),
            Err(e) => {
                tracing::warn!("⚠️ Skipping malformed article {} on page {}: {}", i, page, e);
                None
            }
        })
        .collect()
}

/// Client for the paginated article search API.
pub struct ArticleSearchClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl fmt::Debug for ArticleSearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleSearchClient")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ArticleSearchClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &HarvestConfig) -> Result<Self> {
        Self::new(&config.search_url, config.api_key.clone())
    }

    fn page_url(&self, query: &str, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("fq", query)
            .append_pair("api-key", &self.api_key)
            .append_pair("page", &page.to_string());
        url
    }
}

#[async_trait]
impl ArticleSource for ArticleSearchClient {
    fn name(&self) -> &str {
        "article search"
    }

    async fn try_fetch_page(&self, query: &str, page: u32) -> Result<Vec<RawArticle>> {
        tracing::info!("📰 Fetching articles from page {}...", page);
        let response = self
            .client
            .get(self.page_url(query, page))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let results: SearchResponse = serde_json::from_str(&body)?;
        let articles = decode_docs(results.response.docs, page);
        tracing::info!("✨ Fetched {} articles from page {}.", articles.len(), page);
        Ok(articles)
    }
}
