use async_trait::async_trait;
use crate::types::RawArticle;
use crate::Result;

#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Returns the name of the article source
    fn name(&self) -> &str;

    /// Fetches one page of search results, reporting failures as errors
    async fn try_fetch_page(&self, query: &str, page: u32) -> Result<Vec<RawArticle>>;

    /// Fetches one page of search results.
    ///
    /// A failed call is logged and reported as an empty page, so callers see
    /// it exactly like the end of the result set.
    async fn fetch_page(&self, query: &str, page: u32) -> Vec<RawArticle> {
        match self.try_fetch_page(query, page).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::error!("❌ Error fetching articles from page {}: {}", page, e);
                Vec::new()
            }
        }
    }
}
