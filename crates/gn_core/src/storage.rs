use async_trait::async_trait;
use crate::types::{EnrichedArticle, StoredArticle};
use crate::Result;

/// A store of article records that hands out short-lived sessions.
#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Returns the backend name, for logging
    fn name(&self) -> &str;

    /// Opens a new connection to the store
    async fn connect(&self) -> Result<Box<dyn StorageSession>>;
}

/// One open connection. Dropping it releases the connection.
#[async_trait]
pub trait StorageSession: Send {
    /// Find the record stored under `url`, if any
    async fn find_by_url(&mut self, url: &str) -> Result<Option<StoredArticle>>;

    /// Insert a new record and return its store-assigned id
    async fn insert(&mut self, article: &EnrichedArticle) -> Result<i64>;

    /// Overwrite only the coordinate fields of an existing record
    async fn update_coordinates(&mut self, id: i64, lat: Option<f64>, lon: Option<f64>) -> Result<()>;

    /// Every stored record
    async fn find_all(&mut self) -> Result<Vec<StoredArticle>>;

    async fn close(self: Box<Self>) -> Result<()>;
}
