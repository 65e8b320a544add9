use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gn_core::{ArticleStorage, EnrichedArticle, Error, Result, StorageSession, StoredArticle};
use tokio::sync::RwLock;

use crate::StorageBackend;

#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: i64,
    articles: Vec<StoredArticle>,
}

impl MemoryStore {
    pub fn find_by_url(&self, url: &str) -> Option<StoredArticle> {
        self.articles.iter().find(|a| a.url == url).cloned()
    }

    pub fn insert(&mut self, article: &EnrichedArticle) -> i64 {
        self.next_id += 1;
        self.articles.push(StoredArticle::from_enriched(self.next_id, article));
        self.next_id
    }

    pub fn update_coordinates(&mut self, id: i64, lat: Option<f64>, lon: Option<f64>) -> Result<()> {
        let article = self
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::Storage(format!("No article with id {}", id)))?;
        article.lat = lat;
        article.lon = lon;
        Ok(())
    }

    pub fn find_all(&self) -> Vec<StoredArticle> {
        self.articles.clone()
    }
}

/// Process-local store. Every session shares the same records.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
    open_sessions: Arc<AtomicUsize>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions that have been opened and not yet released
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored record
    pub async fn articles(&self) -> Vec<StoredArticle> {
        self.store.read().await.find_all()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn scheme() -> &'static str {
        "memory"
    }

    async fn open(_location: &str) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn connect(&self) -> Result<Box<dyn StorageSession>> {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            store: self.store.clone(),
            open_sessions: self.open_sessions.clone(),
        }))
    }
}

struct MemorySession {
    store: Arc<RwLock<MemoryStore>>,
    open_sessions: Arc<AtomicUsize>,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageSession for MemorySession {
    async fn find_by_url(&mut self, url: &str) -> Result<Option<StoredArticle>> {
        Ok(self.store.read().await.find_by_url(url))
    }

    async fn insert(&mut self, article: &EnrichedArticle) -> Result<i64> {
        Ok(self.store.write().await.insert(article))
    }

    async fn update_coordinates(&mut self, id: i64, lat: Option<f64>, lon: Option<f64>) -> Result<()> {
        self.store.write().await.update_coordinates(id, lat, lon)
    }

    async fn find_all(&mut self) -> Result<Vec<StoredArticle>> {
        Ok(self.store.read().await.find_all())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
