use std::sync::Arc;

use gn_core::{ArticleStorage, EnrichedArticle, Result, StorageSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(i64),
    Updated(i64),
    /// Already stored and there were no new coordinates to merge
    Unchanged(i64),
}

/// What one `persist` call did with its batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PersistReport {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl PersistReport {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted(_) => self.inserted += 1,
            UpsertOutcome::Updated(_) => self.updated += 1,
            UpsertOutcome::Unchanged(_) => self.unchanged += 1,
        }
    }
}

/// Writes enriched articles, keeping at most one record per url.
///
/// Each `persist` call holds its own connection for the duration of the
/// batch, and each coordinate update opens another one of its own. Nothing is
/// kept open between calls.
pub struct UpsertWriter {
    storage: Arc<dyn ArticleStorage>,
}

impl UpsertWriter {
    pub fn new(storage: Arc<dyn ArticleStorage>) -> Self {
        Self { storage }
    }

    /// Inserts unknown urls and merges coordinates into known ones, in batch order.
    ///
    /// A record that fails is logged and counted; the rest of the batch still
    /// goes through. Only failing to connect at all is returned as an error.
    pub async fn persist(&self, batch: &[EnrichedArticle]) -> Result<PersistReport> {
        tracing::info!("💾 Storing {} articles in {}...", batch.len(), self.storage.name());
        let mut session = self.storage.connect().await?;
        let mut report = PersistReport::default();

        for article in batch {
            match self.upsert(session.as_mut(), article).await {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    tracing::error!("❌ Error storing article {}: {}", article.url, e);
                    report.failed += 1;
                }
            }
        }

        if let Err(e) = session.close().await {
            tracing::warn!("⚠️ Failed to close storage connection: {}", e);
        }

        tracing::info!(
            "✨ Stored batch: {} inserted, {} updated, {} unchanged, {} failed",
            report.inserted,
            report.updated,
            report.unchanged,
            report.failed
        );
        Ok(report)
    }

    async fn upsert(&self, session: &mut dyn StorageSession, article: &EnrichedArticle) -> Result<UpsertOutcome> {
        match session.find_by_url(&article.url).await? {
            Some(existing) => {
                if article.coordinates().is_none() {
                    tracing::info!("⏭️ Article with URL {} already exists and has no new geocode.", article.url);
                    return Ok(UpsertOutcome::Unchanged(existing.id));
                }
                tracing::info!("📝 Article with URL {} already exists. Updating geocode...", article.url);
                self.update_coordinates(existing.id, article.lat, article.lon).await?;
                Ok(UpsertOutcome::Updated(existing.id))
            }
            None => {
                tracing::info!("🆕 Inserting new article with URL {}.", article.url);
                let id = session.insert(article).await?;
                tracing::debug!("Inserted article with URL {} as {}.", article.url, id);
                Ok(UpsertOutcome::Inserted(id))
            }
        }
    }

    /// Sets the coordinates of one stored record over a connection of its own.
    pub async fn update_coordinates(&self, id: i64, lat: Option<f64>, lon: Option<f64>) -> Result<()> {
        tracing::debug!("Updating article {} with geocode [{:?}, {:?}]...", id, lat, lon);
        let mut session = self.storage.connect().await?;
        let result = session.update_coordinates(id, lat, lon).await;
        if let Err(e) = session.close().await {
            tracing::warn!("⚠️ Failed to close storage connection: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStorage;
    use async_trait::async_trait;
    use gn_core::{Error, StoredArticle};

    fn article(url: &str, coordinates: Option<(f64, f64)>) -> EnrichedArticle {
        EnrichedArticle {
            title: "A".to_string(),
            url: url.to_string(),
            location: "Paris".to_string(),
            lat: coordinates.map(|c| c.0),
            lon: coordinates.map(|c| c.1),
        }
    }

    #[tokio::test]
    async fn test_inserts_new_article_with_all_fields() {
        let storage = InMemoryStorage::new();
        let writer = UpsertWriter::new(Arc::new(storage.clone()));

        let report = writer.persist(&[article("http://x/1", Some((48.85, 2.35)))]).await.unwrap();
        assert_eq!(report, PersistReport { inserted: 1, ..Default::default() });

        let stored = storage.articles().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "A");
        assert_eq!(stored[0].location, "Paris");
        assert_eq!(stored[0].url, "http://x/1");
        assert_eq!(stored[0].lat, Some(48.85));
        assert_eq!(stored[0].lon, Some(2.35));
    }

    #[tokio::test]
    async fn test_persisting_twice_keeps_one_record_per_url() {
        let storage = InMemoryStorage::new();
        let writer = UpsertWriter::new(Arc::new(storage.clone()));

        let first = vec![article("http://x/1", Some((1.0, 1.0))), article("http://x/2", None)];
        let second = vec![article("http://x/1", Some((2.0, 2.0))), article("http://x/2", None)];

        writer.persist(&first).await.unwrap();
        let report = writer.persist(&second).await.unwrap();
        assert_eq!(report, PersistReport { updated: 1, unchanged: 1, ..Default::default() });

        let stored = storage.articles().await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].lat, Some(2.0));
        assert_eq!(stored[1].lat, None);
    }

    #[tokio::test]
    async fn test_duplicate_urls_within_one_batch() {
        let storage = InMemoryStorage::new();
        let writer = UpsertWriter::new(Arc::new(storage.clone()));

        let batch = vec![article("http://x/1", None), article("http://x/1", Some((3.0, 4.0)))];
        let report = writer.persist(&batch).await.unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(storage.articles().await.len(), 1);
    }

    #[tokio::test]
    async fn test_existing_record_gains_coordinates() {
        let storage = InMemoryStorage::new();
        let writer = UpsertWriter::new(Arc::new(storage.clone()));

        writer.persist(&[article("http://x/1", None)]).await.unwrap();
        let mut rerun = article("http://x/1", Some((48.85, 2.35)));
        rerun.title = "Renamed".to_string();
        writer.persist(&[rerun]).await.unwrap();

        let stored = storage.articles().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].lat, Some(48.85));
        assert_eq!(stored[0].lon, Some(2.35));
        assert_eq!(stored[0].title, "A");
        assert_eq!(storage.open_sessions(), 0);
    }

    /// Wraps the memory store and fails every operation on one url.
    struct FlakyStorage {
        inner: InMemoryStorage,
        poisoned_url: &'static str,
        refuse_connections: bool,
    }

    struct FlakySession {
        inner: Box<dyn StorageSession>,
        poisoned_url: &'static str,
    }

    #[async_trait]
    impl ArticleStorage for FlakyStorage {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn connect(&self) -> Result<Box<dyn StorageSession>> {
            if self.refuse_connections {
                return Err(Error::Storage("connection refused".to_string()));
            }
            Ok(Box::new(FlakySession {
                inner: self.inner.connect().await?,
                poisoned_url: self.poisoned_url,
            }))
        }
    }

    #[async_trait]
    impl StorageSession for FlakySession {
        async fn find_by_url(&mut self, url: &str) -> Result<Option<StoredArticle>> {
            if url == self.poisoned_url {
                return Err(Error::Storage("lookup failed".to_string()));
            }
            self.inner.find_by_url(url).await
        }

        async fn insert(&mut self, article: &EnrichedArticle) -> Result<i64> {
            self.inner.insert(article).await
        }

        async fn update_coordinates(&mut self, id: i64, lat: Option<f64>, lon: Option<f64>) -> Result<()> {
            self.inner.update_coordinates(id, lat, lon).await
        }

        async fn find_all(&mut self) -> Result<Vec<StoredArticle>> {
            self.inner.find_all().await
        }

        async fn close(self: Box<Self>) -> Result<()> {
            self.inner.close().await
        }
    }

    #[tokio::test]
    async fn test_failed_record_does_not_abort_batch() {
        let inner = InMemoryStorage::new();
        let writer = UpsertWriter::new(Arc::new(FlakyStorage {
            inner: inner.clone(),
            poisoned_url: "http://x/2",
            refuse_connections: false,
        }));

        let batch = vec![
            article("http://x/1", None),
            article("http://x/2", None),
            article("http://x/3", None),
        ];
        let report = writer.persist(&batch).await.unwrap();
        assert_eq!(report, PersistReport { inserted: 2, failed: 1, ..Default::default() });

        let urls: Vec<String> = inner.articles().await.into_iter().map(|a| a.url).collect();
        assert_eq!(urls, vec!["http://x/1", "http://x/3"]);
        assert_eq!(inner.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_connect_failure_is_returned() {
        let writer = UpsertWriter::new(Arc::new(FlakyStorage {
            inner: InMemoryStorage::new(),
            poisoned_url: "",
            refuse_connections: true,
        }));

        let result = writer.persist(&[article("http://x/1", None)]).await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
