use std::sync::Arc;

use gn_core::{ArticleSource, ArticleStorage, Geocoder, HarvestConfig, RawArticle, Result};
use gn_storage::{PersistReport, UpsertWriter};

use crate::enrich::Enricher;
use crate::extract::extract_locations;
use crate::source::ArticleSearchClient;

/// What one fetch-and-process cycle did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub pages_fetched: u32,
    pub articles_fetched: usize,
    pub located: usize,
    pub geocoded: usize,
    /// `None` when nothing reached the store
    pub report: Option<PersistReport>,
    /// False once a page came back empty
    pub more_available: bool,
}

/// Totals for a whole run, logged when it ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub pages_fetched: u32,
    pub articles_fetched: usize,
    pub located: usize,
    pub geocoded: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub waits: usize,
    /// The page the next run would start from
    pub next_page: u32,
}

impl RunSummary {
    fn absorb(&mut self, outcome: &BatchOutcome) {
        self.batches += 1;
        self.pages_fetched += outcome.pages_fetched;
        self.articles_fetched += outcome.articles_fetched;
        self.located += outcome.located;
        self.geocoded += outcome.geocoded;
        if let Some(report) = outcome.report {
            self.inserted += report.inserted;
            self.updated += report.updated;
            self.unchanged += report.unchanged;
            self.failed += report.failed;
        }
    }
}

/// Walks the search results page by page, `pages_per_batch` pages at a time,
/// pausing `inter_batch_delay` between batches until a page comes back empty.
pub struct HarvestDriver {
    source: Arc<dyn ArticleSource>,
    enricher: Enricher,
    writer: UpsertWriter,
    config: HarvestConfig,
    current_page: u32,
}

impl HarvestDriver {
    /// Fails when `pages_per_batch` is zero.
    pub fn new(
        config: HarvestConfig,
        source: Arc<dyn ArticleSource>,
        geocoder: Arc<dyn Geocoder>,
        storage: Arc<dyn ArticleStorage>,
    ) -> Result<Self> {
        config.validate_batching()?;
        Ok(Self {
            source,
            enricher: Enricher::new(geocoder),
            writer: UpsertWriter::new(storage),
            current_page: config.start_page,
            config,
        })
    }

    /// Wires up the search client, geocoder and store named in `config`.
    pub async fn from_config(config: HarvestConfig) -> Result<Self> {
        config.validate()?;
        let source = Arc::new(ArticleSearchClient::from_config(&config)?);
        let geocoder = gn_geocode::create_geocoder(&config)?;
        let storage = gn_storage::create_storage(&config.store_url).await?;
        Self::new(config, source, geocoder, storage)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Runs batches until the source reports an empty page.
    pub async fn run(&mut self) -> RunSummary {
        tracing::info!("🚀 Starting to fetch and store articles from page {}...", self.current_page);
        let mut summary = RunSummary::default();

        loop {
            let outcome = self.run_batch().await;
            summary.absorb(&outcome);

            if !outcome.more_available {
                break;
            }

            tracing::info!(
                "⏳ Waiting {} seconds before the next run...",
                self.config.inter_batch_delay.as_secs_f64()
            );
            summary.waits += 1;
            tokio::time::sleep(self.config.inter_batch_delay).await;
        }

        summary.next_page = self.current_page;
        tracing::info!(
            "🏁 Harvest finished after {} batches: {} pages, {} articles, {} located, {} geocoded, {} inserted, {} updated, {} failed",
            summary.batches,
            summary.pages_fetched,
            summary.articles_fetched,
            summary.located,
            summary.geocoded,
            summary.inserted,
            summary.updated,
            summary.failed
        );
        summary
    }

    /// Fetches up to `pages_per_batch` pages, then extracts, geocodes and stores what came back.
    pub async fn run_batch(&mut self) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            more_available: true,
            ..Default::default()
        };
        let articles = self.fetch_batch(&mut outcome).await;

        if articles.is_empty() {
            return outcome;
        }

        let located = extract_locations(&articles);
        outcome.located = located.len();
        if located.is_empty() {
            return outcome;
        }

        let enriched = self.enricher.enrich(located).await;
        outcome.geocoded = enriched.iter().filter(|a| a.coordinates().is_some()).count();

        match self.writer.persist(&enriched).await {
            Ok(report) => outcome.report = Some(report),
            Err(e) => tracing::error!("❌ Error storing articles: {}", e),
        }

        outcome
    }

    async fn fetch_batch(&mut self, outcome: &mut BatchOutcome) -> Vec<RawArticle> {
        let mut articles = Vec::new();

        for _ in 0..self.config.pages_per_batch {
            let page = self.source.fetch_page(&self.config.query, self.current_page).await;
            if page.is_empty() {
                tracing::info!("📭 Page {} came back empty, stopping after this batch", self.current_page);
                outcome.more_available = false;
                break;
            }
            outcome.pages_fetched += 1;
            outcome.articles_fetched += page.len();
            articles.extend(page);
            self.current_page += 1;
        }

        articles
    }
}
