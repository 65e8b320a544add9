use std::sync::Arc;

use gn_core::{EnrichedArticle, Geocoder, LocatedArticle};

/// Attaches coordinates to located articles, one geocoding call at a time.
pub struct Enricher {
    geocoder: Arc<dyn Geocoder>,
}

impl Enricher {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Geocodes the batch in order. Articles the geocoder cannot place keep
    /// empty coordinates and stay in the batch.
    pub async fn enrich(&self, batch: Vec<LocatedArticle>) -> Vec<EnrichedArticle> {
        let mut enriched = Vec::with_capacity(batch.len());
        for article in batch {
            enriched.push(self.enrich_one(article.into()).await);
        }
        enriched
    }

    /// Geocodes a single article unless it already has both coordinates.
    pub async fn enrich_one(&self, mut article: EnrichedArticle) -> EnrichedArticle {
        if article.coordinates().is_some() {
            tracing::debug!("Article {} already has a geocode, skipping", article.url);
            return article;
        }
        tracing::info!("🧭 Geocoding article location: {}...", article.location);
        if let Some(coordinates) = self.geocoder.resolve(&article.location).await {
            article.set_coordinates(coordinates);
        }
        article
    }
}
