use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use gn_core::{Coordinates, Geocoder, Result};

/// Remembers every answer the wrapped geocoder gives, including "no match".
///
/// Failed lookups are not remembered, so a later article with the same
/// location gets another try.
pub struct CachingGeocoder<G> {
    inner: G,
    entries: Mutex<HashMap<String, Option<Coordinates>>>,
}

impl<G: Geocoder> CachingGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, location: &str) -> Option<Option<Coordinates>> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(location).copied())
    }

    fn remember(&self, location: &str, coordinates: Option<Coordinates>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(location.to_string(), coordinates);
        }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachingGeocoder<G> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn try_resolve(&self, location: &str) -> Result<Option<Coordinates>> {
        if let Some(coordinates) = self.cached(location) {
            tracing::debug!("Geocode cache hit for {}", location);
            return Ok(coordinates);
        }
        let coordinates = self.inner.try_resolve(location).await?;
        self.remember(location, coordinates);
        Ok(coordinates)
    }
}
