use std::sync::Arc;

use gn_core::{Geocoder, HarvestConfig, Result};

pub mod cache;
pub mod nominatim;

pub use cache::CachingGeocoder;
pub use nominatim::NominatimGeocoder;

/// Builds the geocoder described by `config`, wrapped in a per-run cache when enabled.
pub fn create_geocoder(config: &HarvestConfig) -> Result<Arc<dyn Geocoder>> {
    let geocoder = NominatimGeocoder::new(&config.geocode_url, &config.user_agent)?;
    if config.geocode_cache {
        tracing::info!("🗺️ Geocoding through {} with a per-run cache", geocoder.name());
        Ok(Arc::new(CachingGeocoder::new(geocoder)))
    } else {
        tracing::info!("🗺️ Geocoding through {}", geocoder.name());
        Ok(Arc::new(geocoder))
    }
}

pub mod prelude {
    pub use super::{create_geocoder, CachingGeocoder, NominatimGeocoder};
    pub use gn_core::{Coordinates, Geocoder, Result};
}
