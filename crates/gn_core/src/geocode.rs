use async_trait::async_trait;
use crate::types::Coordinates;
use crate::Result;

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns the name of the geocoding service
    fn name(&self) -> &str;

    /// Looks up a place name. `Ok(None)` means the service had no candidate.
    async fn try_resolve(&self, location: &str) -> Result<Option<Coordinates>>;

    /// Looks up a place name, folding failures into "unresolved"
    async fn resolve(&self, location: &str) -> Option<Coordinates> {
        match self.try_resolve(location).await {
            Ok(coordinates) => coordinates,
            Err(e) => {
                tracing::error!("❌ Error getting geocode for {}: {}", location, e);
                None
            }
        }
    }
}
