use std::sync::Arc;

use async_trait::async_trait;
use gn_core::{ArticleStorage, Error, Result};

pub mod backends;
pub mod writer;

pub use backends::*;
pub use writer::{PersistReport, UpsertOutcome, UpsertWriter};

/// A storage backend that can be opened from the location part of a store URL.
#[async_trait]
pub trait StorageBackend: ArticleStorage + Sized {
    /// URL scheme this backend answers to
    fn scheme() -> &'static str;

    async fn open(location: &str) -> Result<Self>;
}

/// Splits `scheme://location` (or `scheme:location`) into its two halves.
fn split_store_url(url: &str) -> Result<(&str, &str)> {
    let (scheme, rest) = url
        .split_once(':')
        .ok_or_else(|| Error::Config(format!("Store URL has no scheme: {}", url)))?;
    let location = rest.strip_prefix("//").unwrap_or(rest);
    Ok((scheme, location))
}

/// Opens the storage backend named by `url`: `memory://` or `sqlite://<path>`.
pub async fn create_storage(url: &str) -> Result<Arc<dyn ArticleStorage>> {
    let (scheme, location) = split_store_url(url)?;
    let storage: Arc<dyn ArticleStorage> = match scheme {
        s if s == InMemoryStorage::scheme() => Arc::new(InMemoryStorage::open(location).await?),
        #[cfg(feature = "sqlite")]
        s if s == SQLiteStorage::scheme() => Arc::new(SQLiteStorage::open(location).await?),
        other => {
            return Err(Error::Config(format!("Unsupported storage backend: {}", other)));
        }
    };
    tracing::info!("🏦 Storage backend ready (using {})", storage.name());
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::writer::{PersistReport, UpsertWriter};
    pub use super::{create_storage, StorageBackend};
}
