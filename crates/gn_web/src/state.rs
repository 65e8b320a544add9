use gn_core::{ArticleStorage, Result, StorageSession};
use tokio::sync::Mutex;

/// Shared state for the read service.
///
/// Unlike the harvester, which connects per batch, the service opens one
/// connection at startup and keeps it for the life of the process.
pub struct AppState {
    pub session: Mutex<Box<dyn StorageSession>>,
}

impl AppState {
    pub async fn connect(storage: &dyn ArticleStorage) -> Result<Self> {
        let session = storage.connect().await?;
        tracing::info!("🔌 Opened process-wide connection to {}", storage.name());
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}
