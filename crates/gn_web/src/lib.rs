use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use gn_core::Result;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Serves the read API on `addr` until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use gn_core::{Error, Result, StoredArticle};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use gn_core::{ArticleStorage, EnrichedArticle, Error, StorageSession, StoredArticle};
    use gn_storage::InMemoryStorage;
    use tower::ServiceExt;

    async fn seeded_storage() -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        let mut session = storage.connect().await.unwrap();
        session
            .insert(&EnrichedArticle {
                title: "A".to_string(),
                url: "http://x/1".to_string(),
                location: "Paris".to_string(),
                lat: Some(48.85),
                lon: Some(2.35),
            })
            .await
            .unwrap();
        session.close().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_list_articles() {
        let storage = seeded_storage().await;
        let state = AppState::connect(&storage).await.unwrap();
        let app = create_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/articles")
                    .header("Origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"].to_str().unwrap(),
            "*"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let articles: Vec<StoredArticle> = serde_json::from_slice(&body).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "http://x/1");
        assert_eq!(articles[0].lat, Some(48.85));
    }

    #[tokio::test]
    async fn test_state_keeps_one_connection_open() {
        let storage = seeded_storage().await;
        let state = AppState::connect(&storage).await.unwrap();
        let app = create_app(state);

        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/api/articles").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(storage.open_sessions(), 1);
    }

    struct BrokenSession;

    #[async_trait]
    impl StorageSession for BrokenSession {
        async fn find_by_url(&mut self, _url: &str) -> gn_core::Result<Option<StoredArticle>> {
            Ok(None)
        }

        async fn insert(&mut self, _article: &EnrichedArticle) -> gn_core::Result<i64> {
            Ok(0)
        }

        async fn update_coordinates(&mut self, _id: i64, _lat: Option<f64>, _lon: Option<f64>) -> gn_core::Result<()> {
            Ok(())
        }

        async fn find_all(&mut self) -> gn_core::Result<Vec<StoredArticle>> {
            Err(Error::Storage("database is locked".to_string()))
        }

        async fn close(self: Box<Self>) -> gn_core::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let state = AppState {
            session: tokio::sync::Mutex::new(Box::new(BrokenSession) as Box<dyn StorageSession>),
        };
        let response = create_app(state)
            .oneshot(Request::builder().uri("/api/articles").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["error"], "Storage error: database is locked");
    }
}
