use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::AppState;

/// Every stored article, as JSON.
pub async fn list_articles(State(state): State<Arc<AppState>>) -> Response {
    let mut session = state.session.lock().await;
    match session.find_all().await {
        Ok(articles) => Json(articles).into_response(),
        Err(e) => {
            tracing::error!("❌ Error listing articles: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
