// src/api.rs
use std::sync::Arc;

use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::ai::ChatModel;
use crate::compose;
use crate::config::Settings;
use crate::ingest::types::FeedFetcher;
use crate::recap;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub model: Arc<dyn ChatModel>,
    pub fetcher: Arc<dyn FeedFetcher>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/recap", get(recap_handler))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct RecapQuery {
    payload: Option<String>,
    code: Option<String>,
}

/// Stateless deep-recap endpoint: decode the token, re-fetch the feed, find
/// the article, summarize. "Article gone" (204) and "summarizer broke" (500)
/// stay distinguishable for callers.
async fn recap_handler(State(state): State<AppState>, Query(q): Query<RecapQuery>) -> Response {
    let Some(payload) = q.payload else {
        return (StatusCode::BAD_REQUEST, "missing payload").into_response();
    };

    if q.code.as_deref() != Some(state.settings.recap_code.as_str()) {
        return (StatusCode::FORBIDDEN, "invalid code").into_response();
    }

    let token = match recap::decode(&payload) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(error = ?e, "recap payload rejected");
            return (StatusCode::BAD_REQUEST, "malformed payload").into_response();
        }
    };

    // Always a fresh fetch; the recap must reflect the feed as it is now.
    let entries = match state.fetcher.fetch(&token.feed).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = ?e, feed = %token.feed, "recap feed fetch failed");
            Vec::new()
        }
    };

    let Some(article) = entries.into_iter().find(|a| a.link == token.link) else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match compose::compose_recap(state.model.as_ref(), &article).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = ?e, link = %token.link, "recap generation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "recap generation failed").into_response()
        }
    }
}
