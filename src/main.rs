//! Daily Digest Service — Binary Entrypoint
//! Boots the Axum HTTP server for the recap endpoint and spawns the daily
//! digest scheduler.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rss_digest_mailer::ai::{ChatModel, OpenAiChat};
use rss_digest_mailer::api::{router, AppState};
use rss_digest_mailer::config::{EnvSecrets, Settings};
use rss_digest_mailer::ingest::rss::RssFetcher;
use rss_digest_mailer::ingest::types::FeedFetcher;
use rss_digest_mailer::notify::email::Mailer;
use rss_digest_mailer::notify::Dispatcher;
use rss_digest_mailer::scheduler;

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - DIGEST_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("DIGEST_DEV_LOG").ok().is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rss_digest_mailer=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let settings = Arc::new(Settings::load(&EnvSecrets));
    let model: Arc<dyn ChatModel> = Arc::new(OpenAiChat::new(&settings.api_key, &settings.model));
    let fetcher: Arc<dyn FeedFetcher> = Arc::new(RssFetcher::new());
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(Mailer::from_settings(&settings));

    // Safe diagnostics: counts and provider only, no secret material.
    tracing::info!(
        provider = model.name(),
        model = %settings.model,
        feeds = settings.feeds.len(),
        "configuration loaded"
    );

    // Daily digest runs in the background; the router only serves recaps.
    scheduler::spawn_daily_digest(
        settings.clone(),
        fetcher.clone(),
        model.clone(),
        dispatcher,
    );

    let state = AppState {
        settings,
        model,
        fetcher,
    };
    Ok(router(state).into())
}
