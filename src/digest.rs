// src/digest.rs
//! The scheduled digest pipeline and its error boundary.

use anyhow::Result;

use crate::ai::ChatModel;
use crate::compose::{self, DigestEntry};
use crate::config::Settings;
use crate::ingest::{self, types::FeedFetcher};
use crate::notify::{self, Dispatcher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestOutcome {
    /// No qualifying article yesterday; the "nothing to report" mail went out.
    Empty,
    /// The digest was composed and handed to delivery.
    Delivered { mail_title: String, articles: usize },
}

/// One digest run: fetch, filter, compose, deliver.
///
/// Collaborator faults that must reach the operator (model transport,
/// response contract) bubble up to the caller's boundary; per-feed faults
/// and delivery faults are handled where they occur and do not.
pub async fn run_digest_once(
    settings: &Settings,
    fetcher: &dyn FeedFetcher,
    model: &dyn ChatModel,
    dispatcher: &dyn Dispatcher,
) -> Result<DigestOutcome> {
    let day = ingest::yesterday_utc();
    let batch = ingest::collect_published_on(fetcher, &settings.feeds, day).await;

    if batch.is_empty() {
        tracing::warn!(%day, "no articles found, sending empty digest");
        notify::dispatch_empty_digest(dispatcher).await;
        return Ok(DigestOutcome::Empty);
    }

    tracing::info!(articles = batch.len(), %day, "composing digest");
    let entries: Vec<DigestEntry> = batch
        .iter()
        .map(|sa| {
            DigestEntry::from_article(
                &sa.article,
                &sa.feed,
                &settings.recap_base_url,
                &settings.recap_code,
            )
        })
        .collect();

    let digest = compose::compose_digest(model, &entries).await?;
    notify::dispatch_digest(dispatcher, &digest).await;

    Ok(DigestOutcome::Delivered {
        mail_title: digest.mail_title,
        articles: entries.len(),
    })
}

/// Error boundary around the scheduled run.
///
/// A configuration error aborts with a log and no mail. Anything else that
/// escapes the pipeline is logged with full detail and reported to the
/// operator through the failure-notification mail; a failure of that mail
/// itself is only logged.
pub async fn run_scheduled(
    settings: &Settings,
    fetcher: &dyn FeedFetcher,
    model: &dyn ChatModel,
    dispatcher: &dyn Dispatcher,
) {
    if let Err(e) = settings.ensure_digest_preconditions() {
        tracing::error!(error = %e, "digest run aborted");
        return;
    }
    match run_digest_once(settings, fetcher, model, dispatcher).await {
        Ok(outcome) => tracing::info!(?outcome, "digest run finished"),
        Err(err) => {
            tracing::error!(error = ?err, "digest run failed");
            notify::dispatch_failure(dispatcher, &err).await;
        }
    }
}
