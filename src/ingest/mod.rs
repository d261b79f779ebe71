// src/ingest/mod.rs
pub mod rss;
pub mod types;

use chrono::{Duration, NaiveDate, Utc};

use crate::ingest::types::{Article, FeedFetcher};

/// An article together with the feed it came from; the recap token needs
/// both halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedArticle {
    pub feed: String,
    pub article: Article,
}

/// The digest covers "yesterday" in UTC.
pub fn yesterday_utc() -> NaiveDate {
    (Utc::now() - Duration::days(1)).date_naive()
}

/// Keep entries published on `day`. Full calendar-date match in UTC; an
/// entry without a parseable date is dropped here, never an error.
pub fn filter_published_on(entries: Vec<Article>, day: NaiveDate) -> Vec<Article> {
    entries
        .into_iter()
        .filter(|a| {
            a.published_at
                .map(|dt| dt.with_timezone(&Utc).date_naive() == day)
                .unwrap_or(false)
        })
        .collect()
}

/// Fetch every configured feed sequentially and keep the entries published
/// on `day`. A feed that fails to fetch or parse degrades to zero entries;
/// the remaining feeds are still processed.
pub async fn collect_published_on(
    fetcher: &dyn FeedFetcher,
    feeds: &[String],
    day: NaiveDate,
) -> Vec<SourcedArticle> {
    let mut batch = Vec::new();
    for url in feeds {
        tracing::info!(feed = %url, "processing feed");
        match fetcher.fetch(url).await {
            Ok(entries) => {
                let total = entries.len();
                let kept = filter_published_on(entries, day);
                tracing::debug!(feed = %url, total, kept = kept.len(), "feed filtered");
                batch.extend(kept.into_iter().map(|article| SourcedArticle {
                    feed: url.clone(),
                    article,
                }));
            }
            Err(e) => {
                tracing::warn!(error = ?e, feed = %url, "feed error, skipping");
            }
        }
    }
    batch
}
