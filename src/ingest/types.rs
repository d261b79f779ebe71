// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, FixedOffset};

/// One feed entry as parsed from the wire. Read-only after ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    /// Canonical article URL; also the lookup key for recap requests.
    pub link: String,
    /// Short description, may contain HTML. Forwarded to the model as-is.
    pub summary: String,
    /// Publication date exactly as it appeared in the feed.
    pub published: String,
    /// Parsed publication instant; `None` when the feed date is unusable.
    pub published_at: Option<DateTime<FixedOffset>>,
    /// Full body used for the deep recap (`content:encoded`, falling back
    /// to the description).
    pub content: String,
}

#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<Article>>;
}
