// src/ingest/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{Article, FeedFetcher};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    // quick-xml's serde deserializer matches on the element's *local* name,
    // so the `content:` namespace prefix must be dropped here to bind the
    // `<content:encoded>` element.
    #[serde(rename = "encoded")]
    content: Option<String>,
}

/// Feeds disagree on date formats; RFC 2822 is the RSS 2.0 norm ("GMT"
/// included), RFC 3339 shows up in practice. Anything else counts as no
/// date.
fn parse_pub_date(ts: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(ts)
        .or_else(|_| DateTime::parse_from_rfc3339(ts))
        .ok()
}

/// HTTP-backed fetcher parsing RSS 2.0 documents.
pub struct RssFetcher {
    client: reqwest::Client,
}

impl RssFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent("rss-digest-mailer/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self { client }
    }

    /// Parse a feed document into articles. Entries keep their raw
    /// description/content; only the publish date is interpreted here.
    pub fn parse_feed_str(s: &str) -> Result<Vec<Article>> {
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let summary = it.description.unwrap_or_default();
            let content = it.content.unwrap_or_else(|| summary.clone());
            out.push(Article {
                title: it.title.unwrap_or_default(),
                link: it.link.unwrap_or_default(),
                summary,
                published: it.pub_date.clone().unwrap_or_default(),
                published_at: it.pub_date.as_deref().and_then(parse_pub_date),
                content,
            });
        }
        Ok(out)
    }
}

impl Default for RssFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedFetcher for RssFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<Article>> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .context("feed http get()")?
            .text()
            .await
            .context("feed http .text()")?;
        Self::parse_feed_str(&body)
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
