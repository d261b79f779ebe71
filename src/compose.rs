// src/compose.rs
//! Prompt construction and the model-response contract for the daily digest
//! and the single-article recap.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ai::ChatModel;
use crate::ingest::types::Article;
use crate::recap::{self, RecapToken};

/// System instruction for the batch digest call. The response contract
/// (a bare JSON object with `mailTitle` and `mailContent`) is what
/// [`parse_digest_response`] enforces.
pub const DIGEST_SYSTEM_PROMPT: &str = r#"Transform a JSON list of news articles into a structured HTML email.

The input is a JSON array of objects with these fields:
- "title": title of the article
- "link": URL of the original article
- "summary": brief summary, may contain HTML
- "published": publication date
- "recap_link": URL that sends the reader a longer recap of this article

Produce a JSON object with exactly these fields:
- "mailTitle": the day's topics as comma-separated tags
- "mailContent": the email body as well-formatted HTML

Rules for mailContent:
- Begin with a short, friendly overview of the topics.
- For each article worth reading, give a concise summary followed by a link
  to the original article and a button-style link to its recap_link inviting
  the reader to get a longer recap by mail.
- Append the source site to each article title, e.g. "A headline (example.com)".
- Separate articles with a horizontal rule and leave enough spacing between
  headers and text to stay readable on a mobile phone; inline a little CSS
  if needed.
- Output the bare JSON object only: no markdown fences, no commentary, no
  extra fields."#;

/// System instruction for the single-article recap call. The response is
/// plain HTML shown to the reader as-is.
pub const RECAP_SYSTEM_PROMPT: &str = r#"Write a recap of the provided article as plain HTML.

The input is a JSON object with these fields:
- "title": title of the article
- "content": main content of the article
- "link": URL of the original article

The recap should take no more than three minutes to read and stay engaging
and informative. Code blocks and images from the original may be kept.

Structure:
- A header with the original article title.
- One introductory sentence naming the main topics.
- The content summarized in a few paragraphs, including your own opinion on
  the topic and, where useful, recommendations for further reading.
- A closing link to the original article.

Output plain HTML only: no markdown fences, no extra tags around the
document. The response is shown to the reader exactly as returned."#;

/// One article as serialized into the digest request, augmented with the
/// recap button URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DigestEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: String,
    pub recap_link: String,
}

impl DigestEntry {
    pub fn from_article(
        article: &Article,
        feed: &str,
        recap_base_url: &str,
        recap_code: &str,
    ) -> Self {
        let token = RecapToken {
            feed: feed.to_string(),
            link: article.link.clone(),
        };
        Self {
            title: article.title.clone(),
            link: article.link.clone(),
            summary: article.summary.clone(),
            published: article.published.clone(),
            recap_link: recap::recap_url(recap_base_url, recap_code, &token),
        }
    }
}

/// Parsed digest response. The contract is strict: an object with exactly
/// these two string fields, or the run fails over to the notification path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DigestResult {
    #[serde(rename = "mailTitle")]
    pub mail_title: String,
    #[serde(rename = "mailContent")]
    pub mail_content: String,
}

/// Serialize the batch as the user message of the digest request.
pub fn digest_user_payload(entries: &[DigestEntry]) -> Result<String> {
    serde_json::to_string(entries).context("serializing digest batch")
}

pub fn parse_digest_response(raw: &str) -> Result<DigestResult> {
    serde_json::from_str(raw.trim())
        .context("model digest response does not match the mailTitle/mailContent contract")
}

/// Ask the model for the daily digest. Exactly one call per run.
pub async fn compose_digest(model: &dyn ChatModel, entries: &[DigestEntry]) -> Result<DigestResult> {
    let user = digest_user_payload(entries)?;
    let raw = model
        .complete(DIGEST_SYSTEM_PROMPT, &user)
        .await
        .context("digest model call")?;
    parse_digest_response(&raw)
}

#[derive(Serialize)]
struct RecapInput<'a> {
    title: &'a str,
    content: &'a str,
    link: &'a str,
}

/// Ask the model for a deep recap of one article. The response is plain
/// HTML passed through to the caller unvalidated; there is no structured
/// consumer on this path.
pub async fn compose_recap(model: &dyn ChatModel, article: &Article) -> Result<String> {
    let user = serde_json::to_string(&RecapInput {
        title: &article.title,
        content: &article.content,
        link: &article.link,
    })
    .context("serializing recap input")?;
    model
        .complete(RECAP_SYSTEM_PROMPT, &user)
        .await
        .context("recap model call")
}
