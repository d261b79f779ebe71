// src/notify/mod.rs
pub mod email;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Local};

use crate::compose::DigestResult;

/// Outbound delivery seam: one HTML email per invocation.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send_html(&self, subject: &str, html: &str) -> Result<()>;
}

pub const EMPTY_DIGEST_BODY: &str = "Seems like there is nothing to report today";

pub fn digest_subject(now: DateTime<Local>, mail_title: &str) -> String {
    format!(
        "Today's {:02}/{:02} news : {}",
        now.day(),
        now.month(),
        mail_title
    )
}

pub fn empty_digest_subject(now: DateTime<Local>) -> String {
    format!("Today's {:02}/{:02} news (nothing)", now.day(), now.month())
}

pub fn failure_subject(now: DateTime<Local>) -> String {
    format!("News digest failed {:02}/{:02}", now.day(), now.month())
}

/// Delivery failures are logged, never retried. A failed send must not
/// trigger another send.
pub async fn dispatch_digest(dispatcher: &dyn Dispatcher, digest: &DigestResult) {
    let subject = digest_subject(Local::now(), &digest.mail_title);
    if let Err(e) = dispatcher.send_html(&subject, &digest.mail_content).await {
        tracing::error!(error = ?e, "digest delivery failed");
    } else {
        tracing::info!(subject = %subject, "digest delivered");
    }
}

pub async fn dispatch_empty_digest(dispatcher: &dyn Dispatcher) {
    let subject = empty_digest_subject(Local::now());
    if let Err(e) = dispatcher.send_html(&subject, EMPTY_DIGEST_BODY).await {
        tracing::error!(error = ?e, "empty-digest notification failed");
    }
}

/// Operator notification for a failed run, error chain included.
pub async fn dispatch_failure(dispatcher: &dyn Dispatcher, err: &anyhow::Error) {
    let subject = failure_subject(Local::now());
    let body = format!(
        "<p>The scheduled digest run failed.</p><pre>{}</pre>",
        html_escape::encode_text(&format!("{err:?}"))
    );
    if let Err(e) = dispatcher.send_html(&subject, &body).await {
        tracing::error!(error = ?e, "failure notification could not be sent");
    }
}
