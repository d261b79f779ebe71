// src/notify/email.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::Dispatcher;
use crate::config::Settings;

/// SMTP-backed dispatcher. The mailboxes and transport are built per send so
/// that a misconfigured mail setup surfaces as a delivery error in the logs,
/// not as a boot failure of the whole service.
pub struct Mailer {
    host: String,
    user: String,
    pass: String,
    from: String,
    to: String,
}

impl Mailer {
    pub fn from_settings(s: &Settings) -> Self {
        Self {
            host: s.smtp_host.clone(),
            user: s.smtp_user.clone(),
            pass: s.smtp_pass.clone(),
            from: s.mail_from.clone(),
            to: s.mail_to.clone(),
        }
    }
}

#[async_trait]
impl Dispatcher for Mailer {
    async fn send_html(&self, subject: &str, html: &str) -> Result<()> {
        let from: Mailbox = self.from.parse().context("invalid MAIL_FROM")?;
        let to: Mailbox = self.to.parse().context("invalid MAIL_TO")?;

        let msg = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_HTML)
            .body(html.to_string())
            .context("build email")?;

        let creds = Credentials::new(self.user.clone(), self.pass.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();

        mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}
