// src/config.rs
use anyhow::{bail, Result};

/// Secret accessor contract. Production reads process env (populated from
/// `.env` in dev, injected by the platform in prod); a vault-backed store
/// satisfies the same shape.
pub trait SecretStore: Send + Sync {
    /// `None` when the secret is absent or blank.
    fn get_secret(&self, name: &str) -> Option<String>;
}

/// Env-backed store.
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn get_secret(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Application settings, constructed once at startup and passed by reference
/// into each component. No ambient global state.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Feed URLs, in configuration order.
    pub feeds: Vec<String>,
    pub api_key: String,
    pub model: String,
    pub mail_from: String,
    pub mail_to: String,
    pub smtp_host: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    /// Base URL of the public recap endpoint, embedded into digest emails.
    pub recap_base_url: String,
    /// Static capability code required by the recap endpoint.
    pub recap_code: String,
}

impl Settings {
    /// Load from the given store. Loading is lenient: absent secrets become
    /// empty values. The scheduled run checks its fatal preconditions via
    /// [`Settings::ensure_digest_preconditions`] before doing any work, and
    /// the delivery path reports its own configuration problems as send
    /// errors.
    pub fn load(store: &dyn SecretStore) -> Self {
        let get = |name: &str| store.get_secret(name).unwrap_or_default();
        Self {
            feeds: parse_feed_list(&get("RSS_FEEDS")),
            api_key: get("API_KEY"),
            model: store
                .get_secret("DIGEST_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            mail_from: get("MAIL_FROM"),
            mail_to: get("MAIL_TO"),
            smtp_host: get("SMTP_HOST"),
            smtp_user: get("SMTP_USER"),
            smtp_pass: get("SMTP_PASS"),
            recap_base_url: get("RECAP_BASE_URL"),
            recap_code: get("RECAP_CODE"),
        }
    }

    /// Fatal preconditions for a scheduled run, checked before any fetch.
    pub fn ensure_digest_preconditions(&self) -> Result<()> {
        if self.feeds.is_empty() {
            bail!("no RSS feeds configured (RSS_FEEDS)");
        }
        if self.api_key.is_empty() {
            bail!("no model API key configured (API_KEY)");
        }
        Ok(())
    }
}

/// Comma-separated URL list; blank entries are skipped silently.
pub fn parse_feed_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
