// src/recap.rs
//! Stateless recap links. The encoded token is the only state behind a
//! recap button: which feed to re-fetch and which article link to look for.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine as _};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecapToken {
    pub feed: String,
    pub link: String,
}

/// base64url(JSON({feed, link})), unpadded. The URL-safe alphabet never
/// needs percent-encoding inside a query string, so [`decode`] sees the
/// token byte-for-byte as produced here.
pub fn encode(token: &RecapToken) -> String {
    let json = serde_json::to_string(token).expect("recap token serializes");
    BASE64_URL.encode(json)
}

pub fn decode(payload: &str) -> Result<RecapToken> {
    let bytes = BASE64_URL
        .decode(payload.trim())
        .context("decoding recap payload base64")?;
    serde_json::from_slice(&bytes).context("decoding recap payload json")
}

/// The full recap button URL embedded into digest emails.
pub fn recap_url(base: &str, code: &str, token: &RecapToken) -> String {
    format!("{base}?payload={}&code={code}", encode(token))
}
