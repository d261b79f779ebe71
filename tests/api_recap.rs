// tests/api_recap.rs
//
// HTTP-level tests for the recap endpoint without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /recap status mapping: 400 / 403 / 204 / 200 / 500

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use rss_digest_mailer::ai::ChatModel;
use rss_digest_mailer::api::{router, AppState};
use rss_digest_mailer::compose::RECAP_SYSTEM_PROMPT;
use rss_digest_mailer::config::Settings;
use rss_digest_mailer::ingest::types::{Article, FeedFetcher};
use rss_digest_mailer::recap::{self, RecapToken};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

const FEED: &str = "https://news.example/rss";
const ARTICLE: &str = "https://news.example/article?id=42&lang=en";
const CODE: &str = "s3cret";

fn test_settings() -> Settings {
    Settings {
        feeds: vec![FEED.to_string()],
        api_key: "sk-test".to_string(),
        model: "gpt-4o-mini".to_string(),
        mail_from: "digest@example.com".to_string(),
        mail_to: "reader@example.com".to_string(),
        smtp_host: "smtp.example.com".to_string(),
        smtp_user: "user".to_string(),
        smtp_pass: "pass".to_string(),
        recap_base_url: "https://fn.example/recap".to_string(),
        recap_code: CODE.to_string(),
    }
}

fn feed_article() -> Article {
    Article {
        title: "The article".to_string(),
        link: ARTICLE.to_string(),
        summary: "<p>short</p>".to_string(),
        published: "Tue, 04 Aug 2026 08:15:00 GMT".to_string(),
        published_at: None,
        content: "<p>the full body</p>".to_string(),
    }
}

struct StubFetcher {
    result: Result<Vec<Article>, String>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn with(articles: Vec<Article>) -> Self {
        Self {
            result: Ok(articles),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(msg: &str) -> Self {
        Self {
            result: Err(msg.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn fetch_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FeedFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<Article>> {
        self.calls.lock().unwrap().push(url.to_string());
        match &self.result {
            Ok(v) => Ok(v.clone()),
            Err(m) => Err(anyhow!(m.clone())),
        }
    }
}

struct StubModel {
    response: Result<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubModel {
    fn replying(raw: &str) -> Self {
        Self {
            response: Ok(raw.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(msg: &str) -> Self {
        Self {
            response: Err(msg.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for StubModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        match &self.response {
            Ok(s) => Ok(s.clone()),
            Err(m) => Err(anyhow!(m.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn test_router(fetcher: Arc<StubFetcher>, model: Arc<StubModel>) -> Router {
    let state = AppState {
        settings: Arc::new(test_settings()),
        model,
        fetcher,
    };
    router(state)
}

fn valid_payload() -> String {
    recap::encode(&RecapToken {
        feed: FEED.to_string(),
        link: ARTICLE.to_string(),
    })
}

async fn get(app: Router, uri: &str) -> shuttle_axum::axum::http::Response<Body> {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    app.oneshot(req).await.expect("oneshot")
}

async fn read_body(resp: shuttle_axum::axum::http::Response<Body>) -> String {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    String::from_utf8(bytes).expect("utf8")
}

#[tokio::test]
async fn health_returns_200_and_ok_body() {
    let app = test_router(
        Arc::new(StubFetcher::with(vec![])),
        Arc::new(StubModel::replying("<p>unused</p>")),
    );
    let resp = get(app, "/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_body(resp).await.trim(), "OK");
}

#[tokio::test]
async fn missing_payload_is_400_with_no_fetch_and_no_model_call() {
    let fetcher = Arc::new(StubFetcher::with(vec![feed_article()]));
    let model = Arc::new(StubModel::replying("<p>unused</p>"));
    let app = test_router(fetcher.clone(), model.clone());

    let resp = get(app, &format!("/recap?code={CODE}")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fetcher.fetch_count(), 0);
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn wrong_capability_code_is_403() {
    let fetcher = Arc::new(StubFetcher::with(vec![feed_article()]));
    let app = test_router(fetcher.clone(), Arc::new(StubModel::replying("x")));

    let payload = valid_payload();
    let resp = get(app, &format!("/recap?payload={payload}&code=wrong")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn missing_capability_code_is_403() {
    let fetcher = Arc::new(StubFetcher::with(vec![feed_article()]));
    let app = test_router(fetcher.clone(), Arc::new(StubModel::replying("x")));

    let payload = valid_payload();
    let resp = get(app, &format!("/recap?payload={payload}")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn malformed_payload_is_400_with_no_fetch() {
    let fetcher = Arc::new(StubFetcher::with(vec![feed_article()]));
    let app = test_router(fetcher.clone(), Arc::new(StubModel::replying("x")));

    let resp = get(app, &format!("/recap?payload=%21%21not-a-token&code={CODE}")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn article_gone_from_feed_is_204_with_empty_body() {
    let other = Article {
        link: "https://news.example/other".to_string(),
        ..feed_article()
    };
    let fetcher = Arc::new(StubFetcher::with(vec![other]));
    let model = Arc::new(StubModel::replying("<p>unused</p>"));
    let app = test_router(fetcher.clone(), model.clone());

    let payload = valid_payload();
    let resp = get(app, &format!("/recap?payload={payload}&code={CODE}")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(fetcher.fetch_count(), 1);
    assert!(model.calls().is_empty());
    assert!(read_body(resp).await.is_empty());
}

#[tokio::test]
async fn feed_fetch_failure_degrades_to_204() {
    let fetcher = Arc::new(StubFetcher::failing("dns error"));
    let app = test_router(fetcher, Arc::new(StubModel::replying("x")));

    let payload = valid_payload();
    let resp = get(app, &format!("/recap?payload={payload}&code={CODE}")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn matching_article_returns_the_model_html_verbatim() {
    let fetcher = Arc::new(StubFetcher::with(vec![feed_article()]));
    let model = Arc::new(StubModel::replying("<h1>The article</h1><p>recap</p>"));
    let app = test_router(fetcher.clone(), model.clone());

    let payload = valid_payload();
    let resp = get(app, &format!("/recap?payload={payload}&code={CODE}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    assert!(content_type.starts_with("text/html"));
    assert_eq!(read_body(resp).await, "<h1>The article</h1><p>recap</p>");

    // One model call, built from the re-fetched article.
    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    let (system, user) = &calls[0];
    assert_eq!(system, RECAP_SYSTEM_PROMPT);
    let input: serde_json::Value = serde_json::from_str(user).unwrap();
    assert_eq!(input["title"], "The article");
    assert_eq!(input["content"], "<p>the full body</p>");
    assert_eq!(input["link"], ARTICLE);
}

#[tokio::test]
async fn model_failure_is_500_distinct_from_not_found() {
    let fetcher = Arc::new(StubFetcher::with(vec![feed_article()]));
    let app = test_router(fetcher, Arc::new(StubModel::failing("provider down")));

    let payload = valid_payload();
    let resp = get(app, &format!("/recap?payload={payload}&code={CODE}")).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
