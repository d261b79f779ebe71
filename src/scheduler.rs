// src/scheduler.rs
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveTime};
use tokio::task::JoinHandle;

use crate::ai::ChatModel;
use crate::config::Settings;
use crate::digest;
use crate::ingest::types::FeedFetcher;
use crate::notify::Dispatcher;

/// The digest goes out once a day at this local hour.
pub const DIGEST_HOUR: u32 = 6;

/// Time left until the next `hour:00:00` local, strictly in the future.
pub fn until_next_run(now: DateTime<Local>, hour: u32) -> std::time::Duration {
    let at = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let mut next = now.date_naive().and_time(at);
    if next <= now.naive_local() {
        next += ChronoDuration::days(1);
    }
    match next.and_local_timezone(Local) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => {
            (dt - now).to_std().unwrap_or_default()
        }
        // The target fell into a DST gap; a flat day keeps the cadence.
        chrono::LocalResult::None => std::time::Duration::from_secs(24 * 3600),
    }
}

/// Spawn the daily scheduler. Each tick runs the full pipeline behind its
/// error boundary; the task never exits.
pub fn spawn_daily_digest(
    settings: Arc<Settings>,
    fetcher: Arc<dyn FeedFetcher>,
    model: Arc<dyn ChatModel>,
    dispatcher: Arc<dyn Dispatcher>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = until_next_run(Local::now(), DIGEST_HOUR);
            tracing::info!(seconds = wait.as_secs(), "next digest run scheduled");
            tokio::time::sleep(wait).await;
            digest::run_scheduled(
                &settings,
                fetcher.as_ref(),
                model.as_ref(),
                dispatcher.as_ref(),
            )
            .await;
        }
    })
}
