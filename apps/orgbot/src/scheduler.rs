//! Twice-daily batch scheduler.
//!
//! Runs the reconciliation batch over the configured default range at
//! fixed UTC times. A failed run is logged and the loop waits for the
//! next slot; every batch is idempotent, so overlap with an HTTP-triggered
//! run is harmless.

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use orgbot_api::{BatchSummary, ReconcileEngine, RowSource};

/// Delay from `now` until the next scheduled run time.
///
/// Run times are interpreted in UTC. When every slot for today has
/// passed, the earliest slot tomorrow is used.
pub fn next_run_delay(now: DateTime<Utc>, times: &[NaiveTime]) -> Duration {
    let today = now.date_naive();
    let mut candidates: Vec<DateTime<Utc>> = times
        .iter()
        .map(|t| today.and_time(*t).and_utc())
        .filter(|at| *at > now)
        .collect();
    if candidates.is_empty() {
        let tomorrow = today + ChronoDuration::days(1);
        candidates = times
            .iter()
            .map(|t| tomorrow.and_time(*t).and_utc())
            .collect();
    }
    let next = candidates.into_iter().min().unwrap_or(now);
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// Run the scheduled batch loop forever.
pub async fn run_scheduler(
    engine: Arc<ReconcileEngine>,
    rows: Arc<dyn RowSource>,
    start: String,
    end: String,
    times: Vec<NaiveTime>,
) {
    info!(times = ?times, start = %start, end = %end, "batch scheduler started");
    loop {
        let delay = next_run_delay(Utc::now(), &times);
        info!(next_run_in_secs = delay.as_secs(), "waiting for next scheduled run");
        tokio::time::sleep(delay).await;

        let fetched = match rows.fetch_range(&start, &end).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(start = %start, end = %end, error = %e, "scheduled run failed to fetch rows");
                continue;
            }
        };

        let results = engine.reconcile_batch(&fetched).await;
        let summary = BatchSummary::from_results(&results);
        info!(
            rows = fetched.len(),
            invited = summary.invited,
            already_member = summary.already_member,
            already_resolved = summary.already_resolved,
            failed = summary.failed,
            aborted = summary.aborted,
            "scheduled batch completed"
        );
    }
}
