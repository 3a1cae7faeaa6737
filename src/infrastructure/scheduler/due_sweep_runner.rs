//! Daily timer that runs the recurring invoice sweep
//!
//! The runner sleeps until the configured UTC time of day, runs one sweep,
//! and repeats until the cancellation token fires.

use chrono::{DateTime, Days, NaiveTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::domain::recurring::RecurringService;

/// Time left until the next occurrence of `run_at`, strictly after `now`
pub fn duration_until_next_run(now: DateTime<Utc>, run_at: NaiveTime) -> Duration {
  let today_run = now.date_naive().and_time(run_at).and_utc();
  let next_run = if today_run > now {
    today_run
  } else {
    today_run
      .checked_add_days(Days::new(1))
      .unwrap_or(today_run)
  };
  (next_run - now).to_std().unwrap_or(Duration::ZERO)
}

pub struct DueSweepRunner {
  service: Arc<RecurringService>,
  run_at: NaiveTime,
  run_on_startup: bool,
}

impl DueSweepRunner {
  pub fn new(service: Arc<RecurringService>, run_at: NaiveTime) -> Self {
    Self {
      service,
      run_at,
      run_on_startup: false,
    }
  }

  pub fn run_on_startup(mut self, enabled: bool) -> Self {
    self.run_on_startup = enabled;
    self
  }

  /// Runs until `shutdown` is cancelled. A sweep in progress is finished
  /// before the loop exits.
  pub async fn run(self, shutdown: CancellationToken) {
    tracing::info!(run_at = %self.run_at, "Recurring invoice scheduler started");

    if self.run_on_startup && !shutdown.is_cancelled() {
      self.sweep().await;
    }

    loop {
      let wait = duration_until_next_run(Utc::now(), self.run_at);
      tracing::debug!(seconds = wait.as_secs(), "Waiting for next sweep");

      tokio::select! {
        _ = shutdown.cancelled() => {
          tracing::info!("Recurring invoice scheduler shutting down");
          break;
        }
        _ = tokio::time::sleep(wait) => {
          self.sweep().await;
        }
      }
    }

    tracing::info!("Recurring invoice scheduler stopped");
  }

  async fn sweep(&self) {
    match self.service.process_due_schedules().await {
      Ok(report) if report.failed > 0 => {
        tracing::warn!(
          processed = report.processed,
          failed = report.failed,
          "Sweep finished with failures"
        );
      }
      Ok(_) => {}
      Err(e) => {
        tracing::error!(error = %e, "Could not load due schedules");
      }
    }
  }
}
