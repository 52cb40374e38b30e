use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{info, warn};

use super::config::SchedulerConfig;
use crate::domain::automation::{AutomationJob, AutomationService};

/// Runs each automation job on its own tokio interval timer. Jobs tick
/// independently and may overlap; every run gets a fresh wall-clock instant.
pub struct AutomationScheduler {
  automation: Arc<AutomationService>,
  config: SchedulerConfig,
}

impl AutomationScheduler {
  pub fn new(automation: Arc<AutomationService>, config: SchedulerConfig) -> Self {
    Self { automation, config }
  }

  /// Spawn one background loop per job. Handles are returned so the caller
  /// can abort them on shutdown.
  pub fn spawn_all(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
    AutomationJob::all()
      .into_iter()
      .map(|job| {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run_job_loop(job).await })
      })
      .collect()
  }

  async fn run_job_loop(&self, job: AutomationJob) {
    let period = Duration::from_secs(self.config.interval_for(job));
    info!(
      job = job.as_str(),
      period_seconds = period.as_secs(),
      "Starting automation job loop"
    );

    let mut ticker = interval(period);
    loop {
      ticker.tick().await;

      let summary = self.automation.run(job, Utc::now()).await;
      if summary.failures() > 0 {
        warn!(
          job = job.as_str(),
          failures = summary.failures(),
          "Automation job finished with failures"
        );
      }
    }
  }
}
