use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::access::{Capability, Role};
use crate::domain::automation::{AutomationError, AutomationJob, AutomationService};

/// Manual trigger for a single automation job, outside its schedule.
#[derive(Debug, Deserialize)]
pub struct RunAutomationJobCommand {
  pub actor_role: Role,
  pub job: String,
}

#[derive(Debug, Serialize)]
pub struct RunAutomationJobResponse {
  pub job: String,
  pub effects_applied: usize,
  pub failures: usize,
}

pub struct RunAutomationJobUseCase {
  automation_service: Arc<AutomationService>,
}

impl RunAutomationJobUseCase {
  pub fn new(automation_service: Arc<AutomationService>) -> Self {
    Self { automation_service }
  }

  pub async fn execute(
    &self,
    command: RunAutomationJobCommand,
  ) -> Result<RunAutomationJobResponse, AutomationError> {
    if !command.actor_role.has_capability(Capability::ManageAutomation) {
      return Err(AutomationError::PermissionDenied(
        "Role is not allowed to trigger automation jobs".to_string(),
      ));
    }

    let job = AutomationJob::from_str(&command.job)?;
    let summary = self.automation_service.run(job, Utc::now()).await;

    Ok(RunAutomationJobResponse {
      job: job.as_str().to_string(),
      effects_applied: summary.effects_applied(),
      failures: summary.failures(),
    })
  }
}
