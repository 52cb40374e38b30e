pub mod run_automation_job;

pub use run_automation_job::{
  RunAutomationJobCommand, RunAutomationJobResponse, RunAutomationJobUseCase,
};
