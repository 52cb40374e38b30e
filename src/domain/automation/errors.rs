use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutomationError {
  #[error("Permission denied: {0}")]
  PermissionDenied(String),

  #[error("Unknown automation job: {0}")]
  UnknownJob(String),
}
