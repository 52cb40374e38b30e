use super::value_objects::ValueObjectError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CrmError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Invalid lead data: {0}")]
  InvalidLead(String),

  #[error("Unknown pipeline stage: {0}")]
  UnknownStage(String),

  #[error("Unknown lead source: {0}")]
  UnknownSource(String),

  #[error("Lead not found: {0}")]
  LeadNotFound(Uuid),

  #[error("Call log not found: {0}")]
  CallLogNotFound(Uuid),

  #[error("Database error: {0}")]
  Database(#[from] mongodb::error::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}
