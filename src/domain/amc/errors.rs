use super::value_objects::ValueObjectError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AmcError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Invalid status transition: {from} -> {to}")]
  InvalidTransition { from: String, to: String },

  #[error("Invalid date range: {0}")]
  InvalidDateRange(String),

  #[error("Contract not found: {0}")]
  ContractNotFound(Uuid),

  #[error("Service visit not found: {0}")]
  ServiceNotFound(Uuid),

  #[error("Database error: {0}")]
  Database(#[from] mongodb::error::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}
