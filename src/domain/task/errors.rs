use super::value_objects::ValueObjectError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TaskError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Invalid status transition: {from} -> {to}")]
  InvalidTransition { from: String, to: String },

  #[error("Task not found: {0}")]
  TaskNotFound(Uuid),

  #[error("Database error: {0}")]
  Database(#[from] mongodb::error::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}
