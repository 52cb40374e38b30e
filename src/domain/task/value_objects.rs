use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid status: {0}")]
  InvalidStatus(String),
  #[error("Invalid priority: {0}")]
  InvalidPriority(String),
  #[error("Invalid record module: {0}")]
  InvalidModule(String),
}

// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
  ToDo,
  InProgress,
  Completed,
  Cancelled,
  OnHold,
}

impl TaskStatus {
  pub fn can_transition_to(&self, new_status: TaskStatus) -> bool {
    match (self, new_status) {
      (TaskStatus::ToDo, TaskStatus::InProgress) => true,
      (TaskStatus::ToDo, TaskStatus::Completed) => true,
      (TaskStatus::ToDo, TaskStatus::Cancelled) => true,
      (TaskStatus::ToDo, TaskStatus::OnHold) => true,
      (TaskStatus::InProgress, TaskStatus::Completed) => true,
      (TaskStatus::InProgress, TaskStatus::Cancelled) => true,
      (TaskStatus::InProgress, TaskStatus::OnHold) => true,
      (TaskStatus::OnHold, TaskStatus::ToDo) => true,
      (TaskStatus::OnHold, TaskStatus::InProgress) => true,
      (TaskStatus::OnHold, TaskStatus::Cancelled) => true,
      _ => false,
    }
  }

  /// Open tasks block duplicate automation tasks for the same record.
  pub fn is_open(&self) -> bool {
    !matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      TaskStatus::ToDo => "to_do",
      TaskStatus::InProgress => "in_progress",
      TaskStatus::Completed => "completed",
      TaskStatus::Cancelled => "cancelled",
      TaskStatus::OnHold => "on_hold",
    }
  }
}

impl FromStr for TaskStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "to_do" => Ok(TaskStatus::ToDo),
      "in_progress" => Ok(TaskStatus::InProgress),
      "completed" => Ok(TaskStatus::Completed),
      "cancelled" => Ok(TaskStatus::Cancelled),
      "on_hold" => Ok(TaskStatus::OnHold),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown task status: {}",
        s
      ))),
    }
  }
}

// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
  Low,
  Medium,
  High,
  Critical,
}

impl TaskPriority {
  pub fn as_str(&self) -> &'static str {
    match self {
      TaskPriority::Low => "low",
      TaskPriority::Medium => "medium",
      TaskPriority::High => "high",
      TaskPriority::Critical => "critical",
    }
  }
}

impl FromStr for TaskPriority {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "low" => Ok(TaskPriority::Low),
      "medium" => Ok(TaskPriority::Medium),
      "high" => Ok(TaskPriority::High),
      "critical" => Ok(TaskPriority::Critical),
      _ => Err(ValueObjectError::InvalidPriority(format!(
        "Unknown task priority: {}",
        s
      ))),
    }
  }
}

/// Module kind a task can point at through its weak reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordModule {
  Lead,
  Client,
  Quotation,
  Invoice,
  Payment,
  Amc,
  CallLog,
}

impl RecordModule {
  pub fn as_str(&self) -> &'static str {
    match self {
      RecordModule::Lead => "lead",
      RecordModule::Client => "client",
      RecordModule::Quotation => "quotation",
      RecordModule::Invoice => "invoice",
      RecordModule::Payment => "payment",
      RecordModule::Amc => "amc",
      RecordModule::CallLog => "call_log",
    }
  }
}

impl FromStr for RecordModule {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "lead" => Ok(RecordModule::Lead),
      "client" => Ok(RecordModule::Client),
      "quotation" => Ok(RecordModule::Quotation),
      "invoice" => Ok(RecordModule::Invoice),
      "payment" => Ok(RecordModule::Payment),
      "amc" => Ok(RecordModule::Amc),
      "call_log" => Ok(RecordModule::CallLog),
      _ => Err(ValueObjectError::InvalidModule(format!(
        "Unknown record module: {}",
        s
      ))),
    }
  }
}

/// Weak, purely informational reference from a task to the record that
/// triggered it. Resolved by explicit per-module lookup, never an ownership
/// edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTo {
  pub module: RecordModule,
  pub record_id: Uuid,
}

impl RelatedTo {
  pub fn new(module: RecordModule, record_id: Uuid) -> Self {
    Self { module, record_id }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_task_status_transitions() {
    assert!(TaskStatus::ToDo.can_transition_to(TaskStatus::InProgress));
    assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Completed));
    assert!(TaskStatus::OnHold.can_transition_to(TaskStatus::InProgress));
    assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::ToDo));
    assert!(!TaskStatus::Cancelled.can_transition_to(TaskStatus::InProgress));
  }

  #[test]
  fn test_open_statuses() {
    assert!(TaskStatus::ToDo.is_open());
    assert!(TaskStatus::InProgress.is_open());
    assert!(TaskStatus::OnHold.is_open());
    assert!(!TaskStatus::Completed.is_open());
    assert!(!TaskStatus::Cancelled.is_open());
  }

  #[test]
  fn test_related_to_serde_round_trip() {
    let related = RelatedTo::new(RecordModule::Invoice, Uuid::new_v4());
    let json = serde_json::to_string(&related).unwrap();
    let back: RelatedTo = serde_json::from_str(&json).unwrap();
    assert_eq!(related, back);
  }
}
