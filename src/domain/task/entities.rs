use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::TaskError;
use super::value_objects::{RelatedTo, TaskPriority, TaskStatus};

// Task - work item created by users or by the automation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  pub id: Uuid,
  pub title: String,
  pub description: String,
  pub priority: TaskPriority,
  pub status: TaskStatus,
  pub due_date: DateTime<Utc>,
  pub assigned_to: Option<Uuid>,
  pub related_to: Option<RelatedTo>,
  /// None for tasks raised by the automation engine.
  pub created_by: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Task {
  pub fn new(
    title: String,
    description: String,
    priority: TaskPriority,
    due_date: DateTime<Utc>,
    assigned_to: Option<Uuid>,
    related_to: Option<RelatedTo>,
    created_by: Option<Uuid>,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      title,
      description,
      priority,
      status: TaskStatus::ToDo,
      due_date,
      assigned_to,
      related_to,
      created_by,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn change_status(&mut self, new_status: TaskStatus) -> Result<(), TaskError> {
    if !self.status.can_transition_to(new_status) {
      return Err(TaskError::InvalidTransition {
        from: self.status.as_str().to_string(),
        to: new_status.as_str().to_string(),
      });
    }
    self.status = new_status;
    self.updated_at = Utc::now();
    Ok(())
  }

  pub fn is_open(&self) -> bool {
    self.status.is_open()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::task::value_objects::RecordModule;
  use chrono::Duration;

  fn task() -> Task {
    Task::new(
      "Follow up with lead".to_string(),
      "No activity for a week".to_string(),
      TaskPriority::High,
      Utc::now() + Duration::days(1),
      None,
      Some(RelatedTo::new(RecordModule::Lead, Uuid::new_v4())),
      None,
    )
  }

  #[test]
  fn test_new_task_is_open() {
    let task = task();
    assert_eq!(task.status, TaskStatus::ToDo);
    assert!(task.is_open());
  }

  #[test]
  fn test_status_transitions() {
    let mut task = task();
    task.change_status(TaskStatus::InProgress).unwrap();
    task.change_status(TaskStatus::Completed).unwrap();
    assert!(!task.is_open());
    assert!(task.change_status(TaskStatus::ToDo).is_err());
  }
}
