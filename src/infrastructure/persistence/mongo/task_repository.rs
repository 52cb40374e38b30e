use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel, bson::doc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::task::entities::Task;
use crate::domain::task::errors::TaskError;
use crate::domain::task::ports::TaskRepository;
use crate::domain::task::value_objects::{RecordModule, RelatedTo, TaskPriority, TaskStatus};

use super::parse_uuid;

#[derive(Debug, Serialize, Deserialize)]
struct RelatedToDocument {
  module: String,
  record_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskDocument {
  #[serde(rename = "_id")]
  id: String,
  title: String,
  description: String,
  priority: String,
  status: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  due_date: DateTime<Utc>,
  assigned_to: Option<String>,
  related_to: Option<RelatedToDocument>,
  created_by: Option<String>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  created_at: DateTime<Utc>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskDocument {
  fn from(task: &Task) -> Self {
    Self {
      id: task.id.to_string(),
      title: task.title.clone(),
      description: task.description.clone(),
      priority: task.priority.as_str().to_string(),
      status: task.status.as_str().to_string(),
      due_date: task.due_date,
      assigned_to: task.assigned_to.map(|id| id.to_string()),
      related_to: task.related_to.map(|related| RelatedToDocument {
        module: related.module.as_str().to_string(),
        record_id: related.record_id.to_string(),
      }),
      created_by: task.created_by.map(|id| id.to_string()),
      created_at: task.created_at,
      updated_at: task.updated_at,
    }
  }
}

impl TryFrom<TaskDocument> for Task {
  type Error = TaskError;

  fn try_from(doc: TaskDocument) -> Result<Self, Self::Error> {
    let related_to = doc
      .related_to
      .map(|related| -> Result<RelatedTo, TaskError> {
        Ok(RelatedTo::new(
          RecordModule::from_str(&related.module)?,
          parse_uuid(&related.record_id, "related record id").map_err(TaskError::Internal)?,
        ))
      })
      .transpose()?;

    Ok(Task {
      id: parse_uuid(&doc.id, "task id").map_err(TaskError::Internal)?,
      title: doc.title,
      description: doc.description,
      priority: TaskPriority::from_str(&doc.priority)?,
      status: TaskStatus::from_str(&doc.status)?,
      due_date: doc.due_date,
      assigned_to: doc
        .assigned_to
        .map(|id| parse_uuid(&id, "assigned to"))
        .transpose()
        .map_err(TaskError::Internal)?,
      related_to,
      created_by: doc
        .created_by
        .map(|id| parse_uuid(&id, "created by"))
        .transpose()
        .map_err(TaskError::Internal)?,
      created_at: doc.created_at,
      updated_at: doc.updated_at,
    })
  }
}

pub struct MongoTaskRepository {
  collection: Collection<TaskDocument>,
}

impl MongoTaskRepository {
  pub fn new(db: &Database) -> Self {
    Self {
      collection: db.collection("tasks"),
    }
  }

  /// Index backing the open-task duplicate checks.
  pub async fn init_indexes(&self) -> Result<(), TaskError> {
    let dedup_index = IndexModel::builder()
      .keys(doc! { "status": 1, "related_to.module": 1, "related_to.record_id": 1 })
      .options(
        IndexOptions::builder()
          .name("task_dedup_idx".to_string())
          .build(),
      )
      .build();

    self.collection.create_indexes([dedup_index], None).await?;
    Ok(())
  }
}

#[async_trait]
impl TaskRepository for MongoTaskRepository {
  async fn create(&self, task: Task) -> Result<Task, TaskError> {
    self
      .collection
      .insert_one(TaskDocument::from(&task), None)
      .await?;
    Ok(task)
  }

  async fn update(&self, task: Task) -> Result<Task, TaskError> {
    let result = self
      .collection
      .replace_one(doc! { "_id": task.id.to_string() }, TaskDocument::from(&task), None)
      .await?;

    if result.matched_count == 0 {
      return Err(TaskError::TaskNotFound(task.id));
    }
    Ok(task)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, TaskError> {
    let document = self
      .collection
      .find_one(doc! { "_id": id.to_string() }, None)
      .await?;
    document.map(Task::try_from).transpose()
  }

  async fn find_open_for_module(&self, module: RecordModule) -> Result<Vec<Task>, TaskError> {
    let filter = doc! {
      "status": { "$in": ["to_do", "in_progress", "on_hold"] },
      "related_to.module": module.as_str(),
    };
    let cursor = self.collection.find(filter, None).await?;
    let documents: Vec<TaskDocument> = cursor.try_collect().await?;
    documents.into_iter().map(Task::try_from).collect()
  }
}
