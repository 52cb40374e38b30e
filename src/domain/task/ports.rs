use async_trait::async_trait;
use uuid::Uuid;

use super::entities::Task;
use super::errors::TaskError;
use super::value_objects::RecordModule;

#[async_trait]
pub trait TaskRepository: Send + Sync {
  async fn create(&self, task: Task) -> Result<Task, TaskError>;
  async fn update(&self, task: Task) -> Result<Task, TaskError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, TaskError>;

  /// Open tasks whose weak reference points into the given module. The
  /// automation rules use this for their duplicate checks.
  async fn find_open_for_module(&self, module: RecordModule) -> Result<Vec<Task>, TaskError>;
}
