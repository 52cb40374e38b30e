use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::task::entities::Task;
use crate::domain::task::errors::TaskError;
use crate::domain::task::ports::TaskRepository;
use crate::domain::task::value_objects::RecordModule;

#[derive(Default)]
pub struct InMemoryTaskRepository {
  tasks: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryTaskRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
  async fn create(&self, task: Task) -> Result<Task, TaskError> {
    let mut tasks = self.tasks.write().unwrap();
    tasks.insert(task.id, task.clone());
    Ok(task)
  }

  async fn update(&self, task: Task) -> Result<Task, TaskError> {
    let mut tasks = self.tasks.write().unwrap();
    if !tasks.contains_key(&task.id) {
      return Err(TaskError::TaskNotFound(task.id));
    }
    tasks.insert(task.id, task.clone());
    Ok(task)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, TaskError> {
    let tasks = self.tasks.read().unwrap();
    Ok(tasks.get(&id).cloned())
  }

  async fn find_open_for_module(&self, module: RecordModule) -> Result<Vec<Task>, TaskError> {
    let tasks = self.tasks.read().unwrap();
    Ok(
      tasks
        .values()
        .filter(|t| t.is_open() && t.related_to.map(|r| r.module) == Some(module))
        .cloned()
        .collect(),
    )
  }
}
