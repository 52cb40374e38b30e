use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::crm::entities::CallLog;
use crate::domain::crm::errors::CrmError;
use crate::domain::crm::ports::CallLogRepository;

#[derive(Default)]
pub struct InMemoryCallLogRepository {
  call_logs: RwLock<HashMap<Uuid, CallLog>>,
}

impl InMemoryCallLogRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl CallLogRepository for InMemoryCallLogRepository {
  async fn create(&self, call_log: CallLog) -> Result<CallLog, CrmError> {
    let mut call_logs = self.call_logs.write().unwrap();
    call_logs.insert(call_log.id, call_log.clone());
    Ok(call_log)
  }

  async fn update(&self, call_log: CallLog) -> Result<CallLog, CrmError> {
    let mut call_logs = self.call_logs.write().unwrap();
    if !call_logs.contains_key(&call_log.id) {
      return Err(CrmError::CallLogNotFound(call_log.id));
    }
    call_logs.insert(call_log.id, call_log.clone());
    Ok(call_log)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<CallLog>, CrmError> {
    let call_logs = self.call_logs.read().unwrap();
    Ok(call_logs.get(&id).cloned())
  }

  async fn find_created_after(&self, since: DateTime<Utc>) -> Result<Vec<CallLog>, CrmError> {
    let call_logs = self.call_logs.read().unwrap();
    Ok(
      call_logs
        .values()
        .filter(|c| c.created_at >= since)
        .cloned()
        .collect(),
    )
  }
}
