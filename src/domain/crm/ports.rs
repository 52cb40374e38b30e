use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::{CallLog, Lead};
use super::errors::CrmError;

#[async_trait]
pub trait LeadRepository: Send + Sync {
  async fn create(&self, lead: Lead) -> Result<Lead, CrmError>;
  async fn update(&self, lead: Lead) -> Result<Lead, CrmError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, CrmError>;

  /// Leads still being worked: status Open or In Progress.
  async fn find_open(&self) -> Result<Vec<Lead>, CrmError>;

  /// Leads currently sitting in the given pipeline stage, any status.
  async fn find_in_stage(&self, stage: &str) -> Result<Vec<Lead>, CrmError>;
}

#[async_trait]
pub trait CallLogRepository: Send + Sync {
  async fn create(&self, call_log: CallLog) -> Result<CallLog, CrmError>;
  async fn update(&self, call_log: CallLog) -> Result<CallLog, CrmError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<CallLog>, CrmError>;
  async fn find_created_after(&self, since: DateTime<Utc>) -> Result<Vec<CallLog>, CrmError>;
}
