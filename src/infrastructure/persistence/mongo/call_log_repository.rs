use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use mongodb::{Collection, Database, bson, bson::doc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::crm::entities::CallLog;
use crate::domain::crm::errors::CrmError;
use crate::domain::crm::ports::CallLogRepository;
use crate::domain::crm::value_objects::CallOutcome;

use super::parse_uuid;

#[derive(Debug, Serialize, Deserialize)]
struct CallLogDocument {
  #[serde(rename = "_id")]
  id: String,
  lead_id: String,
  client_id: Option<String>,
  outcome: String,
  notes: Option<String>,
  follow_up_required: bool,
  created_by: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  created_at: DateTime<Utc>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  updated_at: DateTime<Utc>,
}

impl From<&CallLog> for CallLogDocument {
  fn from(call_log: &CallLog) -> Self {
    Self {
      id: call_log.id.to_string(),
      lead_id: call_log.lead_id.to_string(),
      client_id: call_log.client_id.map(|id| id.to_string()),
      outcome: call_log.outcome.as_str().to_string(),
      notes: call_log.notes.clone(),
      follow_up_required: call_log.follow_up_required,
      created_by: call_log.created_by.to_string(),
      created_at: call_log.created_at,
      updated_at: call_log.updated_at,
    }
  }
}

impl TryFrom<CallLogDocument> for CallLog {
  type Error = CrmError;

  fn try_from(doc: CallLogDocument) -> Result<Self, Self::Error> {
    Ok(CallLog {
      id: parse_uuid(&doc.id, "call log id").map_err(CrmError::Internal)?,
      lead_id: parse_uuid(&doc.lead_id, "lead id").map_err(CrmError::Internal)?,
      client_id: doc
        .client_id
        .map(|id| parse_uuid(&id, "client id"))
        .transpose()
        .map_err(CrmError::Internal)?,
      outcome: CallOutcome::from_str(&doc.outcome)?,
      notes: doc.notes,
      follow_up_required: doc.follow_up_required,
      created_by: parse_uuid(&doc.created_by, "created by").map_err(CrmError::Internal)?,
      created_at: doc.created_at,
      updated_at: doc.updated_at,
    })
  }
}

pub struct MongoCallLogRepository {
  collection: Collection<CallLogDocument>,
}

impl MongoCallLogRepository {
  pub fn new(db: &Database) -> Self {
    Self {
      collection: db.collection("call_logs"),
    }
  }
}

#[async_trait]
impl CallLogRepository for MongoCallLogRepository {
  async fn create(&self, call_log: CallLog) -> Result<CallLog, CrmError> {
    self
      .collection
      .insert_one(CallLogDocument::from(&call_log), None)
      .await?;
    Ok(call_log)
  }

  async fn update(&self, call_log: CallLog) -> Result<CallLog, CrmError> {
    let result = self
      .collection
      .replace_one(
        doc! { "_id": call_log.id.to_string() },
        CallLogDocument::from(&call_log),
        None,
      )
      .await?;

    if result.matched_count == 0 {
      return Err(CrmError::CallLogNotFound(call_log.id));
    }
    Ok(call_log)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<CallLog>, CrmError> {
    let document = self
      .collection
      .find_one(doc! { "_id": id.to_string() }, None)
      .await?;
    document.map(CallLog::try_from).transpose()
  }

  async fn find_created_after(&self, since: DateTime<Utc>) -> Result<Vec<CallLog>, CrmError> {
    let filter = doc! {
      "created_at": { "$gte": bson::DateTime::from_chrono(since) },
    };
    let cursor = self.collection.find(filter, None).await?;
    let documents: Vec<CallLogDocument> = cursor.try_collect().await?;
    documents.into_iter().map(CallLog::try_from).collect()
  }
}
