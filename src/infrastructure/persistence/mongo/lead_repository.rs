use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use mongodb::{Collection, Database, bson::doc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::crm::entities::{Lead, LeadNote};
use crate::domain::crm::errors::CrmError;
use crate::domain::crm::ports::LeadRepository;
use crate::domain::crm::value_objects::{LeadPriority, LeadStatus};

use super::{parse_decimal, parse_uuid};

#[derive(Debug, Serialize, Deserialize)]
struct LeadNoteDocument {
  body: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LeadDocument {
  #[serde(rename = "_id")]
  id: String,
  client_id: Option<String>,
  title: String,
  contact_name: Option<String>,
  source: Option<String>,
  status: String,
  stage: String,
  probability: i32,
  priority: String,
  expected_revenue: String,
  converted: bool,
  lost_reason: Option<String>,
  notes: Vec<LeadNoteDocument>,
  created_by: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  created_at: DateTime<Utc>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  updated_at: DateTime<Utc>,
}

impl From<&Lead> for LeadDocument {
  fn from(lead: &Lead) -> Self {
    Self {
      id: lead.id.to_string(),
      client_id: lead.client_id.map(|id| id.to_string()),
      title: lead.title.clone(),
      contact_name: lead.contact_name.clone(),
      source: lead.source.clone(),
      status: lead.status.as_str().to_string(),
      stage: lead.stage.clone(),
      probability: i32::from(lead.probability),
      priority: lead.priority.as_str().to_string(),
      expected_revenue: lead.expected_revenue.to_string(),
      converted: lead.converted,
      lost_reason: lead.lost_reason.clone(),
      notes: lead
        .notes
        .iter()
        .map(|note| LeadNoteDocument {
          body: note.body.clone(),
          created_at: note.created_at,
        })
        .collect(),
      created_by: lead.created_by.to_string(),
      created_at: lead.created_at,
      updated_at: lead.updated_at,
    }
  }
}

impl TryFrom<LeadDocument> for Lead {
  type Error = CrmError;

  fn try_from(doc: LeadDocument) -> Result<Self, Self::Error> {
    Ok(Lead {
      id: parse_uuid(&doc.id, "lead id").map_err(CrmError::Internal)?,
      client_id: doc
        .client_id
        .map(|id| parse_uuid(&id, "client id"))
        .transpose()
        .map_err(CrmError::Internal)?,
      title: doc.title,
      contact_name: doc.contact_name,
      source: doc.source,
      status: LeadStatus::from_str(&doc.status)?,
      stage: doc.stage,
      probability: u8::try_from(doc.probability).unwrap_or(0),
      priority: LeadPriority::from_str(&doc.priority)?,
      expected_revenue: parse_decimal(&doc.expected_revenue, "expected revenue")
        .map_err(CrmError::Internal)?,
      converted: doc.converted,
      lost_reason: doc.lost_reason,
      notes: doc
        .notes
        .into_iter()
        .map(|note| LeadNote {
          body: note.body,
          created_at: note.created_at,
        })
        .collect(),
      created_by: parse_uuid(&doc.created_by, "created by").map_err(CrmError::Internal)?,
      created_at: doc.created_at,
      updated_at: doc.updated_at,
    })
  }
}

pub struct MongoLeadRepository {
  collection: Collection<LeadDocument>,
}

impl MongoLeadRepository {
  pub fn new(db: &Database) -> Self {
    Self {
      collection: db.collection("leads"),
    }
  }
}

#[async_trait]
impl LeadRepository for MongoLeadRepository {
  async fn create(&self, lead: Lead) -> Result<Lead, CrmError> {
    self
      .collection
      .insert_one(LeadDocument::from(&lead), None)
      .await?;
    Ok(lead)
  }

  async fn update(&self, lead: Lead) -> Result<Lead, CrmError> {
    let result = self
      .collection
      .replace_one(doc! { "_id": lead.id.to_string() }, LeadDocument::from(&lead), None)
      .await?;

    if result.matched_count == 0 {
      return Err(CrmError::LeadNotFound(lead.id));
    }
    Ok(lead)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, CrmError> {
    let document = self
      .collection
      .find_one(doc! { "_id": id.to_string() }, None)
      .await?;
    document.map(Lead::try_from).transpose()
  }

  async fn find_open(&self) -> Result<Vec<Lead>, CrmError> {
    let cursor = self
      .collection
      .find(doc! { "status": { "$in": ["open", "in_progress"] } }, None)
      .await?;
    let documents: Vec<LeadDocument> = cursor.try_collect().await?;
    documents.into_iter().map(Lead::try_from).collect()
  }

  async fn find_in_stage(&self, stage: &str) -> Result<Vec<Lead>, CrmError> {
    let cursor = self.collection.find(doc! { "stage": stage }, None).await?;
    let documents: Vec<LeadDocument> = cursor.try_collect().await?;
    documents.into_iter().map(Lead::try_from).collect()
  }
}
