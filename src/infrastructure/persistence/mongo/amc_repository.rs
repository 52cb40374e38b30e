use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel, bson, bson::doc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::amc::entities::{AmcContract, ServiceVisit};
use crate::domain::amc::errors::AmcError;
use crate::domain::amc::ports::AmcRepository;
use crate::domain::amc::value_objects::{
  AmcStatus, ContractValue, ServiceFrequency, ServiceStatus,
};

use super::{parse_decimal, parse_uuid};

#[derive(Debug, Serialize, Deserialize)]
struct ServiceVisitDocument {
  id: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  scheduled_date: DateTime<Utc>,
  status: String,
  completed_at: Option<DateTime<Utc>>,
  completed_by: Option<String>,
  notes: Option<String>,
}

impl From<&ServiceVisit> for ServiceVisitDocument {
  fn from(visit: &ServiceVisit) -> Self {
    Self {
      id: visit.id.to_string(),
      scheduled_date: visit.scheduled_date,
      status: visit.status.as_str().to_string(),
      completed_at: visit.completed_at,
      completed_by: visit.completed_by.map(|id| id.to_string()),
      notes: visit.notes.clone(),
    }
  }
}

impl TryFrom<ServiceVisitDocument> for ServiceVisit {
  type Error = AmcError;

  fn try_from(doc: ServiceVisitDocument) -> Result<Self, Self::Error> {
    Ok(ServiceVisit {
      id: parse_uuid(&doc.id, "service visit id").map_err(AmcError::Internal)?,
      scheduled_date: doc.scheduled_date,
      status: ServiceStatus::from_str(&doc.status)?,
      completed_at: doc.completed_at,
      completed_by: doc
        .completed_by
        .map(|id| parse_uuid(&id, "completed by"))
        .transpose()
        .map_err(AmcError::Internal)?,
      notes: doc.notes,
    })
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct AmcDocument {
  #[serde(rename = "_id")]
  id: String,
  client_id: String,
  contract_number: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  start_date: DateTime<Utc>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  end_date: DateTime<Utc>,
  duration_months: u32,
  service_frequency: String,
  number_of_services: u32,
  services_completed: u32,
  contract_value: String,
  payment_terms: Option<String>,
  assigned_to: Option<String>,
  status: String,
  auto_renewal: bool,
  renewal_notification_sent: bool,
  renewed_from: Option<String>,
  renewed_to: Option<String>,
  services: Vec<ServiceVisitDocument>,
  created_by: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  created_at: DateTime<Utc>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  updated_at: DateTime<Utc>,
}

impl From<&AmcContract> for AmcDocument {
  fn from(contract: &AmcContract) -> Self {
    Self {
      id: contract.id.to_string(),
      client_id: contract.client_id.to_string(),
      contract_number: contract.contract_number.clone(),
      start_date: contract.start_date,
      end_date: contract.end_date,
      duration_months: contract.duration_months,
      service_frequency: contract.service_frequency.as_str().to_string(),
      number_of_services: contract.number_of_services,
      services_completed: contract.services_completed,
      contract_value: contract.contract_value.value().to_string(),
      payment_terms: contract.payment_terms.clone(),
      assigned_to: contract.assigned_to.map(|id| id.to_string()),
      status: contract.status.as_str().to_string(),
      auto_renewal: contract.auto_renewal,
      renewal_notification_sent: contract.renewal_notification_sent,
      renewed_from: contract.renewed_from.map(|id| id.to_string()),
      renewed_to: contract.renewed_to.map(|id| id.to_string()),
      services: contract.services.iter().map(Into::into).collect(),
      created_by: contract.created_by.to_string(),
      created_at: contract.created_at,
      updated_at: contract.updated_at,
    }
  }
}

impl TryFrom<AmcDocument> for AmcContract {
  type Error = AmcError;

  fn try_from(doc: AmcDocument) -> Result<Self, Self::Error> {
    let services = doc
      .services
      .into_iter()
      .map(ServiceVisit::try_from)
      .collect::<Result<Vec<_>, _>>()?;

    Ok(AmcContract {
      id: parse_uuid(&doc.id, "contract id").map_err(AmcError::Internal)?,
      client_id: parse_uuid(&doc.client_id, "client id").map_err(AmcError::Internal)?,
      contract_number: doc.contract_number,
      start_date: doc.start_date,
      end_date: doc.end_date,
      duration_months: doc.duration_months,
      service_frequency: ServiceFrequency::from_str(&doc.service_frequency)?,
      number_of_services: doc.number_of_services,
      services_completed: doc.services_completed,
      contract_value: ContractValue::new(
        parse_decimal(&doc.contract_value, "contract value").map_err(AmcError::Internal)?,
      )?,
      payment_terms: doc.payment_terms,
      assigned_to: doc
        .assigned_to
        .map(|id| parse_uuid(&id, "assigned to"))
        .transpose()
        .map_err(AmcError::Internal)?,
      status: AmcStatus::from_str(&doc.status)?,
      auto_renewal: doc.auto_renewal,
      renewal_notification_sent: doc.renewal_notification_sent,
      renewed_from: doc
        .renewed_from
        .map(|id| parse_uuid(&id, "renewed from"))
        .transpose()
        .map_err(AmcError::Internal)?,
      renewed_to: doc
        .renewed_to
        .map(|id| parse_uuid(&id, "renewed to"))
        .transpose()
        .map_err(AmcError::Internal)?,
      services,
      created_by: parse_uuid(&doc.created_by, "created by").map_err(AmcError::Internal)?,
      created_at: doc.created_at,
      updated_at: doc.updated_at,
    })
  }
}

pub struct MongoAmcRepository {
  collection: Collection<AmcDocument>,
}

impl MongoAmcRepository {
  pub fn new(db: &Database) -> Self {
    Self {
      collection: db.collection("amc_contracts"),
    }
  }

  /// Index backing the renewal and expiry sweeps.
  pub async fn init_indexes(&self) -> Result<(), AmcError> {
    let sweep_index = IndexModel::builder()
      .keys(doc! { "status": 1, "end_date": 1 })
      .options(
        IndexOptions::builder()
          .name("amc_sweep_idx".to_string())
          .build(),
      )
      .build();

    self.collection.create_indexes([sweep_index], None).await?;
    Ok(())
  }
}

#[async_trait]
impl AmcRepository for MongoAmcRepository {
  async fn create(&self, contract: AmcContract) -> Result<AmcContract, AmcError> {
    self
      .collection
      .insert_one(AmcDocument::from(&contract), None)
      .await?;
    Ok(contract)
  }

  async fn update(&self, contract: AmcContract) -> Result<AmcContract, AmcError> {
    let result = self
      .collection
      .replace_one(
        doc! { "_id": contract.id.to_string() },
        AmcDocument::from(&contract),
        None,
      )
      .await?;

    if result.matched_count == 0 {
      return Err(AmcError::ContractNotFound(contract.id));
    }
    Ok(contract)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<AmcContract>, AmcError> {
    let document = self
      .collection
      .find_one(doc! { "_id": id.to_string() }, None)
      .await?;
    document.map(AmcContract::try_from).transpose()
  }

  async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<AmcContract>, AmcError> {
    let cursor = self
      .collection
      .find(doc! { "client_id": client_id.to_string() }, None)
      .await?;
    let documents: Vec<AmcDocument> = cursor.try_collect().await?;
    documents.into_iter().map(AmcContract::try_from).collect()
  }

  async fn find_active_ending_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<AmcContract>, AmcError> {
    let filter = doc! {
      "status": "active",
      "end_date": { "$lte": bson::DateTime::from_chrono(cutoff) },
    };
    let cursor = self.collection.find(filter, None).await?;
    let documents: Vec<AmcDocument> = cursor.try_collect().await?;
    documents.into_iter().map(AmcContract::try_from).collect()
  }
}
