use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use mongodb::{Collection, Database, bson::doc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::billing::entities::Payment;
use crate::domain::billing::errors::BillingError;
use crate::domain::billing::ports::PaymentRepository;
use crate::domain::billing::value_objects::{PaymentMode, PaymentState};

use super::{parse_decimal, parse_uuid};

#[derive(Debug, Serialize, Deserialize)]
struct PaymentDocument {
  #[serde(rename = "_id")]
  id: String,
  invoice_id: String,
  client_id: String,
  amount: String,
  payment_mode: String,
  state: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  payment_date: DateTime<Utc>,
  reference: Option<String>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  created_at: DateTime<Utc>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  updated_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentDocument {
  fn from(payment: &Payment) -> Self {
    Self {
      id: payment.id.to_string(),
      invoice_id: payment.invoice_id.to_string(),
      client_id: payment.client_id.to_string(),
      amount: payment.amount.to_string(),
      payment_mode: payment.payment_mode.as_str().to_string(),
      state: payment.state.as_str().to_string(),
      payment_date: payment.payment_date,
      reference: payment.reference.clone(),
      created_at: payment.created_at,
      updated_at: payment.updated_at,
    }
  }
}

impl TryFrom<PaymentDocument> for Payment {
  type Error = BillingError;

  fn try_from(doc: PaymentDocument) -> Result<Self, Self::Error> {
    Ok(Payment {
      id: parse_uuid(&doc.id, "payment id").map_err(BillingError::Internal)?,
      invoice_id: parse_uuid(&doc.invoice_id, "invoice id").map_err(BillingError::Internal)?,
      client_id: parse_uuid(&doc.client_id, "client id").map_err(BillingError::Internal)?,
      amount: parse_decimal(&doc.amount, "amount").map_err(BillingError::Internal)?,
      payment_mode: PaymentMode::from_str(&doc.payment_mode)?,
      state: PaymentState::from_str(&doc.state)?,
      payment_date: doc.payment_date,
      reference: doc.reference,
      created_at: doc.created_at,
      updated_at: doc.updated_at,
    })
  }
}

pub struct MongoPaymentRepository {
  collection: Collection<PaymentDocument>,
}

impl MongoPaymentRepository {
  pub fn new(db: &Database) -> Self {
    Self {
      collection: db.collection("payments"),
    }
  }
}

#[async_trait]
impl PaymentRepository for MongoPaymentRepository {
  async fn create(&self, payment: Payment) -> Result<Payment, BillingError> {
    self
      .collection
      .insert_one(PaymentDocument::from(&payment), None)
      .await?;
    Ok(payment)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, BillingError> {
    let document = self
      .collection
      .find_one(doc! { "_id": id.to_string() }, None)
      .await?;
    document.map(Payment::try_from).transpose()
  }

  async fn find_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<Payment>, BillingError> {
    let cursor = self
      .collection
      .find(doc! { "invoice_id": invoice_id.to_string() }, None)
      .await?;
    let documents: Vec<PaymentDocument> = cursor.try_collect().await?;
    documents.into_iter().map(Payment::try_from).collect()
  }

  async fn delete(&self, id: Uuid) -> Result<(), BillingError> {
    self
      .collection
      .delete_one(doc! { "_id": id.to_string() }, None)
      .await?;
    Ok(())
  }
}
