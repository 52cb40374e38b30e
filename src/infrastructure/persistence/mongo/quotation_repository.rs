use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use mongodb::{Collection, Database, bson::doc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::billing::entities::{Quotation, QuotationLineItem};
use crate::domain::billing::errors::BillingError;
use crate::domain::billing::ports::QuotationRepository;
use crate::domain::billing::value_objects::{
  ApprovalStatus, Discount, DiscountType, LineItemDescription, Quantity, QuotationStatus,
  TaxRate, UnitPrice,
};

use super::{parse_decimal, parse_uuid};

#[derive(Debug, Serialize, Deserialize)]
struct QuotationLineItemDocument {
  id: String,
  description: String,
  quantity: String,
  unit_price: String,
  discount_value: String,
  discount_type: String,
  tax_rate: String,
  tax_amount: String,
  total_amount: String,
  line_order: i32,
}

impl From<&QuotationLineItem> for QuotationLineItemDocument {
  fn from(item: &QuotationLineItem) -> Self {
    Self {
      id: item.id.to_string(),
      description: item.description.value().to_string(),
      quantity: item.quantity.value().to_string(),
      unit_price: item.unit_price.value().to_string(),
      discount_value: item.discount.value().to_string(),
      discount_type: item.discount.discount_type().as_str().to_string(),
      tax_rate: item.tax_rate.value().to_string(),
      tax_amount: item.tax_amount.to_string(),
      total_amount: item.total_amount.to_string(),
      line_order: item.line_order,
    }
  }
}

impl TryFrom<QuotationLineItemDocument> for QuotationLineItem {
  type Error = BillingError;

  fn try_from(doc: QuotationLineItemDocument) -> Result<Self, Self::Error> {
    Ok(QuotationLineItem {
      id: parse_uuid(&doc.id, "line item id").map_err(BillingError::Internal)?,
      description: LineItemDescription::new(doc.description)?,
      quantity: Quantity::new(parse_decimal(&doc.quantity, "quantity").map_err(BillingError::Internal)?)?,
      unit_price: UnitPrice::new(
        parse_decimal(&doc.unit_price, "unit price").map_err(BillingError::Internal)?,
      )?,
      discount: Discount::new(
        parse_decimal(&doc.discount_value, "discount").map_err(BillingError::Internal)?,
        DiscountType::from_str(&doc.discount_type)?,
      )?,
      tax_rate: TaxRate::new(
        parse_decimal(&doc.tax_rate, "tax rate").map_err(BillingError::Internal)?,
      )?,
      tax_amount: parse_decimal(&doc.tax_amount, "tax amount").map_err(BillingError::Internal)?,
      total_amount: parse_decimal(&doc.total_amount, "total amount")
        .map_err(BillingError::Internal)?,
      line_order: doc.line_order,
    })
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct QuotationDocument {
  #[serde(rename = "_id")]
  id: String,
  client_id: String,
  quotation_number: String,
  status: String,
  approval_status: String,
  items: Vec<QuotationLineItemDocument>,
  subtotal: String,
  total_discount: String,
  total_tax: String,
  grand_total: String,
  valid_until: Option<DateTime<Utc>>,
  converted_to_invoice: Option<String>,
  created_by: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  created_at: DateTime<Utc>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  updated_at: DateTime<Utc>,
}

impl From<&Quotation> for QuotationDocument {
  fn from(quotation: &Quotation) -> Self {
    Self {
      id: quotation.id.to_string(),
      client_id: quotation.client_id.to_string(),
      quotation_number: quotation.quotation_number.clone(),
      status: quotation.status.as_str().to_string(),
      approval_status: quotation.approval_status.as_str().to_string(),
      items: quotation.items.iter().map(Into::into).collect(),
      subtotal: quotation.subtotal.to_string(),
      total_discount: quotation.total_discount.to_string(),
      total_tax: quotation.total_tax.to_string(),
      grand_total: quotation.grand_total.to_string(),
      valid_until: quotation.valid_until,
      converted_to_invoice: quotation.converted_to_invoice.map(|id| id.to_string()),
      created_by: quotation.created_by.to_string(),
      created_at: quotation.created_at,
      updated_at: quotation.updated_at,
    }
  }
}

impl TryFrom<QuotationDocument> for Quotation {
  type Error = BillingError;

  fn try_from(doc: QuotationDocument) -> Result<Self, Self::Error> {
    let items = doc
      .items
      .into_iter()
      .map(QuotationLineItem::try_from)
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Quotation {
      id: parse_uuid(&doc.id, "quotation id").map_err(BillingError::Internal)?,
      client_id: parse_uuid(&doc.client_id, "client id").map_err(BillingError::Internal)?,
      quotation_number: doc.quotation_number,
      status: QuotationStatus::from_str(&doc.status)?,
      approval_status: ApprovalStatus::from_str(&doc.approval_status)?,
      items,
      subtotal: parse_decimal(&doc.subtotal, "subtotal").map_err(BillingError::Internal)?,
      total_discount: parse_decimal(&doc.total_discount, "total discount")
        .map_err(BillingError::Internal)?,
      total_tax: parse_decimal(&doc.total_tax, "total tax").map_err(BillingError::Internal)?,
      grand_total: parse_decimal(&doc.grand_total, "grand total")
        .map_err(BillingError::Internal)?,
      valid_until: doc.valid_until,
      converted_to_invoice: doc
        .converted_to_invoice
        .map(|id| parse_uuid(&id, "converted invoice id"))
        .transpose()
        .map_err(BillingError::Internal)?,
      created_by: parse_uuid(&doc.created_by, "created by").map_err(BillingError::Internal)?,
      created_at: doc.created_at,
      updated_at: doc.updated_at,
    })
  }
}

pub struct MongoQuotationRepository {
  collection: Collection<QuotationDocument>,
}

impl MongoQuotationRepository {
  pub fn new(db: &Database) -> Self {
    Self {
      collection: db.collection("quotations"),
    }
  }
}

#[async_trait]
impl QuotationRepository for MongoQuotationRepository {
  async fn create(&self, quotation: Quotation) -> Result<Quotation, BillingError> {
    self
      .collection
      .insert_one(QuotationDocument::from(&quotation), None)
      .await?;
    Ok(quotation)
  }

  async fn update(&self, quotation: Quotation) -> Result<Quotation, BillingError> {
    let result = self
      .collection
      .replace_one(
        doc! { "_id": quotation.id.to_string() },
        QuotationDocument::from(&quotation),
        None,
      )
      .await?;

    if result.matched_count == 0 {
      return Err(BillingError::QuotationNotFound(quotation.id));
    }
    Ok(quotation)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Quotation>, BillingError> {
    let document = self
      .collection
      .find_one(doc! { "_id": id.to_string() }, None)
      .await?;
    document.map(Quotation::try_from).transpose()
  }

  async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<Quotation>, BillingError> {
    let cursor = self
      .collection
      .find(doc! { "client_id": client_id.to_string() }, None)
      .await?;
    let documents: Vec<QuotationDocument> = cursor.try_collect().await?;
    documents.into_iter().map(Quotation::try_from).collect()
  }
}
