use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel, bson, bson::doc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::billing::entities::{Invoice, InvoiceLineItem};
use crate::domain::billing::errors::BillingError;
use crate::domain::billing::ports::InvoiceRepository;
use crate::domain::billing::value_objects::{
  Discount, DiscountType, GstRates, InvoiceStatus, LineItemDescription, PaymentStatus, Quantity,
  TaxRate, UnitPrice,
};

use super::{parse_decimal, parse_uuid};

#[derive(Debug, Serialize, Deserialize)]
struct InvoiceLineItemDocument {
  id: String,
  description: String,
  quantity: String,
  unit_price: String,
  discount_value: String,
  discount_type: String,
  cgst: String,
  sgst: String,
  igst: String,
  tax_amount: String,
  total_amount: String,
  line_order: i32,
}

impl From<&InvoiceLineItem> for InvoiceLineItemDocument {
  fn from(item: &InvoiceLineItem) -> Self {
    Self {
      id: item.id.to_string(),
      description: item.description.value().to_string(),
      quantity: item.quantity.value().to_string(),
      unit_price: item.unit_price.value().to_string(),
      discount_value: item.discount.value().to_string(),
      discount_type: item.discount.discount_type().as_str().to_string(),
      cgst: item.gst.cgst.value().to_string(),
      sgst: item.gst.sgst.value().to_string(),
      igst: item.gst.igst.value().to_string(),
      tax_amount: item.tax_amount.to_string(),
      total_amount: item.total_amount.to_string(),
      line_order: item.line_order,
    }
  }
}

impl TryFrom<InvoiceLineItemDocument> for InvoiceLineItem {
  type Error = BillingError;

  fn try_from(doc: InvoiceLineItemDocument) -> Result<Self, Self::Error> {
    let gst = GstRates::new(
      TaxRate::new(parse_decimal(&doc.cgst, "cgst").map_err(BillingError::Internal)?)?,
      TaxRate::new(parse_decimal(&doc.sgst, "sgst").map_err(BillingError::Internal)?)?,
      TaxRate::new(parse_decimal(&doc.igst, "igst").map_err(BillingError::Internal)?)?,
    );

    Ok(InvoiceLineItem {
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
      gst,
      tax_amount: parse_decimal(&doc.tax_amount, "tax amount").map_err(BillingError::Internal)?,
      total_amount: parse_decimal(&doc.total_amount, "total amount")
        .map_err(BillingError::Internal)?,
      line_order: doc.line_order,
    })
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct InvoiceDocument {
  #[serde(rename = "_id")]
  id: String,
  client_id: String,
  invoice_number: String,
  quotation_id: Option<String>,
  status: String,
  payment_status: String,
  items: Vec<InvoiceLineItemDocument>,
  subtotal: String,
  total_discount: String,
  total_tax: String,
  grand_total: String,
  amount_paid: String,
  balance_amount: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  due_date: DateTime<Utc>,
  payment_ids: Vec<String>,
  version: i64,
  created_by: String,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  created_at: DateTime<Utc>,
  #[serde(with = "chrono_datetime_as_bson_datetime")]
  updated_at: DateTime<Utc>,
}

impl From<&Invoice> for InvoiceDocument {
  fn from(invoice: &Invoice) -> Self {
    Self {
      id: invoice.id.to_string(),
      client_id: invoice.client_id.to_string(),
      invoice_number: invoice.invoice_number.clone(),
      quotation_id: invoice.quotation_id.map(|id| id.to_string()),
      status: invoice.status.as_str().to_string(),
      payment_status: invoice.payment_status.as_str().to_string(),
      items: invoice.items.iter().map(Into::into).collect(),
      subtotal: invoice.subtotal.to_string(),
      total_discount: invoice.total_discount.to_string(),
      total_tax: invoice.total_tax.to_string(),
      grand_total: invoice.grand_total.to_string(),
      amount_paid: invoice.amount_paid.to_string(),
      balance_amount: invoice.balance_amount.to_string(),
      due_date: invoice.due_date,
      payment_ids: invoice.payment_ids.iter().map(|id| id.to_string()).collect(),
      version: invoice.version,
      created_by: invoice.created_by.to_string(),
      created_at: invoice.created_at,
      updated_at: invoice.updated_at,
    }
  }
}

impl TryFrom<InvoiceDocument> for Invoice {
  type Error = BillingError;

  fn try_from(doc: InvoiceDocument) -> Result<Self, Self::Error> {
    let items = doc
      .items
      .into_iter()
      .map(InvoiceLineItem::try_from)
      .collect::<Result<Vec<_>, _>>()?;

    let payment_ids = doc
      .payment_ids
      .iter()
      .map(|id| parse_uuid(id, "payment id"))
      .collect::<Result<Vec<_>, _>>()
      .map_err(BillingError::Internal)?;

    Ok(Invoice {
      id: parse_uuid(&doc.id, "invoice id").map_err(BillingError::Internal)?,
      client_id: parse_uuid(&doc.client_id, "client id").map_err(BillingError::Internal)?,
      invoice_number: doc.invoice_number,
      quotation_id: doc
        .quotation_id
        .map(|id| parse_uuid(&id, "quotation id"))
        .transpose()
        .map_err(BillingError::Internal)?,
      status: InvoiceStatus::from_str(&doc.status)?,
      payment_status: PaymentStatus::from_str(&doc.payment_status)?,
      items,
      subtotal: parse_decimal(&doc.subtotal, "subtotal").map_err(BillingError::Internal)?,
      total_discount: parse_decimal(&doc.total_discount, "total discount")
        .map_err(BillingError::Internal)?,
      total_tax: parse_decimal(&doc.total_tax, "total tax").map_err(BillingError::Internal)?,
      grand_total: parse_decimal(&doc.grand_total, "grand total")
        .map_err(BillingError::Internal)?,
      amount_paid: parse_decimal(&doc.amount_paid, "amount paid")
        .map_err(BillingError::Internal)?,
      balance_amount: parse_decimal(&doc.balance_amount, "balance amount")
        .map_err(BillingError::Internal)?,
      due_date: doc.due_date,
      payment_ids,
      version: doc.version,
      created_by: parse_uuid(&doc.created_by, "created by").map_err(BillingError::Internal)?,
      created_at: doc.created_at,
      updated_at: doc.updated_at,
    })
  }
}

pub struct MongoInvoiceRepository {
  collection: Collection<InvoiceDocument>,
}

impl MongoInvoiceRepository {
  pub fn new(db: &Database) -> Self {
    Self {
      collection: db.collection("invoices"),
    }
  }

  /// Indexes backing the reminder and overdue sweeps.
  pub async fn init_indexes(&self) -> Result<(), BillingError> {
    let due_index = IndexModel::builder()
      .keys(doc! { "payment_status": 1, "status": 1, "due_date": 1 })
      .options(
        IndexOptions::builder()
          .name("invoice_due_sweep_idx".to_string())
          .build(),
      )
      .build();

    let client_index = IndexModel::builder()
      .keys(doc! { "client_id": 1 })
      .options(
        IndexOptions::builder()
          .name("invoice_client_idx".to_string())
          .build(),
      )
      .build();

    self.collection.create_indexes([due_index, client_index], None).await?;
    Ok(())
  }
}

#[async_trait]
impl InvoiceRepository for MongoInvoiceRepository {
  async fn create(&self, invoice: Invoice) -> Result<Invoice, BillingError> {
    self
      .collection
      .insert_one(InvoiceDocument::from(&invoice), None)
      .await?;
    Ok(invoice)
  }

  /// Version-filtered replace: the write only lands when the stored
  /// document still carries the version this invoice was loaded with.
  async fn update(&self, invoice: Invoice) -> Result<Invoice, BillingError> {
    let expected_version = invoice.version;
    let mut updated = invoice;
    updated.version += 1;

    let result = self
      .collection
      .replace_one(
        doc! { "_id": updated.id.to_string(), "version": expected_version },
        InvoiceDocument::from(&updated),
        None,
      )
      .await?;

    if result.matched_count == 0 {
      // Either a concurrent writer bumped the version or the document is
      // gone; the caller's reload distinguishes the two.
      return Err(BillingError::VersionConflict(updated.id));
    }
    Ok(updated)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, BillingError> {
    let document = self
      .collection
      .find_one(doc! { "_id": id.to_string() }, None)
      .await?;
    document.map(Invoice::try_from).transpose()
  }

  async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<Invoice>, BillingError> {
    let cursor = self
      .collection
      .find(doc! { "client_id": client_id.to_string() }, None)
      .await?;
    let documents: Vec<InvoiceDocument> = cursor.try_collect().await?;
    documents.into_iter().map(Invoice::try_from).collect()
  }

  async fn find_payable_due_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<Invoice>, BillingError> {
    let filter = doc! {
      "payment_status": { "$in": ["unpaid", "partial"] },
      "status": { "$ne": "cancelled" },
      "due_date": { "$lte": bson::DateTime::from_chrono(cutoff) },
    };
    let cursor = self.collection.find(filter, None).await?;
    let documents: Vec<InvoiceDocument> = cursor.try_collect().await?;
    documents.into_iter().map(Invoice::try_from).collect()
  }
}
