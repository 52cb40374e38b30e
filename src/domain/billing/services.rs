use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{Invoice, InvoiceLineItem, Payment, Quotation, QuotationLineItem};
use super::errors::BillingError;
use super::ports::{InvoiceRepository, PaymentRepository, QuotationRepository};
use super::value_objects::{
  ApprovalStatus, Discount, GstRates, InvoiceStatus, LineItemDescription, PaymentMode, Quantity,
  QuotationStatus, TaxRate, UnitPrice,
};

/// Retries for ledger writes that lose the optimistic-concurrency race.
const LEDGER_UPDATE_RETRIES: u32 = 3;

/// Quotation line item input
#[derive(Debug, Clone)]
pub struct QuotationItemInput {
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub unit_price: UnitPrice,
  pub discount: Discount,
  pub tax_rate: TaxRate,
}

/// Quotation creation data
#[derive(Debug, Clone)]
pub struct QuotationData {
  pub client_id: Uuid,
  pub quotation_number: String,
  pub valid_until: Option<DateTime<Utc>>,
  pub created_by: Uuid,
  pub line_items: Vec<QuotationItemInput>,
}

/// Invoice line item input
#[derive(Debug, Clone)]
pub struct InvoiceItemInput {
  pub description: LineItemDescription,
  pub quantity: Quantity,
  pub unit_price: UnitPrice,
  pub discount: Discount,
  pub gst: GstRates,
}

/// Invoice creation data
#[derive(Debug, Clone)]
pub struct InvoiceData {
  pub client_id: Uuid,
  pub invoice_number: String,
  pub due_date: DateTime<Utc>,
  pub created_by: Uuid,
  pub line_items: Vec<InvoiceItemInput>,
}

pub struct BillingService {
  quotation_repo: Arc<dyn QuotationRepository>,
  invoice_repo: Arc<dyn InvoiceRepository>,
  payment_repo: Arc<dyn PaymentRepository>,
}

impl BillingService {
  pub fn new(
    quotation_repo: Arc<dyn QuotationRepository>,
    invoice_repo: Arc<dyn InvoiceRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
  ) -> Self {
    Self {
      quotation_repo,
      invoice_repo,
      payment_repo,
    }
  }

  // Quotation operations

  pub async fn create_quotation(&self, data: QuotationData) -> Result<Quotation, BillingError> {
    if data.line_items.is_empty() {
      return Err(BillingError::NoLineItems);
    }

    let items = build_quotation_items(data.line_items);
    let quotation = Quotation::new(
      data.client_id,
      data.quotation_number,
      items,
      data.valid_until,
      data.created_by,
    );
    self.quotation_repo.create(quotation).await
  }

  pub async fn update_quotation_items(
    &self,
    quotation_id: Uuid,
    line_items: Vec<QuotationItemInput>,
  ) -> Result<Quotation, BillingError> {
    if line_items.is_empty() {
      return Err(BillingError::NoLineItems);
    }

    let mut quotation = self
      .quotation_repo
      .find_by_id(quotation_id)
      .await?
      .ok_or(BillingError::QuotationNotFound(quotation_id))?;

    quotation.replace_items(build_quotation_items(line_items))?;
    self.quotation_repo.update(quotation).await
  }

  pub async fn change_quotation_status(
    &self,
    quotation_id: Uuid,
    new_status: QuotationStatus,
  ) -> Result<Quotation, BillingError> {
    let mut quotation = self
      .quotation_repo
      .find_by_id(quotation_id)
      .await?
      .ok_or(BillingError::QuotationNotFound(quotation_id))?;

    quotation.change_status(new_status)?;
    self.quotation_repo.update(quotation).await
  }

  pub async fn review_quotation(
    &self,
    quotation_id: Uuid,
    decision: ApprovalStatus,
  ) -> Result<Quotation, BillingError> {
    let mut quotation = self
      .quotation_repo
      .find_by_id(quotation_id)
      .await?
      .ok_or(BillingError::QuotationNotFound(quotation_id))?;

    quotation.review(decision)?;
    self.quotation_repo.update(quotation).await
  }

  /// Convert an approved quotation into an invoice. The quotation locks in
  /// Converted status and both documents reference each other.
  pub async fn convert_quotation(
    &self,
    quotation_id: Uuid,
    invoice_number: String,
    due_date: DateTime<Utc>,
  ) -> Result<(Quotation, Invoice), BillingError> {
    let mut quotation = self
      .quotation_repo
      .find_by_id(quotation_id)
      .await?
      .ok_or(BillingError::QuotationNotFound(quotation_id))?;

    let invoice = quotation.convert(invoice_number, due_date)?;

    let invoice = self.invoice_repo.create(invoice).await?;
    let quotation = self.quotation_repo.update(quotation).await?;

    tracing::info!(
      quotation_id = %quotation.id,
      invoice_id = %invoice.id,
      "Quotation converted to invoice"
    );

    Ok((quotation, invoice))
  }

  // Invoice operations

  pub async fn create_invoice(&self, data: InvoiceData) -> Result<Invoice, BillingError> {
    if data.line_items.is_empty() {
      return Err(BillingError::NoLineItems);
    }

    let items = build_invoice_items(data.line_items);
    let invoice = Invoice::new(
      data.client_id,
      data.invoice_number,
      items,
      data.due_date,
      data.created_by,
    );
    self.invoice_repo.create(invoice).await
  }

  pub async fn update_invoice_items(
    &self,
    invoice_id: Uuid,
    line_items: Vec<InvoiceItemInput>,
  ) -> Result<Invoice, BillingError> {
    if line_items.is_empty() {
      return Err(BillingError::NoLineItems);
    }

    let mut attempt = 0;
    loop {
      let mut invoice = self
        .invoice_repo
        .find_by_id(invoice_id)
        .await?
        .ok_or(BillingError::InvoiceNotFound(invoice_id))?;

      invoice.replace_items(build_invoice_items(line_items.clone()))?;

      match self.invoice_repo.update(invoice).await {
        Ok(updated) => return Ok(updated),
        Err(BillingError::VersionConflict(id)) => {
          attempt += 1;
          if attempt >= LEDGER_UPDATE_RETRIES {
            return Err(BillingError::VersionConflict(id));
          }
        }
        Err(e) => return Err(e),
      }
    }
  }

  pub async fn change_invoice_status(
    &self,
    invoice_id: Uuid,
    new_status: InvoiceStatus,
  ) -> Result<Invoice, BillingError> {
    let mut attempt = 0;
    loop {
      let mut invoice = self
        .invoice_repo
        .find_by_id(invoice_id)
        .await?
        .ok_or(BillingError::InvoiceNotFound(invoice_id))?;

      invoice.change_status(new_status)?;

      match self.invoice_repo.update(invoice).await {
        Ok(updated) => return Ok(updated),
        Err(BillingError::VersionConflict(id)) => {
          attempt += 1;
          if attempt >= LEDGER_UPDATE_RETRIES {
            return Err(BillingError::VersionConflict(id));
          }
        }
        Err(e) => return Err(e),
      }
    }
  }

  // Payment ledger operations

  /// Record a payment against an invoice. The invoice write is a
  /// compare-and-swap; a lost race reloads the invoice and re-validates the
  /// payment against the fresh balance before retrying.
  pub async fn record_payment(
    &self,
    invoice_id: Uuid,
    amount: Decimal,
    payment_mode: PaymentMode,
    payment_date: Option<DateTime<Utc>>,
    reference: Option<String>,
  ) -> Result<(Payment, Invoice), BillingError> {
    let mut attempt = 0;
    loop {
      let mut invoice = self
        .invoice_repo
        .find_by_id(invoice_id)
        .await?
        .ok_or(BillingError::InvoiceNotFound(invoice_id))?;

      let payment = Payment::new(
        &invoice,
        amount,
        payment_mode,
        payment_date.unwrap_or_else(Utc::now),
        reference.clone(),
      )?;
      invoice.apply_payment(&payment)?;

      match self.invoice_repo.update(invoice).await {
        Ok(updated) => {
          let payment = self.payment_repo.create(payment).await?;
          tracing::info!(
            invoice_id = %updated.id,
            payment_id = %payment.id,
            amount = %payment.amount,
            balance = %updated.balance_amount,
            "Payment recorded"
          );
          return Ok((payment, updated));
        }
        Err(BillingError::VersionConflict(id)) => {
          attempt += 1;
          if attempt >= LEDGER_UPDATE_RETRIES {
            return Err(BillingError::VersionConflict(id));
          }
        }
        Err(e) => return Err(e),
      }
    }
  }

  /// Reverse a recorded payment and delete its record. Reversing a payment
  /// the invoice no longer references only deletes the record.
  pub async fn reverse_payment(&self, payment_id: Uuid) -> Result<Invoice, BillingError> {
    let payment = self
      .payment_repo
      .find_by_id(payment_id)
      .await?
      .ok_or(BillingError::PaymentNotFound(payment_id))?;

    let mut attempt = 0;
    loop {
      let mut invoice = self
        .invoice_repo
        .find_by_id(payment.invoice_id)
        .await?
        .ok_or(BillingError::InvoiceNotFound(payment.invoice_id))?;

      if !invoice.reverse_payment(&payment) {
        self.payment_repo.delete(payment.id).await?;
        return Ok(invoice);
      }

      match self.invoice_repo.update(invoice).await {
        Ok(updated) => {
          self.payment_repo.delete(payment.id).await?;
          tracing::info!(
            invoice_id = %updated.id,
            payment_id = %payment.id,
            amount = %payment.amount,
            "Payment reversed"
          );
          return Ok(updated);
        }
        Err(BillingError::VersionConflict(id)) => {
          attempt += 1;
          if attempt >= LEDGER_UPDATE_RETRIES {
            return Err(BillingError::VersionConflict(id));
          }
        }
        Err(e) => return Err(e),
      }
    }
  }
}

fn build_quotation_items(inputs: Vec<QuotationItemInput>) -> Vec<QuotationLineItem> {
  inputs
    .into_iter()
    .enumerate()
    .map(|(i, input)| {
      QuotationLineItem::new(
        input.description,
        input.quantity,
        input.unit_price,
        input.discount,
        input.tax_rate,
        (i + 1) as i32,
      )
    })
    .collect()
}

fn build_invoice_items(inputs: Vec<InvoiceItemInput>) -> Vec<InvoiceLineItem> {
  inputs
    .into_iter()
    .enumerate()
    .map(|(i, input)| {
      InvoiceLineItem::new(
        input.description,
        input.quantity,
        input.unit_price,
        input.discount,
        input.gst,
        (i + 1) as i32,
      )
    })
    .collect()
}
