use super::value_objects::ValueObjectError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BillingError {
  #[error("Validation error: {0}")]
  Validation(#[from] ValueObjectError),

  #[error("Invalid status transition: {from} -> {to}")]
  InvalidTransition { from: String, to: String },

  #[error("Payment of {amount} exceeds outstanding balance {balance}")]
  ExceedsBalance { amount: Decimal, balance: Decimal },

  #[error("Invoice {0} is already fully paid")]
  AlreadySettled(Uuid),

  #[error("Document is not editable in {current} status")]
  NotEditable { current: String },

  #[error("No line items provided")]
  NoLineItems,

  #[error("Quotation not found: {0}")]
  QuotationNotFound(Uuid),

  #[error("Invoice not found: {0}")]
  InvoiceNotFound(Uuid),

  #[error("Payment not found: {0}")]
  PaymentNotFound(Uuid),

  #[error("Invoice {0} was modified concurrently")]
  VersionConflict(Uuid),

  #[error("Permission denied: {0}")]
  PermissionDenied(String),

  #[error("Database error: {0}")]
  Database(#[from] mongodb::error::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}
