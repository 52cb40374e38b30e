use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::{Invoice, Payment, Quotation};
use super::errors::BillingError;

#[async_trait]
pub trait QuotationRepository: Send + Sync {
  async fn create(&self, quotation: Quotation) -> Result<Quotation, BillingError>;
  async fn update(&self, quotation: Quotation) -> Result<Quotation, BillingError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Quotation>, BillingError>;
  async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<Quotation>, BillingError>;
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
  async fn create(&self, invoice: Invoice) -> Result<Invoice, BillingError>;

  /// Compare-and-swap update keyed on `invoice.version`. Implementations
  /// must reject the write with `BillingError::VersionConflict` when the
  /// stored document no longer carries that version, and bump the version
  /// on success. A plain read-then-write would lose concurrent ledger
  /// updates.
  async fn update(&self, invoice: Invoice) -> Result<Invoice, BillingError>;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, BillingError>;
  async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<Invoice>, BillingError>;

  /// Outstanding invoices (unpaid or partial, not cancelled) with a due
  /// date on or before the cutoff. Feeds payment reminders and the overdue
  /// sweep.
  async fn find_payable_due_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<Invoice>, BillingError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
  async fn create(&self, payment: Payment) -> Result<Payment, BillingError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, BillingError>;
  async fn find_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<Payment>, BillingError>;
  async fn delete(&self, id: Uuid) -> Result<(), BillingError>;
}
