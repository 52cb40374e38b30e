use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::billing::entities::Invoice;
use crate::domain::billing::errors::BillingError;
use crate::domain::billing::ports::InvoiceRepository;
use crate::domain::billing::value_objects::InvoiceStatus;

#[derive(Default)]
pub struct InMemoryInvoiceRepository {
  invoices: RwLock<HashMap<Uuid, Invoice>>,
}

impl InMemoryInvoiceRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
  async fn create(&self, invoice: Invoice) -> Result<Invoice, BillingError> {
    let mut invoices = self.invoices.write().unwrap();
    invoices.insert(invoice.id, invoice.clone());
    Ok(invoice)
  }

  /// Compare-and-swap on the stored version, like the document store's
  /// filtered replace.
  async fn update(&self, invoice: Invoice) -> Result<Invoice, BillingError> {
    let mut invoices = self.invoices.write().unwrap();
    let stored = invoices
      .get(&invoice.id)
      .ok_or(BillingError::InvoiceNotFound(invoice.id))?;

    if stored.version != invoice.version {
      return Err(BillingError::VersionConflict(invoice.id));
    }

    let mut updated = invoice;
    updated.version += 1;
    invoices.insert(updated.id, updated.clone());
    Ok(updated)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, BillingError> {
    let invoices = self.invoices.read().unwrap();
    Ok(invoices.get(&id).cloned())
  }

  async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<Invoice>, BillingError> {
    let invoices = self.invoices.read().unwrap();
    Ok(
      invoices
        .values()
        .filter(|i| i.client_id == client_id)
        .cloned()
        .collect(),
    )
  }

  async fn find_payable_due_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<Invoice>, BillingError> {
    let invoices = self.invoices.read().unwrap();
    Ok(
      invoices
        .values()
        .filter(|i| {
          i.payment_status.is_outstanding()
            && i.status != InvoiceStatus::Cancelled
            && i.due_date <= cutoff
        })
        .cloned()
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::billing::entities::InvoiceLineItem;
  use crate::domain::billing::value_objects::{
    Discount, GstRates, LineItemDescription, Quantity, UnitPrice,
  };
  use chrono::Duration;
  use rust_decimal_macros::dec;

  fn invoice() -> Invoice {
    Invoice::new(
      Uuid::new_v4(),
      "INV-2001".to_string(),
      vec![InvoiceLineItem::new(
        LineItemDescription::new("Filter replacement".to_string()).unwrap(),
        Quantity::new(dec!(1)).unwrap(),
        UnitPrice::new(dec!(2500)).unwrap(),
        Discount::none(),
        GstRates::default(),
        1,
      )],
      Utc::now() + Duration::days(14),
      Uuid::new_v4(),
    )
  }

  #[tokio::test]
  async fn test_update_bumps_version() {
    let repo = InMemoryInvoiceRepository::new();
    let created = repo.create(invoice()).await.unwrap();
    assert_eq!(created.version, 0);

    let updated = repo.update(created).await.unwrap();
    assert_eq!(updated.version, 1);
  }

  #[tokio::test]
  async fn test_stale_version_is_rejected() {
    let repo = InMemoryInvoiceRepository::new();
    let created = repo.create(invoice()).await.unwrap();

    let stale = created.clone();
    repo.update(created).await.unwrap();

    let err = repo.update(stale).await.unwrap_err();
    assert!(matches!(err, BillingError::VersionConflict(_)));
  }

  #[tokio::test]
  async fn test_payable_filter() {
    let repo = InMemoryInvoiceRepository::new();
    let mut due = invoice();
    due.due_date = Utc::now() - Duration::days(1);
    let due = repo.create(due).await.unwrap();

    let mut cancelled = invoice();
    cancelled.due_date = Utc::now() - Duration::days(1);
    cancelled.status = InvoiceStatus::Cancelled;
    repo.create(cancelled).await.unwrap();

    let far_out = invoice();
    repo.create(far_out).await.unwrap();

    let payable = repo.find_payable_due_before(Utc::now()).await.unwrap();
    assert_eq!(payable.len(), 1);
    assert_eq!(payable[0].id, due.id);
  }
}
