use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::access::{Capability, Role};
use crate::domain::billing::{BillingError, BillingService, PaymentMode};

#[derive(Debug, Deserialize)]
pub struct RecordPaymentCommand {
  pub actor_role: Role,
  pub invoice_id: Uuid,
  pub amount: Decimal,
  pub payment_mode: String,
  pub payment_date: Option<DateTime<Utc>>,
  pub reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
  pub payment_id: Uuid,
  pub invoice_id: Uuid,
  pub amount_paid: Decimal,
  pub balance_amount: Decimal,
  pub payment_status: String,
}

pub struct RecordPaymentUseCase {
  billing_service: Arc<BillingService>,
}

impl RecordPaymentUseCase {
  pub fn new(billing_service: Arc<BillingService>) -> Self {
    Self { billing_service }
  }

  pub async fn execute(
    &self,
    command: RecordPaymentCommand,
  ) -> Result<RecordPaymentResponse, BillingError> {
    if !command.actor_role.has_capability(Capability::RecordPayments) {
      return Err(BillingError::PermissionDenied(
        "Role is not allowed to record payments".to_string(),
      ));
    }

    let payment_mode = PaymentMode::from_str(&command.payment_mode)?;

    let (payment, invoice) = self
      .billing_service
      .record_payment(
        command.invoice_id,
        command.amount,
        payment_mode,
        command.payment_date,
        command.reference,
      )
      .await?;

    Ok(RecordPaymentResponse {
      payment_id: payment.id,
      invoice_id: invoice.id,
      amount_paid: invoice.amount_paid,
      balance_amount: invoice.balance_amount,
      payment_status: invoice.payment_status.as_str().to_string(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::billing::{
    Discount, GstRates, InvoiceData, InvoiceItemInput, LineItemDescription, Quantity, UnitPrice,
  };
  use crate::infrastructure::persistence::memory::{
    InMemoryInvoiceRepository, InMemoryPaymentRepository, InMemoryQuotationRepository,
  };
  use chrono::Duration;
  use rust_decimal_macros::dec;

  fn billing_service() -> Arc<BillingService> {
    Arc::new(BillingService::new(
      Arc::new(InMemoryQuotationRepository::new()),
      Arc::new(InMemoryInvoiceRepository::new()),
      Arc::new(InMemoryPaymentRepository::new()),
    ))
  }

  async fn seeded_invoice(service: &BillingService) -> Uuid {
    // subtotal 10000, default GST 18% -> grand total 11800
    let invoice = service
      .create_invoice(InvoiceData {
        client_id: Uuid::new_v4(),
        invoice_number: "INV-3001".to_string(),
        due_date: Utc::now() + Duration::days(30),
        created_by: Uuid::new_v4(),
        line_items: vec![InvoiceItemInput {
          description: LineItemDescription::new("Annual service".to_string()).unwrap(),
          quantity: Quantity::new(dec!(1)).unwrap(),
          unit_price: UnitPrice::new(dec!(10000)).unwrap(),
          discount: Discount::none(),
          gst: GstRates::default(),
        }],
      })
      .await
      .unwrap();
    invoice.id
  }

  fn command(invoice_id: Uuid, amount: Decimal, role: Role) -> RecordPaymentCommand {
    RecordPaymentCommand {
      actor_role: role,
      invoice_id,
      amount,
      payment_mode: "bank_transfer".to_string(),
      payment_date: None,
      reference: None,
    }
  }

  #[tokio::test]
  async fn test_partial_then_settling_payment() {
    let service = billing_service();
    let use_case = RecordPaymentUseCase::new(service.clone());
    let invoice_id = seeded_invoice(&service).await;

    let first = use_case
      .execute(command(invoice_id, dec!(5000), Role::Sales))
      .await
      .unwrap();
    assert_eq!(first.balance_amount, dec!(6800));
    assert_eq!(first.payment_status, "partial");

    let second = use_case
      .execute(command(invoice_id, dec!(6800), Role::Sales))
      .await
      .unwrap();
    assert_eq!(second.balance_amount, dec!(0));
    assert_eq!(second.payment_status, "paid");

    let err = use_case
      .execute(command(invoice_id, dec!(100), Role::Sales))
      .await
      .unwrap_err();
    assert!(matches!(err, BillingError::AlreadySettled(_)));
  }

  #[tokio::test]
  async fn test_role_without_capability_is_rejected() {
    let service = billing_service();
    let use_case = RecordPaymentUseCase::new(service.clone());
    let invoice_id = seeded_invoice(&service).await;

    let err = use_case
      .execute(command(invoice_id, dec!(100), Role::Technician))
      .await
      .unwrap_err();
    assert!(matches!(err, BillingError::PermissionDenied(_)));
  }

  #[tokio::test]
  async fn test_unknown_payment_mode_is_a_validation_error() {
    let service = billing_service();
    let use_case = RecordPaymentUseCase::new(service.clone());
    let invoice_id = seeded_invoice(&service).await;

    let mut bad = command(invoice_id, dec!(100), Role::Sales);
    bad.payment_mode = "barter".to_string();
    let err = use_case.execute(bad).await.unwrap_err();
    assert!(matches!(err, BillingError::Validation(_)));
  }
}
