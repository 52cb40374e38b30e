use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::billing::{BillingError, BillingService};

#[derive(Debug, Deserialize)]
pub struct ConvertQuotationCommand {
  pub quotation_id: Uuid,
  pub invoice_number: String,
  pub due_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ConvertQuotationResponse {
  pub quotation_id: Uuid,
  pub invoice_id: Uuid,
  pub grand_total: Decimal,
}

pub struct ConvertQuotationUseCase {
  billing_service: Arc<BillingService>,
}

impl ConvertQuotationUseCase {
  pub fn new(billing_service: Arc<BillingService>) -> Self {
    Self { billing_service }
  }

  pub async fn execute(
    &self,
    command: ConvertQuotationCommand,
  ) -> Result<ConvertQuotationResponse, BillingError> {
    let (quotation, invoice) = self
      .billing_service
      .convert_quotation(command.quotation_id, command.invoice_number, command.due_date)
      .await?;

    Ok(ConvertQuotationResponse {
      quotation_id: quotation.id,
      invoice_id: invoice.id,
      grand_total: invoice.grand_total,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::access::Role;
  use crate::domain::billing::{
    Discount, DiscountType, LineItemDescription, Quantity, QuotationData, QuotationItemInput,
    TaxRate, UnitPrice,
  };
  use crate::application::billing::review_quotation::{
    ReviewQuotationCommand, ReviewQuotationUseCase,
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

  async fn seeded_quotation(service: &BillingService) -> Uuid {
    let quotation = service
      .create_quotation(QuotationData {
        client_id: Uuid::new_v4(),
        quotation_number: "QT-3001".to_string(),
        valid_until: None,
        created_by: Uuid::new_v4(),
        line_items: vec![QuotationItemInput {
          description: LineItemDescription::new("Chiller overhaul".to_string()).unwrap(),
          quantity: Quantity::new(dec!(2)).unwrap(),
          unit_price: UnitPrice::new(dec!(7500)).unwrap(),
          discount: Discount::new(dec!(5), DiscountType::Percentage).unwrap(),
          tax_rate: TaxRate::new(dec!(18)).unwrap(),
        }],
      })
      .await
      .unwrap();
    quotation.id
  }

  #[tokio::test]
  async fn test_conversion_requires_approval() {
    let service = billing_service();
    let use_case = ConvertQuotationUseCase::new(service.clone());
    let quotation_id = seeded_quotation(&service).await;

    let err = use_case
      .execute(ConvertQuotationCommand {
        quotation_id,
        invoice_number: "INV-3002".to_string(),
        due_date: Utc::now() + Duration::days(30),
      })
      .await
      .unwrap_err();
    assert!(matches!(err, BillingError::InvalidTransition { .. }));
  }

  #[tokio::test]
  async fn test_approved_quotation_converts_with_matching_totals() {
    let service = billing_service();
    let review = ReviewQuotationUseCase::new(service.clone());
    let convert = ConvertQuotationUseCase::new(service.clone());
    let quotation_id = seeded_quotation(&service).await;

    review
      .execute(ReviewQuotationCommand {
        actor_role: Role::Manager,
        quotation_id,
        approve: true,
      })
      .await
      .unwrap();

    let response = convert
      .execute(ConvertQuotationCommand {
        quotation_id,
        invoice_number: "INV-3002".to_string(),
        due_date: Utc::now() + Duration::days(30),
      })
      .await
      .unwrap();

    // 15000 line amount, 750 discount, 18% tax on 14250 = 2565
    assert_eq!(response.grand_total, dec!(16815));

    // Converting a second time fails
    let err = convert
      .execute(ConvertQuotationCommand {
        quotation_id,
        invoice_number: "INV-3003".to_string(),
        due_date: Utc::now() + Duration::days(30),
      })
      .await
      .unwrap_err();
    assert!(matches!(err, BillingError::InvalidTransition { .. }));
  }

  #[tokio::test]
  async fn test_sales_role_cannot_approve() {
    let service = billing_service();
    let review = ReviewQuotationUseCase::new(service.clone());
    let quotation_id = seeded_quotation(&service).await;

    let err = review
      .execute(ReviewQuotationCommand {
        actor_role: Role::Sales,
        quotation_id,
        approve: true,
      })
      .await
      .unwrap_err();
    assert!(matches!(err, BillingError::PermissionDenied(_)));
  }
}
