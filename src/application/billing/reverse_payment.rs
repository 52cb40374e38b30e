use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::access::{Capability, Role};
use crate::domain::billing::{BillingError, BillingService};

#[derive(Debug, Deserialize)]
pub struct ReversePaymentCommand {
  pub actor_role: Role,
  pub payment_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ReversePaymentResponse {
  pub invoice_id: Uuid,
  pub amount_paid: Decimal,
  pub balance_amount: Decimal,
  pub payment_status: String,
}

pub struct ReversePaymentUseCase {
  billing_service: Arc<BillingService>,
}

impl ReversePaymentUseCase {
  pub fn new(billing_service: Arc<BillingService>) -> Self {
    Self { billing_service }
  }

  pub async fn execute(
    &self,
    command: ReversePaymentCommand,
  ) -> Result<ReversePaymentResponse, BillingError> {
    if !command.actor_role.has_capability(Capability::RecordPayments) {
      return Err(BillingError::PermissionDenied(
        "Role is not allowed to reverse payments".to_string(),
      ));
    }

    let invoice = self.billing_service.reverse_payment(command.payment_id).await?;

    Ok(ReversePaymentResponse {
      invoice_id: invoice.id,
      amount_paid: invoice.amount_paid,
      balance_amount: invoice.balance_amount,
      payment_status: invoice.payment_status.as_str().to_string(),
    })
  }
}
