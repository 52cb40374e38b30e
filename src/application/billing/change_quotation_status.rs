use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::billing::{BillingError, BillingService, QuotationStatus};

#[derive(Debug, Deserialize)]
pub struct ChangeQuotationStatusCommand {
  pub quotation_id: Uuid,
  pub new_status: String,
}

#[derive(Debug, Serialize)]
pub struct ChangeQuotationStatusResponse {
  pub quotation_id: Uuid,
  pub status: String,
}

pub struct ChangeQuotationStatusUseCase {
  billing_service: Arc<BillingService>,
}

impl ChangeQuotationStatusUseCase {
  pub fn new(billing_service: Arc<BillingService>) -> Self {
    Self { billing_service }
  }

  pub async fn execute(
    &self,
    command: ChangeQuotationStatusCommand,
  ) -> Result<ChangeQuotationStatusResponse, BillingError> {
    let new_status = QuotationStatus::from_str(&command.new_status)?;

    let quotation = self
      .billing_service
      .change_quotation_status(command.quotation_id, new_status)
      .await?;

    Ok(ChangeQuotationStatusResponse {
      quotation_id: quotation.id,
      status: quotation.status.as_str().to_string(),
    })
  }
}
