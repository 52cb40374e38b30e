use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::access::{Capability, Role};
use crate::domain::billing::{ApprovalStatus, BillingError, BillingService};

#[derive(Debug, Deserialize)]
pub struct ReviewQuotationCommand {
  pub actor_role: Role,
  pub quotation_id: Uuid,
  pub approve: bool,
}

#[derive(Debug, Serialize)]
pub struct ReviewQuotationResponse {
  pub quotation_id: Uuid,
  pub approval_status: String,
}

pub struct ReviewQuotationUseCase {
  billing_service: Arc<BillingService>,
}

impl ReviewQuotationUseCase {
  pub fn new(billing_service: Arc<BillingService>) -> Self {
    Self { billing_service }
  }

  pub async fn execute(
    &self,
    command: ReviewQuotationCommand,
  ) -> Result<ReviewQuotationResponse, BillingError> {
    if !command.actor_role.has_capability(Capability::ApproveQuotations) {
      return Err(BillingError::PermissionDenied(
        "Role is not allowed to review quotations".to_string(),
      ));
    }

    let decision = if command.approve {
      ApprovalStatus::Approved
    } else {
      ApprovalStatus::Rejected
    };

    let quotation = self
      .billing_service
      .review_quotation(command.quotation_id, decision)
      .await?;

    Ok(ReviewQuotationResponse {
      quotation_id: quotation.id,
      approval_status: quotation.approval_status.as_str().to_string(),
    })
  }
}
