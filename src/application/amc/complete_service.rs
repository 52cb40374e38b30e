use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::amc::{AmcError, AmcService};

#[derive(Debug, Deserialize)]
pub struct CompleteServiceCommand {
  pub contract_id: Uuid,
  pub service_id: Uuid,
  pub completed_by: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CompleteServiceResponse {
  pub contract_id: Uuid,
  pub services_completed: u32,
  pub number_of_services: u32,
}

pub struct CompleteServiceUseCase {
  amc_service: Arc<AmcService>,
}

impl CompleteServiceUseCase {
  pub fn new(amc_service: Arc<AmcService>) -> Self {
    Self { amc_service }
  }

  pub async fn execute(
    &self,
    command: CompleteServiceCommand,
  ) -> Result<CompleteServiceResponse, AmcError> {
    let contract = self
      .amc_service
      .complete_service(command.contract_id, command.service_id, command.completed_by)
      .await?;

    Ok(CompleteServiceResponse {
      contract_id: contract.id,
      services_completed: contract.services_completed,
      number_of_services: contract.number_of_services,
    })
  }
}
