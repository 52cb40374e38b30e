use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::amc::{AmcError, AmcService};

#[derive(Debug, Deserialize)]
pub struct RenewContractCommand {
  pub contract_id: Uuid,
  pub new_end_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RenewContractResponse {
  pub old_contract_id: Uuid,
  pub new_contract_id: Uuid,
  pub start_date: DateTime<Utc>,
  pub end_date: DateTime<Utc>,
  pub number_of_services: u32,
}

pub struct RenewContractUseCase {
  amc_service: Arc<AmcService>,
}

impl RenewContractUseCase {
  pub fn new(amc_service: Arc<AmcService>) -> Self {
    Self { amc_service }
  }

  pub async fn execute(
    &self,
    command: RenewContractCommand,
  ) -> Result<RenewContractResponse, AmcError> {
    let (old, new) = self
      .amc_service
      .renew_contract(command.contract_id, command.new_end_date)
      .await?;

    Ok(RenewContractResponse {
      old_contract_id: old.id,
      new_contract_id: new.id,
      start_date: new.start_date,
      end_date: new.end_date,
      number_of_services: new.number_of_services,
    })
  }
}
