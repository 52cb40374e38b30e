use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::amc::entities::AmcContract;
use crate::domain::amc::errors::AmcError;
use crate::domain::amc::ports::AmcRepository;
use crate::domain::amc::value_objects::AmcStatus;

#[derive(Default)]
pub struct InMemoryAmcRepository {
  contracts: RwLock<HashMap<Uuid, AmcContract>>,
}

impl InMemoryAmcRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl AmcRepository for InMemoryAmcRepository {
  async fn create(&self, contract: AmcContract) -> Result<AmcContract, AmcError> {
    let mut contracts = self.contracts.write().unwrap();
    contracts.insert(contract.id, contract.clone());
    Ok(contract)
  }

  async fn update(&self, contract: AmcContract) -> Result<AmcContract, AmcError> {
    let mut contracts = self.contracts.write().unwrap();
    if !contracts.contains_key(&contract.id) {
      return Err(AmcError::ContractNotFound(contract.id));
    }
    contracts.insert(contract.id, contract.clone());
    Ok(contract)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<AmcContract>, AmcError> {
    let contracts = self.contracts.read().unwrap();
    Ok(contracts.get(&id).cloned())
  }

  async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<AmcContract>, AmcError> {
    let contracts = self.contracts.read().unwrap();
    Ok(
      contracts
        .values()
        .filter(|c| c.client_id == client_id)
        .cloned()
        .collect(),
    )
  }

  async fn find_active_ending_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> Result<Vec<AmcContract>, AmcError> {
    let contracts = self.contracts.read().unwrap();
    Ok(
      contracts
        .values()
        .filter(|c| c.status == AmcStatus::Active && c.end_date <= cutoff)
        .cloned()
        .collect(),
    )
  }
}
