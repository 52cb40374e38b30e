use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::billing::entities::Quotation;
use crate::domain::billing::errors::BillingError;
use crate::domain::billing::ports::QuotationRepository;

#[derive(Default)]
pub struct InMemoryQuotationRepository {
  quotations: RwLock<HashMap<Uuid, Quotation>>,
}

impl InMemoryQuotationRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl QuotationRepository for InMemoryQuotationRepository {
  async fn create(&self, quotation: Quotation) -> Result<Quotation, BillingError> {
    let mut quotations = self.quotations.write().unwrap();
    quotations.insert(quotation.id, quotation.clone());
    Ok(quotation)
  }

  async fn update(&self, quotation: Quotation) -> Result<Quotation, BillingError> {
    let mut quotations = self.quotations.write().unwrap();
    if !quotations.contains_key(&quotation.id) {
      return Err(BillingError::QuotationNotFound(quotation.id));
    }
    quotations.insert(quotation.id, quotation.clone());
    Ok(quotation)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Quotation>, BillingError> {
    let quotations = self.quotations.read().unwrap();
    Ok(quotations.get(&id).cloned())
  }

  async fn find_by_client(&self, client_id: Uuid) -> Result<Vec<Quotation>, BillingError> {
    let quotations = self.quotations.read().unwrap();
    Ok(
      quotations
        .values()
        .filter(|q| q.client_id == client_id)
        .cloned()
        .collect(),
    )
  }
}
