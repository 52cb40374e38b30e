use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::crm::entities::Lead;
use crate::domain::crm::errors::CrmError;
use crate::domain::crm::ports::LeadRepository;

#[derive(Default)]
pub struct InMemoryLeadRepository {
  leads: RwLock<HashMap<Uuid, Lead>>,
}

impl InMemoryLeadRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
  async fn create(&self, lead: Lead) -> Result<Lead, CrmError> {
    let mut leads = self.leads.write().unwrap();
    leads.insert(lead.id, lead.clone());
    Ok(lead)
  }

  async fn update(&self, lead: Lead) -> Result<Lead, CrmError> {
    let mut leads = self.leads.write().unwrap();
    if !leads.contains_key(&lead.id) {
      return Err(CrmError::LeadNotFound(lead.id));
    }
    leads.insert(lead.id, lead.clone());
    Ok(lead)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Lead>, CrmError> {
    let leads = self.leads.read().unwrap();
    Ok(leads.get(&id).cloned())
  }

  async fn find_open(&self) -> Result<Vec<Lead>, CrmError> {
    let leads = self.leads.read().unwrap();
    Ok(
      leads
        .values()
        .filter(|l| l.status.is_active())
        .cloned()
        .collect(),
    )
  }

  async fn find_in_stage(&self, stage: &str) -> Result<Vec<Lead>, CrmError> {
    let leads = self.leads.read().unwrap();
    Ok(
      leads
        .values()
        .filter(|l| l.stage == stage)
        .cloned()
        .collect(),
    )
  }
}
