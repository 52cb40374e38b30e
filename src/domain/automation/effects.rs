use crate::domain::amc::AmcContract;
use crate::domain::billing::Invoice;
use crate::domain::crm::{CallLog, Lead};
use crate::domain::task::Task;

/// Mutation requested by an automation rule. Rules are pure functions over
/// snapshots; the orchestrator is the only place effects touch a store.
#[derive(Debug, Clone)]
pub enum Effect {
  CreateTask(Task),
  UpdateLead(Lead),
  UpdateCallLog(CallLog),
  UpdateInvoice(Invoice),
  UpdateAmc(AmcContract),
}

impl Effect {
  pub fn kind(&self) -> &'static str {
    match self {
      Effect::CreateTask(_) => "create_task",
      Effect::UpdateLead(_) => "update_lead",
      Effect::UpdateCallLog(_) => "update_call_log",
      Effect::UpdateInvoice(_) => "update_invoice",
      Effect::UpdateAmc(_) => "update_amc",
    }
  }
}
