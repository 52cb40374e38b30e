use chrono::{DateTime, Duration, Utc};
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::amc::ports::AmcRepository;
use crate::domain::billing::ports::InvoiceRepository;
use crate::domain::crm::ports::{CallLogRepository, LeadRepository};
use crate::domain::crm::{PipelineSettings, stages};
use crate::domain::task::ports::TaskRepository;
use crate::domain::task::RecordModule;

use super::effects::Effect;
use super::errors::AutomationError;
use super::rules;

/// The six schedulable jobs. Each groups the rules that share a cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationJob {
  FollowUps,
  LeadHygiene,
  PaymentReminders,
  ContractRenewals,
  ContractExpiry,
  OverdueInvoices,
}

impl AutomationJob {
  pub fn all() -> [AutomationJob; 6] {
    [
      AutomationJob::FollowUps,
      AutomationJob::LeadHygiene,
      AutomationJob::PaymentReminders,
      AutomationJob::ContractRenewals,
      AutomationJob::ContractExpiry,
      AutomationJob::OverdueInvoices,
    ]
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      AutomationJob::FollowUps => "follow_ups",
      AutomationJob::LeadHygiene => "lead_hygiene",
      AutomationJob::PaymentReminders => "payment_reminders",
      AutomationJob::ContractRenewals => "contract_renewals",
      AutomationJob::ContractExpiry => "contract_expiry",
      AutomationJob::OverdueInvoices => "overdue_invoices",
    }
  }
}

impl FromStr for AutomationJob {
  type Err = AutomationError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "follow_ups" => Ok(AutomationJob::FollowUps),
      "lead_hygiene" => Ok(AutomationJob::LeadHygiene),
      "payment_reminders" => Ok(AutomationJob::PaymentReminders),
      "contract_renewals" => Ok(AutomationJob::ContractRenewals),
      "contract_expiry" => Ok(AutomationJob::ContractExpiry),
      "overdue_invoices" => Ok(AutomationJob::OverdueInvoices),
      _ => Err(AutomationError::UnknownJob(s.to_string())),
    }
  }
}

#[derive(Debug, Clone)]
pub struct RuleOutcome {
  pub rule: &'static str,
  pub effects_applied: usize,
  pub failures: usize,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
  pub job: AutomationJob,
  pub outcomes: Vec<RuleOutcome>,
}

impl RunSummary {
  pub fn effects_applied(&self) -> usize {
    self.outcomes.iter().map(|o| o.effects_applied).sum()
  }

  pub fn failures(&self) -> usize {
    self.outcomes.iter().map(|o| o.failures).sum()
  }
}

/// Scheduled batch scanner. Loads snapshots through the ports, evaluates the
/// pure rules and applies their effects, isolating failures per rule and per
/// entity so one bad document never stalls a sweep.
pub struct AutomationService {
  lead_repo: Arc<dyn LeadRepository>,
  call_log_repo: Arc<dyn CallLogRepository>,
  invoice_repo: Arc<dyn InvoiceRepository>,
  amc_repo: Arc<dyn AmcRepository>,
  task_repo: Arc<dyn TaskRepository>,
  settings: PipelineSettings,
}

impl AutomationService {
  pub fn new(
    lead_repo: Arc<dyn LeadRepository>,
    call_log_repo: Arc<dyn CallLogRepository>,
    invoice_repo: Arc<dyn InvoiceRepository>,
    amc_repo: Arc<dyn AmcRepository>,
    task_repo: Arc<dyn TaskRepository>,
    settings: PipelineSettings,
  ) -> Self {
    Self {
      lead_repo,
      call_log_repo,
      invoice_repo,
      amc_repo,
      task_repo,
      settings,
    }
  }

  pub async fn run(&self, job: AutomationJob, now: DateTime<Utc>) -> RunSummary {
    tracing::info!(job = job.as_str(), "Running automation job");

    let outcomes = match job {
      AutomationJob::FollowUps => vec![
        self
          .run_rule(
            "inactive_lead_follow_ups",
            self.gather_inactive_lead_follow_ups(now).await,
          )
          .await,
        self
          .run_rule("call_back_follow_ups", self.gather_call_back_follow_ups(now).await)
          .await,
      ],
      AutomationJob::LeadHygiene => vec![
        self
          .run_rule(
            "deprioritize_stale_leads",
            self.gather_deprioritize_stale_leads(now).await,
          )
          .await,
        self
          .run_rule(
            "escalate_high_value_leads",
            self.gather_escalate_high_value_leads(now).await,
          )
          .await,
        self
          .run_rule(
            "auto_qualify_contacted_leads",
            self.gather_auto_qualify_contacted_leads().await,
          )
          .await,
        self
          .run_rule(
            "auto_lose_silent_leads",
            self.gather_auto_lose_silent_leads(now).await,
          )
          .await,
        self
          .run_rule(
            "high_value_stalled_alerts",
            self.gather_high_value_stalled_alerts(now).await,
          )
          .await,
      ],
      AutomationJob::PaymentReminders => vec![
        self
          .run_rule("payment_reminders", self.gather_payment_reminders(now).await)
          .await,
      ],
      AutomationJob::ContractRenewals => vec![
        self
          .run_rule(
            "amc_renewal_reminders",
            self.gather_amc_renewal_reminders(now).await,
          )
          .await,
      ],
      AutomationJob::ContractExpiry => vec![
        self
          .run_rule(
            "expire_lapsed_contracts",
            self.gather_expire_lapsed_contracts(now).await,
          )
          .await,
      ],
      AutomationJob::OverdueInvoices => vec![
        self
          .run_rule(
            "flag_overdue_invoices",
            self.gather_flag_overdue_invoices(now).await,
          )
          .await,
      ],
    };

    let summary = RunSummary { job, outcomes };
    tracing::info!(
      job = job.as_str(),
      effects_applied = summary.effects_applied(),
      failures = summary.failures(),
      "Automation job finished"
    );
    summary
  }

  async fn run_rule(
    &self,
    rule: &'static str,
    gathered: Result<Vec<Effect>, String>,
  ) -> RuleOutcome {
    match gathered {
      Ok(effects) => {
        let (effects_applied, failures) = self.apply_effects(rule, effects).await;
        RuleOutcome {
          rule,
          effects_applied,
          failures,
        }
      }
      Err(message) => {
        tracing::error!(rule, error = %message, "Automation rule failed to gather inputs");
        RuleOutcome {
          rule,
          effects_applied: 0,
          failures: 1,
        }
      }
    }
  }

  async fn apply_effects(&self, rule: &'static str, effects: Vec<Effect>) -> (usize, usize) {
    let mut applied = 0;
    let mut failures = 0;

    for effect in effects {
      let kind = effect.kind();
      let result: Result<(), String> = match effect {
        Effect::CreateTask(task) => {
          self.task_repo.create(task).await.map(|_| ()).map_err(to_message)
        }
        Effect::UpdateLead(lead) => {
          self.lead_repo.update(lead).await.map(|_| ()).map_err(to_message)
        }
        Effect::UpdateCallLog(call_log) => self
          .call_log_repo
          .update(call_log)
          .await
          .map(|_| ())
          .map_err(to_message),
        Effect::UpdateInvoice(invoice) => self
          .invoice_repo
          .update(invoice)
          .await
          .map(|_| ())
          .map_err(to_message),
        Effect::UpdateAmc(contract) => {
          self.amc_repo.update(contract).await.map(|_| ()).map_err(to_message)
        }
      };

      match result {
        Ok(()) => applied += 1,
        Err(message) => {
          tracing::error!(rule, effect = kind, error = %message, "Failed to apply automation effect");
          failures += 1;
        }
      }
    }

    (applied, failures)
  }

  // Input gathering, one method per rule

  async fn gather_inactive_lead_follow_ups(
    &self,
    now: DateTime<Utc>,
  ) -> Result<Vec<Effect>, String> {
    let leads = self.lead_repo.find_open().await.map_err(to_message)?;
    let open_tasks = self
      .task_repo
      .find_open_for_module(RecordModule::Lead)
      .await
      .map_err(to_message)?;
    Ok(rules::inactive_lead_follow_ups(now, &leads, &open_tasks))
  }

  async fn gather_call_back_follow_ups(&self, now: DateTime<Utc>) -> Result<Vec<Effect>, String> {
    let since = now - Duration::hours(rules::CALL_BACK_WINDOW_HOURS);
    let call_logs = self
      .call_log_repo
      .find_created_after(since)
      .await
      .map_err(to_message)?;
    Ok(rules::call_back_follow_ups(now, &call_logs))
  }

  async fn gather_deprioritize_stale_leads(
    &self,
    now: DateTime<Utc>,
  ) -> Result<Vec<Effect>, String> {
    let leads = self.lead_repo.find_open().await.map_err(to_message)?;
    Ok(rules::deprioritize_stale_leads(now, &leads))
  }

  async fn gather_escalate_high_value_leads(
    &self,
    now: DateTime<Utc>,
  ) -> Result<Vec<Effect>, String> {
    let leads = self.lead_repo.find_open().await.map_err(to_message)?;
    let open_tasks = self
      .task_repo
      .find_open_for_module(RecordModule::Lead)
      .await
      .map_err(to_message)?;
    Ok(rules::escalate_high_value_leads(now, &leads, &open_tasks))
  }

  async fn gather_auto_qualify_contacted_leads(&self) -> Result<Vec<Effect>, String> {
    let leads = self
      .lead_repo
      .find_in_stage(stages::CONTACTED)
      .await
      .map_err(to_message)?;
    Ok(rules::auto_qualify_contacted_leads(&leads, &self.settings))
  }

  async fn gather_auto_lose_silent_leads(
    &self,
    now: DateTime<Utc>,
  ) -> Result<Vec<Effect>, String> {
    let leads = self.lead_repo.find_open().await.map_err(to_message)?;
    Ok(rules::auto_lose_silent_leads(now, &leads, &self.settings))
  }

  async fn gather_payment_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Effect>, String> {
    let cutoff = now + Duration::days(rules::PAYMENT_REMINDER_WINDOW_DAYS);
    let invoices = self
      .invoice_repo
      .find_payable_due_before(cutoff)
      .await
      .map_err(to_message)?;
    let open_tasks = self
      .task_repo
      .find_open_for_module(RecordModule::Invoice)
      .await
      .map_err(to_message)?;
    Ok(rules::payment_reminders(now, &invoices, &open_tasks))
  }

  async fn gather_amc_renewal_reminders(
    &self,
    now: DateTime<Utc>,
  ) -> Result<Vec<Effect>, String> {
    let cutoff = now + Duration::days(rules::RENEWAL_WINDOW_DAYS);
    let contracts = self
      .amc_repo
      .find_active_ending_before(cutoff)
      .await
      .map_err(to_message)?;
    Ok(rules::amc_renewal_reminders(now, &contracts))
  }

  async fn gather_high_value_stalled_alerts(
    &self,
    now: DateTime<Utc>,
  ) -> Result<Vec<Effect>, String> {
    let leads = self.lead_repo.find_open().await.map_err(to_message)?;
    let open_tasks = self
      .task_repo
      .find_open_for_module(RecordModule::Lead)
      .await
      .map_err(to_message)?;
    Ok(rules::high_value_stalled_alerts(now, &leads, &open_tasks))
  }

  async fn gather_expire_lapsed_contracts(
    &self,
    now: DateTime<Utc>,
  ) -> Result<Vec<Effect>, String> {
    let contracts = self
      .amc_repo
      .find_active_ending_before(now)
      .await
      .map_err(to_message)?;
    Ok(rules::expire_lapsed_contracts(now, &contracts))
  }

  async fn gather_flag_overdue_invoices(
    &self,
    now: DateTime<Utc>,
  ) -> Result<Vec<Effect>, String> {
    let invoices = self
      .invoice_repo
      .find_payable_due_before(now)
      .await
      .map_err(to_message)?;
    Ok(rules::flag_overdue_invoices(now, &invoices))
  }
}

fn to_message<E: std::fmt::Display>(error: E) -> String {
  error.to_string()
}
