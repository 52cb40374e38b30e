//! Automation rules as pure functions: given the clock and a snapshot of the
//! relevant records, each returns the effects it wants applied. Duplicate
//! suppression for task-creating rules goes through the open-task snapshot
//! for the record's module.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::amc::AmcContract;
use crate::domain::billing::Invoice;
use crate::domain::crm::{
  CallLog, CallOutcome, Lead, LeadPriority, LeadStatus, PipelineSettings,
  LOST_REASON_NO_RESPONSE, stages,
};
use crate::domain::task::{RecordModule, RelatedTo, Task, TaskPriority};

use super::effects::Effect;

pub const INACTIVE_LEAD_AGE_DAYS: i64 = 7;
pub const CALL_BACK_WINDOW_HOURS: i64 = 24;
pub const STALE_LEAD_AGE_DAYS: i64 = 14;
pub const SLA_LEAD_AGE_DAYS: i64 = 14;
pub const AUTO_LOST_AGE_DAYS: i64 = 60;
pub const PAYMENT_REMINDER_WINDOW_DAYS: i64 = 3;
pub const RENEWAL_WINDOW_DAYS: i64 = 30;
pub const HIGH_VALUE_STALL_DAYS: i64 = 5;

pub fn sla_revenue_threshold() -> Decimal {
  Decimal::from(50_000)
}

pub fn high_value_threshold() -> Decimal {
  Decimal::from(100_000)
}

fn has_open_task(open_tasks: &[Task], module: RecordModule, record_id: Uuid) -> bool {
  open_tasks.iter().any(|task| {
    task.is_open() && task.related_to == Some(RelatedTo::new(module, record_id))
  })
}

/// Leads still being worked but untouched for a week get a follow-up task.
pub fn inactive_lead_follow_ups(
  now: DateTime<Utc>,
  leads: &[Lead],
  open_tasks: &[Task],
) -> Vec<Effect> {
  let threshold = now - Duration::days(INACTIVE_LEAD_AGE_DAYS);
  leads
    .iter()
    .filter(|lead| lead.status.is_active() && lead.updated_at < threshold)
    .filter(|lead| !has_open_task(open_tasks, RecordModule::Lead, lead.id))
    .map(|lead| {
      Effect::CreateTask(Task::new(
        format!("Follow up: {}", lead.title),
        format!(
          "No activity on this lead since {}",
          lead.updated_at.format("%Y-%m-%d")
        ),
        TaskPriority::High,
        now + Duration::days(1),
        Some(lead.created_by),
        Some(RelatedTo::new(RecordModule::Lead, lead.id)),
        None,
      ))
    })
    .collect()
}

/// Calls where the prospect asked to be called back, logged within the last
/// day and not yet flagged, get a task and the flag set. The flag is what
/// keeps this rule from firing twice.
pub fn call_back_follow_ups(now: DateTime<Utc>, call_logs: &[CallLog]) -> Vec<Effect> {
  let window_start = now - Duration::hours(CALL_BACK_WINDOW_HOURS);
  let mut effects = Vec::new();

  for log in call_logs {
    if log.outcome != CallOutcome::CallBackRequested
      || log.follow_up_required
      || log.created_at < window_start
    {
      continue;
    }

    effects.push(Effect::CreateTask(Task::new(
      "Return requested call".to_string(),
      "The prospect asked to be called back".to_string(),
      TaskPriority::High,
      now + Duration::hours(CALL_BACK_WINDOW_HOURS),
      Some(log.created_by),
      Some(RelatedTo::new(RecordModule::CallLog, log.id)),
      None,
    )));

    let mut updated = log.clone();
    updated.require_follow_up();
    effects.push(Effect::UpdateCallLog(updated));
  }

  effects
}

/// In-progress leads stalled for two weeks outside a closing stage drop to
/// low priority, with an audit note.
pub fn deprioritize_stale_leads(now: DateTime<Utc>, leads: &[Lead]) -> Vec<Effect> {
  let threshold = now - Duration::days(STALE_LEAD_AGE_DAYS);
  leads
    .iter()
    .filter(|lead| {
      lead.status == LeadStatus::InProgress
        && lead.stage != stages::WON
        && lead.stage != stages::LOST
        && lead.updated_at < threshold
        && lead.priority != LeadPriority::Low
    })
    .map(|lead| {
      let mut updated = lead.clone();
      updated.set_priority(LeadPriority::Low);
      updated.add_note(format!(
        "Priority lowered automatically after {} days without activity",
        STALE_LEAD_AGE_DAYS
      ));
      Effect::UpdateLead(updated)
    })
    .collect()
}

/// SLA escalation: big in-progress deals that stall before reaching the
/// proposal stages get a critical task for the lead's creator and critical
/// priority.
pub fn escalate_high_value_leads(
  now: DateTime<Utc>,
  leads: &[Lead],
  open_tasks: &[Task],
) -> Vec<Effect> {
  let threshold = now - Duration::days(SLA_LEAD_AGE_DAYS);
  let mut effects = Vec::new();

  for lead in leads {
    let escalates = lead.expected_revenue > sla_revenue_threshold()
      && lead.status == LeadStatus::InProgress
      && !matches!(
        lead.stage.as_str(),
        stages::WON | stages::LOST | stages::PROPOSAL_SENT | stages::NEGOTIATION
      )
      && lead.updated_at < threshold;
    if !escalates {
      continue;
    }

    if !has_open_task(open_tasks, RecordModule::Lead, lead.id) {
      effects.push(Effect::CreateTask(Task::new(
        format!("Escalation: {}", lead.title),
        format!(
          "High-value lead stalled for {} days; needs manager attention",
          SLA_LEAD_AGE_DAYS
        ),
        TaskPriority::Critical,
        now + Duration::days(1),
        Some(lead.created_by),
        Some(RelatedTo::new(RecordModule::Lead, lead.id)),
        None,
      )));
    }

    if lead.priority != LeadPriority::Critical {
      let mut updated = lead.clone();
      updated.set_priority(LeadPriority::Critical);
      effects.push(Effect::UpdateLead(updated));
    }
  }

  effects
}

/// Every contacted lead moves straight to Qualified.
pub fn auto_qualify_contacted_leads(
  leads: &[Lead],
  settings: &PipelineSettings,
) -> Vec<Effect> {
  leads
    .iter()
    .filter(|lead| lead.stage == stages::CONTACTED)
    .filter_map(|lead| {
      let mut updated = lead.clone();
      updated
        .change_stage(settings, stages::QUALIFIED)
        .ok()
        .map(|_| Effect::UpdateLead(updated))
    })
    .collect()
}

/// Open leads with no activity for two months and no conversion close as
/// lost with a "No Response" reason.
pub fn auto_lose_silent_leads(
  now: DateTime<Utc>,
  leads: &[Lead],
  settings: &PipelineSettings,
) -> Vec<Effect> {
  let threshold = now - Duration::days(AUTO_LOST_AGE_DAYS);
  leads
    .iter()
    .filter(|lead| {
      lead.status == LeadStatus::Open && lead.created_at < threshold && !lead.converted
    })
    .filter_map(|lead| {
      let mut updated = lead.clone();
      updated
        .mark_lost(settings, LOST_REASON_NO_RESPONSE.to_string())
        .ok()
        .map(|_| Effect::UpdateLead(updated))
    })
    .collect()
}

/// Outstanding invoices due within the reminder window (or already due) get
/// a reminder task whose priority scales with urgency.
pub fn payment_reminders(
  now: DateTime<Utc>,
  invoices: &[Invoice],
  open_tasks: &[Task],
) -> Vec<Effect> {
  let cutoff = now + Duration::days(PAYMENT_REMINDER_WINDOW_DAYS);
  let mut effects = Vec::new();

  for invoice in invoices {
    if !invoice.payment_status.is_outstanding()
      || invoice.status == crate::domain::billing::InvoiceStatus::Cancelled
      || invoice.due_date > cutoff
    {
      continue;
    }
    if has_open_task(open_tasks, RecordModule::Invoice, invoice.id) {
      continue;
    }

    let days_until_due = (invoice.due_date - now).num_days();
    let priority = if days_until_due <= 1 {
      TaskPriority::Critical
    } else if days_until_due <= PAYMENT_REMINDER_WINDOW_DAYS {
      TaskPriority::High
    } else {
      TaskPriority::Medium
    };

    effects.push(Effect::CreateTask(Task::new(
      format!("Payment reminder: {}", invoice.invoice_number),
      format!(
        "Outstanding balance {} due {}",
        invoice.balance_amount,
        invoice.due_date.format("%Y-%m-%d")
      ),
      priority,
      invoice.due_date,
      Some(invoice.created_by),
      Some(RelatedTo::new(RecordModule::Invoice, invoice.id)),
      None,
    )));
  }

  effects
}

/// Auto-renewing contracts entering their last month get a renewal task
/// once; the notification flag is the idempotence guard.
pub fn amc_renewal_reminders(now: DateTime<Utc>, contracts: &[AmcContract]) -> Vec<Effect> {
  use crate::domain::amc::AmcStatus;

  let cutoff = now + Duration::days(RENEWAL_WINDOW_DAYS);
  let mut effects = Vec::new();

  for contract in contracts {
    if contract.status != AmcStatus::Active
      || !contract.auto_renewal
      || contract.renewal_notification_sent
      || contract.end_date > cutoff
    {
      continue;
    }

    effects.push(Effect::CreateTask(Task::new(
      format!("Renew contract {}", contract.contract_number),
      format!(
        "Contract ends {}; renewal is due",
        contract.end_date.format("%Y-%m-%d")
      ),
      TaskPriority::High,
      contract.end_date,
      contract.assigned_to,
      Some(RelatedTo::new(RecordModule::Amc, contract.id)),
      None,
    )));

    let mut updated = contract.clone();
    updated.mark_renewal_notified();
    effects.push(Effect::UpdateAmc(updated));
  }

  effects
}

/// Very large deals that have sat untouched for a few days raise a critical
/// alert even before the SLA window.
pub fn high_value_stalled_alerts(
  now: DateTime<Utc>,
  leads: &[Lead],
  open_tasks: &[Task],
) -> Vec<Effect> {
  let threshold = now - Duration::days(HIGH_VALUE_STALL_DAYS);
  leads
    .iter()
    .filter(|lead| {
      lead.expected_revenue > high_value_threshold()
        && lead.status.is_active()
        && lead.stage != stages::WON
        && lead.stage != stages::LOST
        && lead.updated_at < threshold
    })
    .filter(|lead| !has_open_task(open_tasks, RecordModule::Lead, lead.id))
    .map(|lead| {
      Effect::CreateTask(Task::new(
        format!("High-value lead stalled: {}", lead.title),
        format!(
          "Expected revenue {} with no activity for {} days",
          lead.expected_revenue, HIGH_VALUE_STALL_DAYS
        ),
        TaskPriority::Critical,
        now + Duration::days(1),
        Some(lead.created_by),
        Some(RelatedTo::new(RecordModule::Lead, lead.id)),
        None,
      ))
    })
    .collect()
}

/// Bulk expiry sweep over active contracts past their end date.
pub fn expire_lapsed_contracts(now: DateTime<Utc>, contracts: &[AmcContract]) -> Vec<Effect> {
  contracts
    .iter()
    .filter_map(|contract| {
      let mut updated = contract.clone();
      updated.refresh_expiry(now).then(|| Effect::UpdateAmc(updated))
    })
    .collect()
}

/// Overdue sweep over outstanding invoices past their due date.
pub fn flag_overdue_invoices(now: DateTime<Utc>, invoices: &[Invoice]) -> Vec<Effect> {
  invoices
    .iter()
    .filter_map(|invoice| {
      let mut updated = invoice.clone();
      updated.mark_overdue(now).then(|| Effect::UpdateInvoice(updated))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::amc::{AmcContract, AmcStatus, ContractValue, ServiceFrequency};
  use crate::domain::billing::{
    Discount, GstRates, Invoice, InvoiceLineItem, InvoiceStatus, LineItemDescription, Quantity,
    UnitPrice,
  };
  use rust_decimal_macros::dec;

  fn settings() -> PipelineSettings {
    PipelineSettings::default()
  }

  fn lead_with(revenue: Decimal, status: LeadStatus, stage: &str, stale_days: i64) -> Lead {
    let mut lead = Lead::new(
      "Packaging line retrofit".to_string(),
      None,
      revenue,
      Uuid::new_v4(),
      &settings(),
    )
    .unwrap();
    lead.status = status;
    lead.stage = stage.to_string();
    lead.updated_at = Utc::now() - Duration::days(stale_days);
    lead
  }

  fn open_lead_task(lead: &Lead) -> Task {
    Task::new(
      "Existing task".to_string(),
      String::new(),
      TaskPriority::Medium,
      Utc::now(),
      None,
      Some(RelatedTo::new(RecordModule::Lead, lead.id)),
      None,
    )
  }

  fn outstanding_invoice(due_in_days: i64) -> Invoice {
    let mut invoice = Invoice::new(
      Uuid::new_v4(),
      "INV-55".to_string(),
      vec![InvoiceLineItem::new(
        LineItemDescription::new("Compressor overhaul".to_string()).unwrap(),
        Quantity::new(dec!(1)).unwrap(),
        UnitPrice::new(dec!(20000)).unwrap(),
        Discount::none(),
        GstRates::default(),
        1,
      )],
      Utc::now() + Duration::days(due_in_days),
      Uuid::new_v4(),
    );
    invoice.change_status(InvoiceStatus::Sent).unwrap();
    invoice
  }

  fn active_contract(ends_in_days: i64, auto_renewal: bool) -> AmcContract {
    let start = Utc::now() - Duration::days(360 - ends_in_days);
    AmcContract::new(
      Uuid::new_v4(),
      "AMC-77".to_string(),
      start,
      start + chrono::Duration::days(360),
      ServiceFrequency::Monthly,
      ContractValue::new(dec!(30000)).unwrap(),
      None,
      Some(Uuid::new_v4()),
      auto_renewal,
      Uuid::new_v4(),
    )
    .unwrap()
  }

  #[test]
  fn test_inactive_lead_rule_matches_week_old_leads() {
    let stale = lead_with(dec!(10000), LeadStatus::Open, stages::NEW, 8);
    let fresh = lead_with(dec!(10000), LeadStatus::InProgress, stages::NEW, 2);
    let lost = lead_with(dec!(10000), LeadStatus::Lost, stages::LOST, 30);

    let effects =
      inactive_lead_follow_ups(Utc::now(), &[stale.clone(), fresh, lost], &[]);
    assert_eq!(effects.len(), 1);
    match &effects[0] {
      Effect::CreateTask(task) => {
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(
          task.related_to,
          Some(RelatedTo::new(RecordModule::Lead, stale.id))
        );
      }
      other => panic!("unexpected effect {:?}", other.kind()),
    }
  }

  #[test]
  fn test_inactive_lead_rule_skips_leads_with_open_task() {
    let stale = lead_with(dec!(10000), LeadStatus::Open, stages::NEW, 8);
    let existing = open_lead_task(&stale);

    let effects = inactive_lead_follow_ups(Utc::now(), &[stale], &[existing]);
    assert!(effects.is_empty());
  }

  #[test]
  fn test_call_back_rule_flags_and_creates_task() {
    let now = Utc::now();
    let mut recent = CallLog::new(
      Uuid::new_v4(),
      None,
      CallOutcome::CallBackRequested,
      None,
      Uuid::new_v4(),
    );
    recent.created_at = now - Duration::hours(2);

    let effects = call_back_follow_ups(now, &[recent.clone()]);
    assert_eq!(effects.len(), 2);
    assert!(matches!(effects[0], Effect::CreateTask(_)));
    match &effects[1] {
      Effect::UpdateCallLog(updated) => assert!(updated.follow_up_required),
      other => panic!("unexpected effect {:?}", other.kind()),
    }

    // Already flagged -> nothing
    let mut flagged = recent.clone();
    flagged.require_follow_up();
    assert!(call_back_follow_ups(now, &[flagged]).is_empty());

    // Too old -> nothing
    let mut old = recent;
    old.created_at = now - Duration::hours(30);
    assert!(call_back_follow_ups(now, &[old]).is_empty());
  }

  #[test]
  fn test_deprioritize_rule() {
    let stale = lead_with(dec!(10000), LeadStatus::InProgress, stages::QUALIFIED, 15);
    let effects = deprioritize_stale_leads(Utc::now(), &[stale]);
    assert_eq!(effects.len(), 1);
    match &effects[0] {
      Effect::UpdateLead(lead) => {
        assert_eq!(lead.priority, LeadPriority::Low);
        assert_eq!(lead.notes.len(), 1);
      }
      other => panic!("unexpected effect {:?}", other.kind()),
    }

    // Already low stays untouched, so the note is written once
    let mut low = lead_with(dec!(10000), LeadStatus::InProgress, stages::QUALIFIED, 20);
    low.priority = LeadPriority::Low;
    assert!(deprioritize_stale_leads(Utc::now(), &[low]).is_empty());
  }

  #[test]
  fn test_sla_escalation_rule() {
    let now = Utc::now();
    let big = lead_with(dec!(80000), LeadStatus::InProgress, stages::QUALIFIED, 15);
    let effects = escalate_high_value_leads(now, &[big.clone()], &[]);
    assert_eq!(effects.len(), 2);
    match &effects[0] {
      Effect::CreateTask(task) => {
        assert_eq!(task.priority, TaskPriority::Critical);
        assert_eq!(task.assigned_to, Some(big.created_by));
      }
      other => panic!("unexpected effect {:?}", other.kind()),
    }
    match &effects[1] {
      Effect::UpdateLead(lead) => assert_eq!(lead.priority, LeadPriority::Critical),
      other => panic!("unexpected effect {:?}", other.kind()),
    }

    // Leads already in a proposal stage are exempt
    let negotiating =
      lead_with(dec!(80000), LeadStatus::InProgress, stages::NEGOTIATION, 20);
    assert!(escalate_high_value_leads(now, &[negotiating], &[]).is_empty());

    // Below the revenue bar nothing happens
    let small = lead_with(dec!(20000), LeadStatus::InProgress, stages::QUALIFIED, 20);
    assert!(escalate_high_value_leads(now, &[small], &[]).is_empty());
  }

  #[test]
  fn test_auto_qualify_rule() {
    let contacted = lead_with(dec!(10000), LeadStatus::Open, stages::CONTACTED, 0);
    let effects = auto_qualify_contacted_leads(&[contacted], &settings());
    assert_eq!(effects.len(), 1);
    match &effects[0] {
      Effect::UpdateLead(lead) => {
        assert_eq!(lead.stage, stages::QUALIFIED);
        assert_eq!(lead.probability, 40);
      }
      other => panic!("unexpected effect {:?}", other.kind()),
    }
  }

  #[test]
  fn test_auto_lost_rule() {
    let now = Utc::now();
    let mut silent = lead_with(dec!(10000), LeadStatus::Open, stages::NEW, 0);
    silent.created_at = now - Duration::days(61);

    let effects = auto_lose_silent_leads(now, &[silent], &settings());
    assert_eq!(effects.len(), 1);
    match &effects[0] {
      Effect::UpdateLead(lead) => {
        assert_eq!(lead.status, LeadStatus::Lost);
        assert_eq!(lead.stage, stages::LOST);
        assert_eq!(lead.lost_reason.as_deref(), Some(LOST_REASON_NO_RESPONSE));
      }
      other => panic!("unexpected effect {:?}", other.kind()),
    }

    // Converted leads are left alone
    let mut converted = lead_with(dec!(10000), LeadStatus::Open, stages::NEW, 0);
    converted.created_at = now - Duration::days(61);
    converted.converted = true;
    assert!(auto_lose_silent_leads(now, &[converted], &settings()).is_empty());
  }

  #[test]
  fn test_payment_reminder_priority_scales_with_urgency() {
    let now = Utc::now();
    let due_tomorrow = outstanding_invoice(1);
    let due_in_three = outstanding_invoice(3);
    let overdue = outstanding_invoice(-2);

    let effects = payment_reminders(
      now,
      &[due_tomorrow.clone(), due_in_three.clone(), overdue.clone()],
      &[],
    );
    assert_eq!(effects.len(), 3);

    let priority_for = |invoice_id| {
      effects
        .iter()
        .find_map(|e| match e {
          Effect::CreateTask(task)
            if task.related_to
              == Some(RelatedTo::new(RecordModule::Invoice, invoice_id)) =>
          {
            Some(task.priority)
          }
          _ => None,
        })
        .unwrap()
    };

    assert_eq!(priority_for(due_tomorrow.id), TaskPriority::Critical);
    assert_eq!(priority_for(due_in_three.id), TaskPriority::High);
    assert_eq!(priority_for(overdue.id), TaskPriority::Critical);
  }

  #[test]
  fn test_payment_reminder_skips_settled_and_far_out_invoices() {
    let now = Utc::now();
    let far_out = outstanding_invoice(10);
    let mut cancelled = outstanding_invoice(1);
    cancelled.status = InvoiceStatus::Cancelled;

    assert!(payment_reminders(now, &[far_out, cancelled], &[]).is_empty());
  }

  #[test]
  fn test_payment_reminder_skips_invoices_with_open_task() {
    let now = Utc::now();
    let invoice = outstanding_invoice(1);
    let existing = Task::new(
      "Existing reminder".to_string(),
      String::new(),
      TaskPriority::High,
      now,
      None,
      Some(RelatedTo::new(RecordModule::Invoice, invoice.id)),
      None,
    );
    assert!(payment_reminders(now, &[invoice], &[existing]).is_empty());
  }

  #[test]
  fn test_renewal_reminder_sets_flag_once() {
    let now = Utc::now();
    let contract = active_contract(20, true);

    let effects = amc_renewal_reminders(now, &[contract]);
    assert_eq!(effects.len(), 2);
    let updated = match &effects[1] {
      Effect::UpdateAmc(updated) => updated.clone(),
      other => panic!("unexpected effect {:?}", other.kind()),
    };
    assert!(updated.renewal_notification_sent);

    // Second pass over the updated contract emits nothing
    assert!(amc_renewal_reminders(now, &[updated]).is_empty());

    // Manual-renewal contracts are skipped
    let manual = active_contract(20, false);
    assert!(amc_renewal_reminders(now, &[manual]).is_empty());
  }

  #[test]
  fn test_high_value_stalled_rule() {
    let now = Utc::now();
    let whale = lead_with(dec!(150000), LeadStatus::Open, stages::QUALIFIED, 6);
    let effects = high_value_stalled_alerts(now, &[whale], &[]);
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::CreateTask(_)));

    let medium = lead_with(dec!(90000), LeadStatus::Open, stages::QUALIFIED, 6);
    assert!(high_value_stalled_alerts(now, &[medium], &[]).is_empty());
  }

  #[test]
  fn test_expiry_sweep() {
    let now = Utc::now();
    let lapsed = active_contract(-3, false);
    let current = active_contract(60, false);

    let effects = expire_lapsed_contracts(now, &[lapsed, current]);
    assert_eq!(effects.len(), 1);
    match &effects[0] {
      Effect::UpdateAmc(updated) => assert_eq!(updated.status, AmcStatus::Expired),
      other => panic!("unexpected effect {:?}", other.kind()),
    }
  }

  #[test]
  fn test_overdue_sweep() {
    let now = Utc::now();
    let overdue = outstanding_invoice(-1);
    let current = outstanding_invoice(10);
    let mut cancelled = outstanding_invoice(-5);
    cancelled.status = InvoiceStatus::Cancelled;

    let effects = flag_overdue_invoices(now, &[overdue, current, cancelled]);
    assert_eq!(effects.len(), 1);
    match &effects[0] {
      Effect::UpdateInvoice(updated) => assert_eq!(updated.status, InvoiceStatus::Overdue),
      other => panic!("unexpected effect {:?}", other.kind()),
    }
  }
}
