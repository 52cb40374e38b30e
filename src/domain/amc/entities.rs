use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AmcError;
use super::services::{derive_duration_months, derive_service_count};
use super::value_objects::{AmcStatus, ContractValue, ServiceFrequency, ServiceStatus};

// Embedded service visit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceVisit {
  pub id: Uuid,
  pub scheduled_date: DateTime<Utc>,
  pub status: ServiceStatus,
  pub completed_at: Option<DateTime<Utc>>,
  pub completed_by: Option<Uuid>,
  pub notes: Option<String>,
}

impl ServiceVisit {
  pub fn new(scheduled_date: DateTime<Utc>, notes: Option<String>) -> Self {
    Self {
      id: Uuid::new_v4(),
      scheduled_date,
      status: ServiceStatus::Scheduled,
      completed_at: None,
      completed_by: None,
      notes,
    }
  }

  pub fn complete(&mut self, completed_by: Uuid, now: DateTime<Utc>) -> Result<(), AmcError> {
    self.transition(ServiceStatus::Completed)?;
    self.completed_at = Some(now);
    self.completed_by = Some(completed_by);
    Ok(())
  }

  pub fn reschedule(&mut self, new_date: DateTime<Utc>) -> Result<(), AmcError> {
    self.transition(ServiceStatus::Rescheduled)?;
    self.scheduled_date = new_date;
    Ok(())
  }

  pub fn mark_missed(&mut self) -> Result<(), AmcError> {
    self.transition(ServiceStatus::Missed)
  }

  pub fn cancel(&mut self) -> Result<(), AmcError> {
    self.transition(ServiceStatus::Cancelled)
  }

  fn transition(&mut self, new_status: ServiceStatus) -> Result<(), AmcError> {
    if !self.status.can_transition_to(new_status) {
      return Err(AmcError::InvalidTransition {
        from: self.status.as_str().to_string(),
        to: new_status.as_str().to_string(),
      });
    }
    self.status = new_status;
    Ok(())
  }
}

/// Annual maintenance contract with its embedded visit schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmcContract {
  pub id: Uuid,
  pub client_id: Uuid,
  pub contract_number: String,
  pub start_date: DateTime<Utc>,
  pub end_date: DateTime<Utc>,
  pub duration_months: u32,
  pub service_frequency: ServiceFrequency,
  pub number_of_services: u32,
  pub services_completed: u32,
  pub contract_value: ContractValue,
  pub payment_terms: Option<String>,
  pub assigned_to: Option<Uuid>,
  pub status: AmcStatus,
  pub auto_renewal: bool,
  pub renewal_notification_sent: bool,
  pub renewed_from: Option<Uuid>,
  pub renewed_to: Option<Uuid>,
  pub services: Vec<ServiceVisit>,
  pub created_by: Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl AmcContract {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    client_id: Uuid,
    contract_number: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    service_frequency: ServiceFrequency,
    contract_value: ContractValue,
    payment_terms: Option<String>,
    assigned_to: Option<Uuid>,
    auto_renewal: bool,
    created_by: Uuid,
  ) -> Result<Self, AmcError> {
    if start_date >= end_date {
      return Err(AmcError::InvalidDateRange(
        "Contract start date must be before its end date".to_string(),
      ));
    }

    let now = Utc::now();
    Ok(Self {
      id: Uuid::new_v4(),
      client_id,
      contract_number,
      start_date,
      end_date,
      duration_months: derive_duration_months(start_date, end_date),
      service_frequency,
      number_of_services: derive_service_count(start_date, end_date, service_frequency),
      services_completed: 0,
      contract_value,
      payment_terms,
      assigned_to,
      status: AmcStatus::Active,
      auto_renewal,
      renewal_notification_sent: false,
      renewed_from: None,
      renewed_to: None,
      services: Vec::new(),
      created_by,
      created_at: now,
      updated_at: now,
    })
  }

  /// Successor contract for a renewal: starts exactly where the old one
  /// ends, carrying value, terms, assignee and frequency forward.
  pub fn renewal_of(old: &AmcContract, new_end_date: DateTime<Utc>) -> Result<Self, AmcError> {
    if new_end_date <= old.end_date {
      return Err(AmcError::InvalidDateRange(
        "Renewal end date must be after the current contract end date".to_string(),
      ));
    }

    let mut successor = Self::new(
      old.client_id,
      format!("{}-R", old.contract_number),
      old.end_date,
      new_end_date,
      old.service_frequency,
      old.contract_value,
      old.payment_terms.clone(),
      old.assigned_to,
      old.auto_renewal,
      old.created_by,
    )?;
    successor.renewed_from = Some(old.id);
    Ok(successor)
  }

  /// Lazy expiry check, applied on every save path and by the nightly sweep.
  pub fn refresh_expiry(&mut self, now: DateTime<Utc>) -> bool {
    if self.status == AmcStatus::Active && self.end_date < now {
      self.status = AmcStatus::Expired;
      self.touch();
      return true;
    }
    false
  }

  pub fn change_status(&mut self, new_status: AmcStatus) -> Result<(), AmcError> {
    if !self.status.can_transition_to(new_status) {
      return Err(AmcError::InvalidTransition {
        from: self.status.as_str().to_string(),
        to: new_status.as_str().to_string(),
      });
    }
    self.status = new_status;
    self.touch();
    Ok(())
  }

  /// Close this contract as renewed, pointing at its successor.
  pub fn mark_renewed(&mut self, successor_id: Uuid) -> Result<(), AmcError> {
    self.change_status(AmcStatus::Renewed)?;
    self.renewed_to = Some(successor_id);
    Ok(())
  }

  /// Visits grow append-only.
  pub fn schedule_service(&mut self, visit: ServiceVisit) -> Result<(), AmcError> {
    if self.status.is_terminal() {
      return Err(AmcError::InvalidTransition {
        from: self.status.as_str().to_string(),
        to: AmcStatus::Active.as_str().to_string(),
      });
    }
    self.services.push(visit);
    self.touch();
    Ok(())
  }

  /// Completion increments services_completed. The counter is not capped at
  /// number_of_services; ad hoc extra visits still count.
  pub fn complete_service(
    &mut self,
    service_id: Uuid,
    completed_by: Uuid,
    now: DateTime<Utc>,
  ) -> Result<(), AmcError> {
    let visit = self
      .services
      .iter_mut()
      .find(|v| v.id == service_id)
      .ok_or(AmcError::ServiceNotFound(service_id))?;

    visit.complete(completed_by, now)?;
    self.services_completed += 1;
    self.touch();
    Ok(())
  }

  pub fn mark_renewal_notified(&mut self) {
    self.renewal_notification_sent = true;
    self.touch();
  }

  fn touch(&mut self) {
    self.updated_at = Utc::now();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;
  use rust_decimal_macros::dec;

  fn contract(start: DateTime<Utc>, end: DateTime<Utc>) -> AmcContract {
    AmcContract::new(
      Uuid::new_v4(),
      "AMC-2026-001".to_string(),
      start,
      end,
      ServiceFrequency::Monthly,
      ContractValue::new(dec!(24000)).unwrap(),
      Some("Net 30".to_string()),
      Some(Uuid::new_v4()),
      true,
      Uuid::new_v4(),
    )
    .unwrap()
  }

  #[test]
  fn test_contract_requires_ordered_dates() {
    let now = Utc::now();
    assert!(
      AmcContract::new(
        Uuid::new_v4(),
        "AMC-X".to_string(),
        now,
        now - Duration::days(1),
        ServiceFrequency::Monthly,
        ContractValue::new(dec!(1000)).unwrap(),
        None,
        None,
        false,
        Uuid::new_v4(),
      )
      .is_err()
    );
  }

  #[test]
  fn test_new_contract_derives_counts() {
    let start = Utc::now();
    let c = contract(start, start + Duration::days(360));
    assert_eq!(c.duration_months, 12);
    assert_eq!(c.number_of_services, 12);
    assert_eq!(c.services_completed, 0);
    assert_eq!(c.status, AmcStatus::Active);
  }

  #[test]
  fn test_refresh_expiry() {
    let start = Utc::now() - Duration::days(400);
    let mut c = contract(start, start + Duration::days(360));
    assert!(c.refresh_expiry(Utc::now()));
    assert_eq!(c.status, AmcStatus::Expired);
    // idempotent
    assert!(!c.refresh_expiry(Utc::now()));
  }

  #[test]
  fn test_renewal_of_is_contiguous() {
    let start = Utc::now();
    let old = contract(start, start + Duration::days(360));
    let new_end = old.end_date + Duration::days(360);

    let successor = AmcContract::renewal_of(&old, new_end).unwrap();
    assert_eq!(successor.start_date, old.end_date);
    assert_eq!(successor.end_date, new_end);
    assert_eq!(successor.renewed_from, Some(old.id));
    assert_eq!(successor.contract_value, old.contract_value);
    assert_eq!(successor.service_frequency, old.service_frequency);
    assert_eq!(successor.number_of_services, 12);
  }

  #[test]
  fn test_renewal_rejects_shorter_end_date() {
    let start = Utc::now();
    let old = contract(start, start + Duration::days(360));
    assert!(AmcContract::renewal_of(&old, old.end_date).is_err());
    assert!(AmcContract::renewal_of(&old, old.end_date - Duration::days(1)).is_err());
  }

  #[test]
  fn test_mark_renewed_links_and_locks() {
    let start = Utc::now();
    let mut old = contract(start, start + Duration::days(360));
    let successor_id = Uuid::new_v4();

    old.mark_renewed(successor_id).unwrap();
    assert_eq!(old.status, AmcStatus::Renewed);
    assert_eq!(old.renewed_to, Some(successor_id));

    // Renewed is terminal
    assert!(old.change_status(AmcStatus::Active).is_err());
    assert!(old.mark_renewed(Uuid::new_v4()).is_err());
  }

  #[test]
  fn test_complete_service_increments_counter() {
    let start = Utc::now();
    let mut c = contract(start, start + Duration::days(360));
    let visit = ServiceVisit::new(start + Duration::days(30), None);
    let visit_id = visit.id;
    c.schedule_service(visit).unwrap();

    let technician = Uuid::new_v4();
    c.complete_service(visit_id, technician, Utc::now()).unwrap();

    assert_eq!(c.services_completed, 1);
    let visit = &c.services[0];
    assert_eq!(visit.status, ServiceStatus::Completed);
    assert!(visit.completed_at.is_some());
    assert_eq!(visit.completed_by, Some(technician));
  }

  #[test]
  fn test_completed_visit_cannot_complete_twice() {
    let start = Utc::now();
    let mut c = contract(start, start + Duration::days(360));
    let visit = ServiceVisit::new(start + Duration::days(30), None);
    let visit_id = visit.id;
    c.schedule_service(visit).unwrap();

    c.complete_service(visit_id, Uuid::new_v4(), Utc::now())
      .unwrap();
    let err = c
      .complete_service(visit_id, Uuid::new_v4(), Utc::now())
      .unwrap_err();
    assert!(matches!(err, AmcError::InvalidTransition { .. }));
    assert_eq!(c.services_completed, 1);
  }

  #[test]
  fn test_counter_is_not_capped_at_number_of_services() {
    let start = Utc::now();
    // one-month contract, a single planned visit
    let mut c = AmcContract::new(
      Uuid::new_v4(),
      "AMC-S".to_string(),
      start,
      start + Duration::days(30),
      ServiceFrequency::Monthly,
      ContractValue::new(dec!(1000)).unwrap(),
      None,
      None,
      false,
      Uuid::new_v4(),
    )
    .unwrap();
    assert_eq!(c.number_of_services, 1);

    for _ in 0..3 {
      let visit = ServiceVisit::new(start + Duration::days(10), None);
      let id = visit.id;
      c.schedule_service(visit).unwrap();
      c.complete_service(id, Uuid::new_v4(), Utc::now()).unwrap();
    }
    assert_eq!(c.services_completed, 3);
  }

  #[test]
  fn test_scheduling_on_terminal_contract_fails() {
    let start = Utc::now();
    let mut c = contract(start, start + Duration::days(360));
    c.change_status(AmcStatus::Cancelled).unwrap();

    let err = c
      .schedule_service(ServiceVisit::new(Utc::now(), None))
      .unwrap_err();
    assert!(matches!(err, AmcError::InvalidTransition { .. }));
  }

  #[test]
  fn test_on_hold_round_trip() {
    let start = Utc::now();
    let mut c = contract(start, start + Duration::days(360));
    c.change_status(AmcStatus::OnHold).unwrap();
    // visits may still be scheduled while on hold
    assert!(c.schedule_service(ServiceVisit::new(Utc::now(), None)).is_ok());
    c.change_status(AmcStatus::Active).unwrap();
    assert_eq!(c.status, AmcStatus::Active);
  }
}
