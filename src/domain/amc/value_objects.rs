use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid contract value: {0}")]
  InvalidValue(String),
  #[error("Invalid service frequency: {0}")]
  InvalidFrequency(String),
  #[error("Invalid status: {0}")]
  InvalidStatus(String),
}

// Contract status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmcStatus {
  Active,
  Expired,
  Renewed,
  Cancelled,
  OnHold,
}

impl AmcStatus {
  /// Expired, Renewed and Cancelled are terminal for a contract instance;
  /// a renewal continues as a brand new contract.
  pub fn can_transition_to(&self, new_status: AmcStatus) -> bool {
    match (self, new_status) {
      (AmcStatus::Active, AmcStatus::Expired) => true,
      (AmcStatus::Active, AmcStatus::Renewed) => true,
      (AmcStatus::Active, AmcStatus::Cancelled) => true,
      (AmcStatus::Active, AmcStatus::OnHold) => true,
      (AmcStatus::OnHold, AmcStatus::Active) => true,
      (AmcStatus::OnHold, AmcStatus::Cancelled) => true,
      _ => false,
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      AmcStatus::Expired | AmcStatus::Renewed | AmcStatus::Cancelled
    )
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      AmcStatus::Active => "active",
      AmcStatus::Expired => "expired",
      AmcStatus::Renewed => "renewed",
      AmcStatus::Cancelled => "cancelled",
      AmcStatus::OnHold => "on_hold",
    }
  }
}

impl FromStr for AmcStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "active" => Ok(AmcStatus::Active),
      "expired" => Ok(AmcStatus::Expired),
      "renewed" => Ok(AmcStatus::Renewed),
      "cancelled" => Ok(AmcStatus::Cancelled),
      "on_hold" => Ok(AmcStatus::OnHold),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown contract status: {}",
        s
      ))),
    }
  }
}

// Service visit frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFrequency {
  Weekly,
  BiWeekly,
  Monthly,
  Quarterly,
  HalfYearly,
  Yearly,
}

impl ServiceFrequency {
  /// Visit period in months. The weekly and bi-weekly values are the
  /// historical weeks-per-month approximation (0.23 and 0.46), kept as-is
  /// so derived service counts stay compatible.
  pub fn period_months(&self) -> Decimal {
    match self {
      ServiceFrequency::Weekly => Decimal::new(23, 2),
      ServiceFrequency::BiWeekly => Decimal::new(46, 2),
      ServiceFrequency::Monthly => Decimal::ONE,
      ServiceFrequency::Quarterly => Decimal::from(3),
      ServiceFrequency::HalfYearly => Decimal::from(6),
      ServiceFrequency::Yearly => Decimal::from(12),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ServiceFrequency::Weekly => "weekly",
      ServiceFrequency::BiWeekly => "bi_weekly",
      ServiceFrequency::Monthly => "monthly",
      ServiceFrequency::Quarterly => "quarterly",
      ServiceFrequency::HalfYearly => "half_yearly",
      ServiceFrequency::Yearly => "yearly",
    }
  }
}

impl FromStr for ServiceFrequency {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "weekly" => Ok(ServiceFrequency::Weekly),
      "bi_weekly" => Ok(ServiceFrequency::BiWeekly),
      "monthly" => Ok(ServiceFrequency::Monthly),
      "quarterly" => Ok(ServiceFrequency::Quarterly),
      "half_yearly" => Ok(ServiceFrequency::HalfYearly),
      "yearly" => Ok(ServiceFrequency::Yearly),
      _ => Err(ValueObjectError::InvalidFrequency(format!(
        "Unknown service frequency: {}",
        s
      ))),
    }
  }
}

// Visit lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
  Scheduled,
  Completed,
  Missed,
  Rescheduled,
  Cancelled,
}

impl ServiceStatus {
  pub fn can_transition_to(&self, new_status: ServiceStatus) -> bool {
    match (self, new_status) {
      (ServiceStatus::Scheduled, ServiceStatus::Completed) => true,
      (ServiceStatus::Scheduled, ServiceStatus::Missed) => true,
      (ServiceStatus::Scheduled, ServiceStatus::Rescheduled) => true,
      (ServiceStatus::Scheduled, ServiceStatus::Cancelled) => true,
      (ServiceStatus::Rescheduled, ServiceStatus::Completed) => true,
      (ServiceStatus::Rescheduled, ServiceStatus::Missed) => true,
      (ServiceStatus::Rescheduled, ServiceStatus::Cancelled) => true,
      _ => false,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ServiceStatus::Scheduled => "scheduled",
      ServiceStatus::Completed => "completed",
      ServiceStatus::Missed => "missed",
      ServiceStatus::Rescheduled => "rescheduled",
      ServiceStatus::Cancelled => "cancelled",
    }
  }
}

impl FromStr for ServiceStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "scheduled" => Ok(ServiceStatus::Scheduled),
      "completed" => Ok(ServiceStatus::Completed),
      "missed" => Ok(ServiceStatus::Missed),
      "rescheduled" => Ok(ServiceStatus::Rescheduled),
      "cancelled" => Ok(ServiceStatus::Cancelled),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown service status: {}",
        s
      ))),
    }
  }
}

// Contract value - non-negative money amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractValue(Decimal);

impl ContractValue {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value.is_sign_negative() {
      return Err(ValueObjectError::InvalidValue(
        "Contract value cannot be negative".to_string(),
      ));
    }
    Ok(Self(value))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_contract_status_transitions() {
    assert!(AmcStatus::Active.can_transition_to(AmcStatus::Expired));
    assert!(AmcStatus::Active.can_transition_to(AmcStatus::Renewed));
    assert!(AmcStatus::Active.can_transition_to(AmcStatus::OnHold));
    assert!(AmcStatus::OnHold.can_transition_to(AmcStatus::Active));

    assert!(!AmcStatus::Expired.can_transition_to(AmcStatus::Active));
    assert!(!AmcStatus::Renewed.can_transition_to(AmcStatus::Active));
    assert!(!AmcStatus::Cancelled.can_transition_to(AmcStatus::Active));
  }

  #[test]
  fn test_frequency_periods() {
    assert_eq!(ServiceFrequency::Weekly.period_months(), dec!(0.23));
    assert_eq!(ServiceFrequency::BiWeekly.period_months(), dec!(0.46));
    assert_eq!(ServiceFrequency::Monthly.period_months(), dec!(1));
    assert_eq!(ServiceFrequency::Quarterly.period_months(), dec!(3));
    assert_eq!(ServiceFrequency::HalfYearly.period_months(), dec!(6));
    assert_eq!(ServiceFrequency::Yearly.period_months(), dec!(12));
  }

  #[test]
  fn test_service_status_transitions() {
    assert!(ServiceStatus::Scheduled.can_transition_to(ServiceStatus::Completed));
    assert!(ServiceStatus::Scheduled.can_transition_to(ServiceStatus::Rescheduled));
    assert!(ServiceStatus::Rescheduled.can_transition_to(ServiceStatus::Completed));
    assert!(!ServiceStatus::Completed.can_transition_to(ServiceStatus::Scheduled));
    assert!(!ServiceStatus::Cancelled.can_transition_to(ServiceStatus::Completed));
  }

  #[test]
  fn test_contract_value() {
    assert!(ContractValue::new(dec!(0)).is_ok());
    assert!(ContractValue::new(dec!(25000)).is_ok());
    assert!(ContractValue::new(dec!(-1)).is_err());
  }
}
