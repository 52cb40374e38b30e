use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{AmcContract, ServiceVisit};
use super::errors::AmcError;
use super::ports::AmcRepository;
use super::value_objects::{AmcStatus, ContractValue, ServiceFrequency};

/// Contract duration in months: ceil(days / 30). A 30-day month is the
/// historical convention here, not a calendar computation.
pub fn derive_duration_months(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
  let days = (end - start).num_days().max(0);
  ((days + 29) / 30) as u32
}

/// Planned visit count: ceil(duration_months / frequency period). Uses the
/// coarse weekly/bi-weekly divisors from `ServiceFrequency::period_months`.
pub fn derive_service_count(
  start: DateTime<Utc>,
  end: DateTime<Utc>,
  frequency: ServiceFrequency,
) -> u32 {
  let months = Decimal::from(derive_duration_months(start, end));
  (months / frequency.period_months())
    .ceil()
    .to_u32()
    .unwrap_or(0)
}

/// Contract creation data
#[derive(Debug, Clone)]
pub struct AmcData {
  pub client_id: Uuid,
  pub contract_number: String,
  pub start_date: DateTime<Utc>,
  pub end_date: DateTime<Utc>,
  pub service_frequency: ServiceFrequency,
  pub contract_value: ContractValue,
  pub payment_terms: Option<String>,
  pub assigned_to: Option<Uuid>,
  pub auto_renewal: bool,
  pub created_by: Uuid,
}

pub struct AmcService {
  amc_repo: Arc<dyn AmcRepository>,
}

impl AmcService {
  pub fn new(amc_repo: Arc<dyn AmcRepository>) -> Self {
    Self { amc_repo }
  }

  pub async fn create_contract(&self, data: AmcData) -> Result<AmcContract, AmcError> {
    let contract = AmcContract::new(
      data.client_id,
      data.contract_number,
      data.start_date,
      data.end_date,
      data.service_frequency,
      data.contract_value,
      data.payment_terms,
      data.assigned_to,
      data.auto_renewal,
      data.created_by,
    )?;
    self.amc_repo.create(contract).await
  }

  /// Renew a contract into a contiguous successor. The old contract closes
  /// as Renewed and the two are linked in both directions.
  pub async fn renew_contract(
    &self,
    contract_id: Uuid,
    new_end_date: DateTime<Utc>,
  ) -> Result<(AmcContract, AmcContract), AmcError> {
    let mut old = self
      .amc_repo
      .find_by_id(contract_id)
      .await?
      .ok_or(AmcError::ContractNotFound(contract_id))?;
    old.refresh_expiry(Utc::now());

    let successor = AmcContract::renewal_of(&old, new_end_date)?;
    old.mark_renewed(successor.id)?;

    let successor = self.amc_repo.create(successor).await?;
    let old = self.amc_repo.update(old).await?;

    tracing::info!(
      contract_id = %old.id,
      successor_id = %successor.id,
      end_date = %successor.end_date,
      "Contract renewed"
    );

    Ok((old, successor))
  }

  pub async fn schedule_service(
    &self,
    contract_id: Uuid,
    scheduled_date: DateTime<Utc>,
    notes: Option<String>,
  ) -> Result<AmcContract, AmcError> {
    let mut contract = self
      .amc_repo
      .find_by_id(contract_id)
      .await?
      .ok_or(AmcError::ContractNotFound(contract_id))?;
    contract.refresh_expiry(Utc::now());

    contract.schedule_service(ServiceVisit::new(scheduled_date, notes))?;
    self.amc_repo.update(contract).await
  }

  pub async fn complete_service(
    &self,
    contract_id: Uuid,
    service_id: Uuid,
    completed_by: Uuid,
  ) -> Result<AmcContract, AmcError> {
    let mut contract = self
      .amc_repo
      .find_by_id(contract_id)
      .await?
      .ok_or(AmcError::ContractNotFound(contract_id))?;
    contract.refresh_expiry(Utc::now());

    contract.complete_service(service_id, completed_by, Utc::now())?;
    self.amc_repo.update(contract).await
  }

  pub async fn change_contract_status(
    &self,
    contract_id: Uuid,
    new_status: AmcStatus,
  ) -> Result<AmcContract, AmcError> {
    let mut contract = self
      .amc_repo
      .find_by_id(contract_id)
      .await?
      .ok_or(AmcError::ContractNotFound(contract_id))?;
    contract.refresh_expiry(Utc::now());

    contract.change_status(new_status)?;
    self.amc_repo.update(contract).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[test]
  fn test_duration_months_uses_thirty_day_months() {
    let start = Utc::now();
    assert_eq!(derive_duration_months(start, start + Duration::days(360)), 12);
    assert_eq!(derive_duration_months(start, start + Duration::days(365)), 13);
    assert_eq!(derive_duration_months(start, start + Duration::days(30)), 1);
    assert_eq!(derive_duration_months(start, start + Duration::days(31)), 2);
    assert_eq!(derive_duration_months(start, start), 0);
  }

  #[test]
  fn test_service_count_twelve_month_contract() {
    let start = Utc::now();
    let end = start + Duration::days(360);

    assert_eq!(derive_service_count(start, end, ServiceFrequency::Monthly), 12);
    // ceil(12 / 0.23) = 53 with the documented approximation, not an exact
    // weeks-in-a-year count
    assert_eq!(derive_service_count(start, end, ServiceFrequency::Weekly), 53);
    // ceil(12 / 0.46) = 27
    assert_eq!(derive_service_count(start, end, ServiceFrequency::BiWeekly), 27);
    assert_eq!(derive_service_count(start, end, ServiceFrequency::Quarterly), 4);
    assert_eq!(derive_service_count(start, end, ServiceFrequency::HalfYearly), 2);
    assert_eq!(derive_service_count(start, end, ServiceFrequency::Yearly), 1);
  }

  #[test]
  fn test_service_count_rounds_up() {
    let start = Utc::now();
    // 100 days -> 4 months -> quarterly ceil(4/3) = 2
    let end = start + Duration::days(100);
    assert_eq!(derive_service_count(start, end, ServiceFrequency::Quarterly), 2);
  }
}
