use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::domain::automation::AutomationJob;

// Default interval functions
fn default_db_connect_timeout() -> u64 {
  5
}

fn default_hourly_interval() -> u64 {
  3600
}

fn default_daily_interval() -> u64 {
  86400
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub database: DatabaseConfig,
  pub scheduler: SchedulerConfig,
}

/// Document database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
  pub url: String,
  pub name: String,
  #[serde(default = "default_db_connect_timeout")]
  pub connect_timeout_seconds: u64,
}

/// Per-job automation intervals, in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
  #[serde(default = "default_hourly_interval")]
  pub follow_ups_interval_seconds: u64,
  #[serde(default = "default_daily_interval")]
  pub lead_hygiene_interval_seconds: u64,
  #[serde(default = "default_daily_interval")]
  pub payment_reminders_interval_seconds: u64,
  #[serde(default = "default_daily_interval")]
  pub contract_renewals_interval_seconds: u64,
  #[serde(default = "default_daily_interval")]
  pub contract_expiry_interval_seconds: u64,
  #[serde(default = "default_daily_interval")]
  pub overdue_invoices_interval_seconds: u64,
}

impl SchedulerConfig {
  pub fn interval_for(&self, job: AutomationJob) -> u64 {
    match job {
      AutomationJob::FollowUps => self.follow_ups_interval_seconds,
      AutomationJob::LeadHygiene => self.lead_hygiene_interval_seconds,
      AutomationJob::PaymentReminders => self.payment_reminders_interval_seconds,
      AutomationJob::ContractRenewals => self.contract_renewals_interval_seconds,
      AutomationJob::ContractExpiry => self.contract_expiry_interval_seconds,
      AutomationJob::OverdueInvoices => self.overdue_invoices_interval_seconds,
    }
  }
}

impl Config {
  /// Load configuration from files and environment variables
  ///
  /// Configuration is loaded in the following order (later sources override earlier ones):
  /// 1. config/default.toml
  /// 2. config/local.toml (if exists)
  /// 3. Environment variables with FIELDCRM_ prefix
  ///
  /// # Environment Variables
  ///
  /// Environment variables use the FIELDCRM_ prefix and are separated by double underscores:
  /// - `FIELDCRM_DATABASE__URL=mongodb://localhost:27017`
  /// - `FIELDCRM_DATABASE__NAME=fieldcrm`
  /// - `FIELDCRM_SCHEDULER__FOLLOW_UPS_INTERVAL_SECONDS=3600`
  pub fn load() -> Result<Self, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let config = ConfigBuilder::builder()
      // Start with default configuration
      .add_source(File::with_name("config/default").required(true))
      // Add optional local configuration (for local development overrides)
      .add_source(File::with_name("config/local").required(false))
      // Add optional environment-specific configuration
      .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
      // Add environment variables with FIELDCRM_ prefix
      // Use double underscore as separator: FIELDCRM_DATABASE__NAME=fieldcrm
      .add_source(
        Environment::with_prefix("FIELDCRM")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?;

    config.try_deserialize()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_structure() {
    let toml = r#"
            [database]
            url = "mongodb://localhost:27017"
            name = "fieldcrm"

            [scheduler]
            follow_ups_interval_seconds = 1800
        "#;

    let config: Config = toml::from_str(toml).expect("Failed to parse config");

    assert_eq!(config.database.url, "mongodb://localhost:27017");
    assert_eq!(config.database.name, "fieldcrm");
    assert_eq!(config.database.connect_timeout_seconds, 5); // default
    assert_eq!(config.scheduler.follow_ups_interval_seconds, 1800);
    assert_eq!(config.scheduler.lead_hygiene_interval_seconds, 86400); // default
    assert_eq!(config.scheduler.overdue_invoices_interval_seconds, 86400); // default
  }

  #[test]
  fn test_interval_lookup_covers_every_job() {
    let toml = r#"
            [database]
            url = "mongodb://localhost:27017"
            name = "fieldcrm"

            [scheduler]
        "#;
    let config: Config = toml::from_str(toml).expect("Failed to parse config");

    for job in AutomationJob::all() {
      assert!(config.scheduler.interval_for(job) > 0);
    }
  }
}
