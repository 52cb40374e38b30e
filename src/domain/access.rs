//! Static role → capability table. Controllers check capabilities before
//! exposing sensitive financial fields or accepting privileged operations;
//! there is no per-entity field filtering logic anywhere else.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Manager,
  Sales,
  Technician,
  Portal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
  ViewSensitiveFinancials,
  ApproveQuotations,
  RecordPayments,
  ManageAutomation,
}

impl Role {
  pub fn capabilities(&self) -> &'static [Capability] {
    match self {
      Role::Admin => &[
        Capability::ViewSensitiveFinancials,
        Capability::ApproveQuotations,
        Capability::RecordPayments,
        Capability::ManageAutomation,
      ],
      Role::Manager => &[
        Capability::ViewSensitiveFinancials,
        Capability::ApproveQuotations,
        Capability::RecordPayments,
      ],
      Role::Sales => &[Capability::RecordPayments],
      Role::Technician => &[],
      Role::Portal => &[],
    }
  }

  pub fn has_capability(&self, capability: Capability) -> bool {
    self.capabilities().contains(&capability)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::Manager => "manager",
      Role::Sales => "sales",
      Role::Technician => "technician",
      Role::Portal => "portal",
    }
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "admin" => Ok(Role::Admin),
      "manager" => Ok(Role::Manager),
      "sales" => Ok(Role::Sales),
      "technician" => Ok(Role::Technician),
      "portal" => Ok(Role::Portal),
      _ => Err(format!("Unknown role: {}", s)),
    }
  }
}
