use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid status: {0}")]
  InvalidStatus(String),
  #[error("Invalid priority: {0}")]
  InvalidPriority(String),
  #[error("Invalid call outcome: {0}")]
  InvalidOutcome(String),
}

// Lead status - distinct from the pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
  Open,
  InProgress,
  Won,
  Lost,
}

impl LeadStatus {
  pub fn is_active(&self) -> bool {
    matches!(self, LeadStatus::Open | LeadStatus::InProgress)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      LeadStatus::Open => "open",
      LeadStatus::InProgress => "in_progress",
      LeadStatus::Won => "won",
      LeadStatus::Lost => "lost",
    }
  }
}

impl FromStr for LeadStatus {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "open" => Ok(LeadStatus::Open),
      "in_progress" => Ok(LeadStatus::InProgress),
      "won" => Ok(LeadStatus::Won),
      "lost" => Ok(LeadStatus::Lost),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown lead status: {}",
        s
      ))),
    }
  }
}

// Lead priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadPriority {
  Low,
  Medium,
  High,
  Critical,
}

impl LeadPriority {
  pub fn as_str(&self) -> &'static str {
    match self {
      LeadPriority::Low => "low",
      LeadPriority::Medium => "medium",
      LeadPriority::High => "high",
      LeadPriority::Critical => "critical",
    }
  }
}

impl FromStr for LeadPriority {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "low" => Ok(LeadPriority::Low),
      "medium" => Ok(LeadPriority::Medium),
      "high" => Ok(LeadPriority::High),
      "critical" => Ok(LeadPriority::Critical),
      _ => Err(ValueObjectError::InvalidPriority(format!(
        "Unknown priority: {}",
        s
      ))),
    }
  }
}

// Outcome of a logged call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
  Connected,
  NoAnswer,
  CallBackRequested,
  NotInterested,
}

impl CallOutcome {
  pub fn as_str(&self) -> &'static str {
    match self {
      CallOutcome::Connected => "connected",
      CallOutcome::NoAnswer => "no_answer",
      CallOutcome::CallBackRequested => "call_back_requested",
      CallOutcome::NotInterested => "not_interested",
    }
  }
}

impl FromStr for CallOutcome {
  type Err = ValueObjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "connected" => Ok(CallOutcome::Connected),
      "no_answer" => Ok(CallOutcome::NoAnswer),
      "call_back_requested" => Ok(CallOutcome::CallBackRequested),
      "not_interested" => Ok(CallOutcome::NotInterested),
      _ => Err(ValueObjectError::InvalidOutcome(format!(
        "Unknown call outcome: {}",
        s
      ))),
    }
  }
}
