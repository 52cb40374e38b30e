use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::CrmError;
use super::pipeline::{PipelineSettings, stages};
use super::value_objects::{CallOutcome, LeadPriority, LeadStatus};

pub const LOST_REASON_NO_RESPONSE: &str = "No Response";

/// Append-only audit note on a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadNote {
  pub body: String,
  pub created_at: DateTime<Utc>,
}

// Lead - a prospect moving through the sales pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
  pub id: Uuid,
  pub client_id: Option<Uuid>,
  pub title: String,
  pub contact_name: Option<String>,
  pub source: Option<String>,
  pub status: LeadStatus,
  /// Pipeline stage name, validated against the injected settings.
  pub stage: String,
  pub probability: u8,
  pub priority: LeadPriority,
  pub expected_revenue: Decimal,
  pub converted: bool,
  pub lost_reason: Option<String>,
  pub notes: Vec<LeadNote>,
  pub created_by: Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Lead {
  pub fn new(
    title: String,
    source: Option<String>,
    expected_revenue: Decimal,
    created_by: Uuid,
    settings: &PipelineSettings,
  ) -> Result<Self, CrmError> {
    if title.trim().is_empty() {
      return Err(CrmError::InvalidLead("Lead title cannot be empty".to_string()));
    }
    if expected_revenue.is_sign_negative() {
      return Err(CrmError::InvalidLead(
        "Expected revenue cannot be negative".to_string(),
      ));
    }
    if let Some(source) = &source {
      settings.validate_source(source)?;
    }

    let now = Utc::now();
    Ok(Self {
      id: Uuid::new_v4(),
      client_id: None,
      title: title.trim().to_string(),
      contact_name: None,
      source,
      status: LeadStatus::Open,
      stage: stages::NEW.to_string(),
      probability: settings.probability_for(stages::NEW).unwrap_or(0),
      priority: LeadPriority::Medium,
      expected_revenue,
      converted: false,
      lost_reason: None,
      notes: Vec::new(),
      created_by,
      created_at: now,
      updated_at: now,
    })
  }

  /// Move the lead to another pipeline stage, re-deriving its probability
  /// from the settings table.
  pub fn change_stage(
    &mut self,
    settings: &PipelineSettings,
    stage: &str,
  ) -> Result<(), CrmError> {
    settings.validate_stage(stage)?;
    self.stage = stage.to_string();
    self.probability = settings.probability_for(stage).unwrap_or(0);
    self.touch();
    Ok(())
  }

  pub fn set_priority(&mut self, priority: LeadPriority) {
    self.priority = priority;
    self.touch();
  }

  pub fn add_note(&mut self, body: String) {
    self.notes.push(LeadNote {
      body,
      created_at: Utc::now(),
    });
    self.touch();
  }

  /// Close the lead as lost; status and stage both move to Lost.
  pub fn mark_lost(
    &mut self,
    settings: &PipelineSettings,
    reason: String,
  ) -> Result<(), CrmError> {
    self.change_stage(settings, stages::LOST)?;
    self.status = LeadStatus::Lost;
    self.lost_reason = Some(reason);
    Ok(())
  }

  fn touch(&mut self) {
    self.updated_at = Utc::now();
  }
}

// Call log - a recorded call against a lead
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLog {
  pub id: Uuid,
  pub lead_id: Uuid,
  pub client_id: Option<Uuid>,
  pub outcome: CallOutcome,
  pub notes: Option<String>,
  pub follow_up_required: bool,
  pub created_by: Uuid,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl CallLog {
  pub fn new(
    lead_id: Uuid,
    client_id: Option<Uuid>,
    outcome: CallOutcome,
    notes: Option<String>,
    created_by: Uuid,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      lead_id,
      client_id,
      outcome,
      notes,
      follow_up_required: false,
      created_by,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn require_follow_up(&mut self) {
    self.follow_up_required = true;
    self.updated_at = Utc::now();
  }
}
