use serde::{Deserialize, Serialize};

use super::errors::CrmError;

/// Canonical stage names used by the default pipeline and the automation
/// rules.
pub mod stages {
  pub const NEW: &str = "New";
  pub const CONTACTED: &str = "Contacted";
  pub const QUALIFIED: &str = "Qualified";
  pub const PROPOSAL_SENT: &str = "Proposal Sent";
  pub const NEGOTIATION: &str = "Negotiation";
  pub const WON: &str = "Won";
  pub const LOST: &str = "Lost";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
  pub name: String,
  /// Win probability in percent attached to leads entering this stage.
  pub probability: u8,
}

/// Sales pipeline configuration. Passed in explicitly wherever stage
/// validation or probability derivation happens; there is no ambient
/// settings singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
  pub stages: Vec<StageDefinition>,
  pub sources: Vec<String>,
}

impl Default for PipelineSettings {
  fn default() -> Self {
    let stage = |name: &str, probability: u8| StageDefinition {
      name: name.to_string(),
      probability,
    };
    Self {
      stages: vec![
        stage(stages::NEW, 10),
        stage(stages::CONTACTED, 20),
        stage(stages::QUALIFIED, 40),
        stage(stages::PROPOSAL_SENT, 60),
        stage(stages::NEGOTIATION, 80),
        stage(stages::WON, 100),
        stage(stages::LOST, 0),
      ],
      sources: vec![
        "Website".to_string(),
        "Referral".to_string(),
        "Cold Call".to_string(),
        "Email Campaign".to_string(),
        "Social Media".to_string(),
        "Exhibition".to_string(),
      ],
    }
  }
}

impl PipelineSettings {
  pub fn validate_stage(&self, stage: &str) -> Result<(), CrmError> {
    if self.stages.iter().any(|s| s.name == stage) {
      Ok(())
    } else {
      Err(CrmError::UnknownStage(stage.to_string()))
    }
  }

  pub fn validate_source(&self, source: &str) -> Result<(), CrmError> {
    if self.sources.iter().any(|s| s == source) {
      Ok(())
    } else {
      Err(CrmError::UnknownSource(source.to_string()))
    }
  }

  pub fn probability_for(&self, stage: &str) -> Option<u8> {
    self
      .stages
      .iter()
      .find(|s| s.name == stage)
      .map(|s| s.probability)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_stage_table() {
    let settings = PipelineSettings::default();
    assert_eq!(settings.probability_for(stages::NEW), Some(10));
    assert_eq!(settings.probability_for(stages::CONTACTED), Some(20));
    assert_eq!(settings.probability_for(stages::QUALIFIED), Some(40));
    assert_eq!(settings.probability_for(stages::PROPOSAL_SENT), Some(60));
    assert_eq!(settings.probability_for(stages::NEGOTIATION), Some(80));
    assert_eq!(settings.probability_for(stages::WON), Some(100));
    assert_eq!(settings.probability_for(stages::LOST), Some(0));
    assert_eq!(settings.probability_for("Daydreaming"), None);
  }

  #[test]
  fn test_stage_validation() {
    let settings = PipelineSettings::default();
    assert!(settings.validate_stage(stages::QUALIFIED).is_ok());
    assert!(matches!(
      settings.validate_stage("Daydreaming"),
      Err(CrmError::UnknownStage(_))
    ));
  }

  #[test]
  fn test_source_validation() {
    let settings = PipelineSettings::default();
    assert!(settings.validate_source("Referral").is_ok());
    assert!(settings.validate_source("Skywriting").is_err());
  }
}
