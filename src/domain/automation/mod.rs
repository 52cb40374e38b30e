pub mod effects;
pub mod errors;
pub mod rules;
pub mod services;

pub use effects::Effect;
pub use errors::AutomationError;
pub use services::{AutomationJob, AutomationService, RuleOutcome, RunSummary};
