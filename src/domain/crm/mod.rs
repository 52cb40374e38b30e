pub mod entities;
pub mod errors;
pub mod pipeline;
pub mod ports;
pub mod value_objects;

pub use entities::{CallLog, Lead, LeadNote, LOST_REASON_NO_RESPONSE};
pub use errors::CrmError;
pub use pipeline::{PipelineSettings, StageDefinition, stages};
pub use ports::{CallLogRepository, LeadRepository};
pub use value_objects::{CallOutcome, LeadPriority, LeadStatus};
