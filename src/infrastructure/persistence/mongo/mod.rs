//! Document-store repositories backed by MongoDB. Each aggregate has its own
//! collection and a BSON document struct mapped to and from the domain
//! entity; enums and money amounts are stored as strings, dates as BSON
//! datetimes.

mod amc_repository;
mod call_log_repository;
mod invoice_repository;
mod lead_repository;
mod payment_repository;
mod quotation_repository;
mod task_repository;

pub use amc_repository::MongoAmcRepository;
pub use call_log_repository::MongoCallLogRepository;
pub use invoice_repository::MongoInvoiceRepository;
pub use lead_repository::MongoLeadRepository;
pub use payment_repository::MongoPaymentRepository;
pub use quotation_repository::MongoQuotationRepository;
pub use task_repository::MongoTaskRepository;

use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

pub(super) fn parse_uuid(value: &str, field: &str) -> Result<Uuid, String> {
  Uuid::parse_str(value).map_err(|e| format!("Invalid {} '{}': {}", field, value, e))
}

pub(super) fn parse_decimal(value: &str, field: &str) -> Result<Decimal, String> {
  Decimal::from_str(value).map_err(|e| format!("Invalid {} '{}': {}", field, value, e))
}
