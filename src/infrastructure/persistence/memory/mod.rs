//! In-memory repository implementations, used by tests and local runs.

mod amc_repository;
mod call_log_repository;
mod invoice_repository;
mod lead_repository;
mod payment_repository;
mod quotation_repository;
mod task_repository;

pub use amc_repository::InMemoryAmcRepository;
pub use call_log_repository::InMemoryCallLogRepository;
pub use invoice_repository::InMemoryInvoiceRepository;
pub use lead_repository::InMemoryLeadRepository;
pub use payment_repository::InMemoryPaymentRepository;
pub use quotation_repository::InMemoryQuotationRepository;
pub use task_repository::InMemoryTaskRepository;
