pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{AmcContract, ServiceVisit};
pub use errors::AmcError;
pub use ports::AmcRepository;
pub use services::{AmcData, AmcService, derive_duration_months, derive_service_count};
pub use value_objects::{AmcStatus, ContractValue, ServiceFrequency, ServiceStatus};
