pub mod complete_service;
pub mod renew_contract;

pub use complete_service::{
  CompleteServiceCommand, CompleteServiceResponse, CompleteServiceUseCase,
};
pub use renew_contract::{RenewContractCommand, RenewContractResponse, RenewContractUseCase};
