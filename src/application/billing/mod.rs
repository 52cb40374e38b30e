pub mod change_quotation_status;
pub mod convert_quotation;
pub mod record_payment;
pub mod review_quotation;
pub mod reverse_payment;

pub use change_quotation_status::{
  ChangeQuotationStatusCommand, ChangeQuotationStatusResponse, ChangeQuotationStatusUseCase,
};
pub use convert_quotation::{
  ConvertQuotationCommand, ConvertQuotationResponse, ConvertQuotationUseCase,
};
pub use record_payment::{RecordPaymentCommand, RecordPaymentResponse, RecordPaymentUseCase};
pub use review_quotation::{
  ReviewQuotationCommand, ReviewQuotationResponse, ReviewQuotationUseCase,
};
pub use reverse_payment::{
  ReversePaymentCommand, ReversePaymentResponse, ReversePaymentUseCase,
};
