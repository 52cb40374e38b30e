pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{
  DocumentTotals, Invoice, InvoiceLineItem, LineFigures, Payment, Quotation, QuotationLineItem,
};
pub use errors::BillingError;
pub use ports::{InvoiceRepository, PaymentRepository, QuotationRepository};
pub use services::{
  BillingService, InvoiceData, InvoiceItemInput, QuotationData, QuotationItemInput,
};
pub use value_objects::{
  ApprovalStatus, Discount, DiscountType, GstRates, InvoiceStatus, LineItemDescription,
  PaymentMode, PaymentState, PaymentStatus, Quantity, QuotationStatus, TaxRate, UnitPrice,
  ValueObjectError,
};
