//! CRM & maintenance-contract business rule engine: money math and status
//! machines for quotations, invoices and payments, AMC lifecycle derivation,
//! and the scheduled automation rules that sweep the entity store.

pub mod application;
pub mod domain;
pub mod infrastructure;
