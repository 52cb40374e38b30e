pub mod access;
pub mod amc;
pub mod automation;
pub mod billing;
pub mod crm;
pub mod task;
