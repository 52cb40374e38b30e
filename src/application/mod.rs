pub mod amc;
pub mod automation;
pub mod billing;
