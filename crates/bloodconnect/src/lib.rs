//! BloodConnect coordination core: donor eligibility screening and the hospital
//! registration approval workflow, with the HTTP routes that expose them.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
