//! Infrastructure: credential handling and the audit sink

pub mod audit;
pub mod crypto;

pub use audit::TracingAuditLogger;
