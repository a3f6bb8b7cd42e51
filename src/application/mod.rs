//! Application layer
//!
//! - `calculator`: the validate → calculate → format → audit pipeline
//! - `audit`: audit records and the logger port
//! - `settings`: editable form defaults

pub mod audit;
pub mod calculator;
pub mod settings;

pub use audit::{AuditError, AuditLogger, AuditRecord, EntryPoint, RequestContext, ANONYMOUS};
pub use calculator::FuelCalculatorService;
pub use settings::{SettingsError, SettingsStore};
