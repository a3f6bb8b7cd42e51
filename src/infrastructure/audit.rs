//! `tracing`-backed audit sink

use tracing::info;

use crate::application::audit::{AuditError, AuditLogger, AuditRecord};

/// Target used for audit events, so subscribers can route them separately
/// (`RUST_LOG=fuel_calculator::audit=info`).
pub const AUDIT_TARGET: &str = "fuel_calculator::audit";

/// Emits one structured `info` event per audit record. The full record is
/// also attached as a JSON string for log shippers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLogger;

impl AuditLogger for TracingAuditLogger {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let json = serde_json::to_string(record)?;
        info!(
            target: AUDIT_TARGET,
            entry_point = %record.entry_point,
            user = %record.actor,
            ip = %record.source_address,
            distance = record.distance,
            consumption = record.fuel_consumption,
            price = record.fuel_price,
            spent = %record.fuel_spent,
            cost = %record.fuel_cost,
            recorded_at = %record.recorded_at.to_rfc3339(),
            record = %json,
            "{}",
            record
        );
        Ok(())
    }
}
