//! Audit trail for calculations
//!
//! Every successful calculation produces one [`AuditRecord`], handed to an
//! [`AuditLogger`]. Where the record ends up is the logger's business.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{CalculationInput, CalculationResult};

/// Actor name recorded when nobody is logged in.
pub const ANONYMOUS: &str = "Anonymous";

/// Which entry point served the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    Form,
    Rest,
}

impl EntryPoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Rest => "rest",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who asked for a calculation, and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub entry_point: EntryPoint,
    /// Account name, `None` for anonymous callers
    pub actor: Option<String>,
    pub source_address: Option<IpAddr>,
}

impl RequestContext {
    pub fn new(entry_point: EntryPoint) -> Self {
        Self {
            entry_point,
            actor: None,
            source_address: None,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_source_address(mut self, addr: Option<IpAddr>) -> Self {
        self.source_address = addr;
        self
    }
}

/// One successful calculation, as written to the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub entry_point: EntryPoint,
    pub actor: String,
    pub source_address: String,
    pub distance: f64,
    pub fuel_consumption: f64,
    pub fuel_price: f64,
    pub fuel_spent: String,
    pub fuel_cost: String,
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(ctx: &RequestContext, input: &CalculationInput, result: &CalculationResult) -> Self {
        Self {
            entry_point: ctx.entry_point,
            actor: ctx.actor.clone().unwrap_or_else(|| ANONYMOUS.to_string()),
            source_address: ctx
                .source_address
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            distance: input.distance(),
            fuel_consumption: input.fuel_consumption(),
            fuel_price: input.fuel_price(),
            fuel_spent: result.fuel_spent.clone(),
            fuel_cost: result.fuel_cost.clone(),
            recorded_at: Utc::now(),
        }
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.entry_point {
            EntryPoint::Form => "Calculation",
            EntryPoint::Rest => "REST calculation",
        };
        write!(
            f,
            "{} by {} ({}): distance={}, consumption={}, price={}, spent={}, cost={}",
            prefix,
            self.actor,
            self.source_address,
            self.distance,
            self.fuel_consumption,
            self.fuel_price,
            self.fuel_spent,
            self.fuel_cost
        )
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode audit record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receives audit records. Implementations must not block for long:
/// calculations wait for `record` to return.
pub trait AuditLogger: Send + Sync {
    fn record(&self, record: &AuditRecord) -> Result<(), AuditError>;
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{evaluate, RawInput};

    #[test]
    fn record_message_mirrors_entry_point() {
        let (input, result) = evaluate(&RawInput::new(100.0, 8.0, 1.5)).unwrap();

        let ctx = RequestContext::new(EntryPoint::Rest)
            .with_actor("alice")
            .with_source_address(Some("10.0.0.7".parse().unwrap()));
        let record = AuditRecord::new(&ctx, &input, &result);
        assert_eq!(
            record.to_string(),
            "REST calculation by alice (10.0.0.7): distance=100, consumption=8, price=1.5, spent=8,0, cost=12,0"
        );

        let record = AuditRecord::new(&RequestContext::new(EntryPoint::Form), &input, &result);
        assert_eq!(record.actor, ANONYMOUS);
        assert!(record.to_string().starts_with("Calculation by Anonymous (unknown)"));
    }
}
