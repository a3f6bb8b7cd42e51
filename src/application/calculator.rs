//! Calculation pipeline shared by the form and REST entry points
//!
//! validate → calculate → format → audit. The audit step is best effort: a
//! failing sink is logged and otherwise ignored.

use std::sync::Arc;

use tracing::{debug, warn};

use super::audit::{AuditLogger, AuditRecord, RequestContext};
use crate::domain::{evaluate, CalculationResult, RawInput, ValidationErrors};

pub struct FuelCalculatorService {
    audit: Arc<dyn AuditLogger>,
}

impl FuelCalculatorService {
    pub fn new(audit: Arc<dyn AuditLogger>) -> Self {
        Self { audit }
    }

    /// Run one calculation. On rejection every field error is returned.
    pub fn calculate(
        &self,
        raw: &RawInput,
        ctx: &RequestContext,
    ) -> Result<CalculationResult, ValidationErrors> {
        let entry_point = ctx.entry_point.as_str();

        let (input, result) = match evaluate(raw) {
            Ok(ok) => ok,
            Err(errors) => {
                debug!(entry_point, errors = %errors, "Calculation rejected");
                metrics::counter!("fuel_calculations_total", "entry_point" => entry_point, "outcome" => "rejected")
                    .increment(1);
                return Err(errors);
            }
        };

        metrics::counter!("fuel_calculations_total", "entry_point" => entry_point, "outcome" => "completed")
            .increment(1);

        let record = AuditRecord::new(ctx, &input, &result);
        if let Err(e) = self.audit.record(&record) {
            warn!(entry_point, error = %e, "Audit logging failed, calculation result still returned");
        }

        Ok(result)
    }
}
