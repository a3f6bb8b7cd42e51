//! Fuel calculation core: validation, arithmetic and display formatting

pub mod calculator;
pub mod field;
pub mod format;
pub mod validator;

pub use calculator::{calculate, FuelEstimate};
pub use field::{Field, FieldRule, FIELD_RULES};
pub use format::format_decimal;
pub use validator::{validate, CalculationInput, RawInput, RawValue};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Formatted calculation result, as shown to users and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CalculationResult {
    /// Liters, one decimal, comma separator (e.g. `8,0`)
    pub fuel_spent: String,
    /// Currency, one decimal, comma separator (e.g. `12,0`)
    pub fuel_cost: String,
}

impl From<FuelEstimate> for CalculationResult {
    fn from(e: FuelEstimate) -> Self {
        Self {
            fuel_spent: format_decimal(e.fuel_spent_liters),
            fuel_cost: format_decimal(e.fuel_cost),
        }
    }
}

/// Validate, compute and format in one step.
pub fn evaluate(
    raw: &RawInput,
) -> Result<(CalculationInput, CalculationResult), crate::domain::ValidationErrors> {
    let input = validate(raw)?;
    Ok((input, calculate(&input).into()))
}
