//! Fuel spent / fuel cost arithmetic

use super::validator::CalculationInput;

/// Unrounded calculation output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelEstimate {
    /// Liters consumed over the distance
    pub fuel_spent_liters: f64,
    /// Fuel spent times price per liter
    pub fuel_cost: f64,
}

/// Compute fuel spent and fuel cost.
///
/// No rounding happens here; use [`format_decimal`](super::format_decimal)
/// for display.
pub fn calculate(input: &CalculationInput) -> FuelEstimate {
    let fuel_spent_liters = input.distance() * input.fuel_consumption() / 100.0;
    FuelEstimate {
        fuel_spent_liters,
        fuel_cost: fuel_spent_liters * input.fuel_price(),
    }
}
