//! Settings DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::CalculatorDefaults;

/// Form prefill defaults
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    pub default_distance: f64,
    pub default_fuel_consumption: f64,
    pub default_fuel_price: f64,
}

impl From<CalculatorDefaults> for SettingsResponse {
    fn from(d: CalculatorDefaults) -> Self {
        Self {
            default_distance: d.default_distance,
            default_fuel_consumption: d.default_fuel_consumption,
            default_fuel_price: d.default_fuel_price,
        }
    }
}

/// New defaults. Checked against the calculator field bounds by the store.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub default_distance: f64,
    pub default_fuel_consumption: f64,
    pub default_fuel_price: f64,
}

impl From<UpdateSettingsRequest> for CalculatorDefaults {
    fn from(r: UpdateSettingsRequest) -> Self {
        Self {
            default_distance: r.default_distance,
            default_fuel_consumption: r.default_fuel_consumption,
            default_fuel_price: r.default_fuel_price,
        }
    }
}
