//! Calculator REST DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{FieldError, RawInput, RawValue, ValidationErrors};

/// Calculation request. Each value may be a JSON number or a numeric string.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CalculateRequest {
    /// Distance travelled, km (0.1–10000)
    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 100)]
    pub distance: Option<Value>,
    /// Consumption, l/100 km (0.1–100)
    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 8)]
    pub fuel_consumption: Option<Value>,
    /// Price per liter (0.01–10)
    #[serde(default)]
    #[schema(value_type = Option<f64>, example = 1.5)]
    pub fuel_price: Option<Value>,
}

impl From<&CalculateRequest> for RawInput {
    fn from(req: &CalculateRequest) -> Self {
        let raw = |v: &Option<Value>| v.as_ref().and_then(RawValue::from_json);
        RawInput {
            distance: raw(&req.distance),
            fuel_consumption: raw(&req.fuel_consumption),
            fuel_price: raw(&req.fuel_price),
        }
    }
}

/// One rejected input field
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorDto {
    /// Wire name of the field (`distance`, `fuel_consumption`, `fuel_price`)
    pub field: String,
    /// `missing_field`, `non_numeric` or `out_of_range`
    pub code: String,
    pub message: String,
}

impl From<&FieldError> for FieldErrorDto {
    fn from(e: &FieldError) -> Self {
        Self {
            field: e.field().name().to_string(),
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

/// 400 body: `message` is the first problem, `errors` lists all of them
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CalculateErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorDto>,
}

impl CalculateErrorResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
        }
    }
}

impl From<&ValidationErrors> for CalculateErrorResponse {
    fn from(errors: &ValidationErrors) -> Self {
        Self {
            message: errors.first().to_string(),
            errors: errors.errors().iter().map(FieldErrorDto::from).collect(),
        }
    }
}
